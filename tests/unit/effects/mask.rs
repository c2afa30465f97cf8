use super::*;

fn frame_with_green_rect(w: u32, h: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> Frame {
    Frame::from_fn(w, h, |x, y| {
        if x >= x0 && x < x1 && y >= y0 && y < y1 {
            image::Rgba([0, 255, 0, 255])
        } else {
            image::Rgba([200, 30, 30, 255])
        }
    })
}

#[test]
fn hsv_conversion_matches_primaries() {
    let (h, s, v) = rgb_to_hsv(0, 255, 0);
    assert!((h - 120.0).abs() < 1e-3);
    assert_eq!((s, v), (1.0, 1.0));
    let (h, _, _) = rgb_to_hsv(255, 0, 0);
    assert!(h.abs() < 1e-3);
    let (h, _, _) = rgb_to_hsv(0, 0, 255);
    assert!((h - 240.0).abs() < 1e-3);
    assert_eq!(rgb_to_hsv(0, 0, 0), (0.0, 0.0, 0.0));
}

#[test]
fn green_range_rejects_dark_and_grey_pixels() {
    let key = KeyColorRange::GREEN;
    assert!(key.contains(0, 255, 0));
    assert!(key.contains(40, 180, 60));
    assert!(!key.contains(10, 30, 10));
    assert!(!key.contains(128, 128, 128));
    assert!(!key.contains(255, 0, 0));
    assert!(!key.contains(0, 0, 255));
}

#[test]
fn counts_partition_every_pixel() {
    let frame = frame_with_green_rect(20, 16, 4, 4, 12, 10);
    let mask = MaskBuilder::default().classify(&frame);
    assert_eq!(mask.true_count() + mask.false_count(), mask.len());
    assert_eq!(mask.len(), 20 * 16);
    assert_eq!(mask.true_count(), 8 * 6);
    assert!(mask.get(4, 4));
    assert!(!mask.get(3, 4));
    assert!(!mask.get(100, 100));
}

#[test]
fn opening_removes_isolated_speckles() {
    let mut frame = frame_with_green_rect(16, 16, 2, 2, 10, 10);
    frame.put_pixel(14, 14, image::Rgba([0, 255, 0, 255]));
    let mask = MaskBuilder::default().classify(&frame);
    assert!(!mask.get(14, 14));
    assert!(mask.get(5, 5));
}

#[test]
fn no_key_color_is_mask_empty() {
    let frame = Frame::from_pixel(8, 8, image::Rgba([255, 255, 255, 255]));
    let err = MaskBuilder::default()
        .build(&frame, Path::new("t.png"))
        .unwrap_err();
    assert!(matches!(err, VertikalError::MaskEmpty { .. }));
}

#[test]
fn from_bools_validates_length_and_packs() {
    assert!(Mask::from_bools(2, 2, &[true, false, true]).is_err());
    let m = Mask::from_bools(70, 1, &[true; 70]).unwrap();
    assert_eq!(m.true_count(), 70);
    assert!(m.get(69, 0));
    let preview = m.to_preview();
    assert_eq!(preview.get_pixel(69, 0).0, [255]);
}
