use super::*;

#[test]
fn over_opaque_source_replaces_destination() {
    assert_eq!(over([1, 2, 3, 255], [9, 8, 7, 255]), [9, 8, 7, 255]);
}

#[test]
fn over_transparent_source_keeps_destination() {
    assert_eq!(over([1, 2, 3, 255], [0, 0, 0, 0]), [1, 2, 3, 255]);
}

#[test]
fn over_half_coverage_mixes() {
    let red = premul_color(Rgb8 { r: 255, g: 0, b: 0 }, 128);
    assert_eq!(red, [128, 0, 0, 128]);
    let out = over([0, 0, 254, 255], red);
    assert_eq!(out[3], 255);
    assert_eq!(out[0], 128);
    assert!(out[2] > 120 && out[2] < 130);
}

#[test]
fn layer_is_clipped_to_frame_bounds() {
    let mut frame = Frame::from_pixel(4, 4, image::Rgba([0, 0, 0, 255]));
    let layer = [255u8, 255, 255, 255].repeat(9);
    over_layer_in_place(&mut frame, &layer, 3, 3, 2, -1).unwrap();
    assert_eq!(frame.get_pixel(2, 0).0, [255, 255, 255, 255]);
    assert_eq!(frame.get_pixel(3, 1).0, [255, 255, 255, 255]);
    assert_eq!(frame.get_pixel(1, 0).0, [0, 0, 0, 255]);
    assert_eq!(frame.get_pixel(3, 2).0, [0, 0, 0, 255]);
    assert!(over_layer_in_place(&mut frame, &layer, 2, 2, 0, 0).is_err());
}
