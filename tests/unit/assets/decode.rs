use super::*;

#[test]
fn flatten_makes_every_pixel_opaque() {
    let mut img = Frame::from_raw(
        3,
        1,
        vec![200, 100, 50, 255, 200, 100, 50, 0, 255, 255, 255, 128],
    )
    .unwrap();
    flatten_over_black_in_place(&mut img);
    assert_eq!(img.get_pixel(0, 0).0, [200, 100, 50, 255]);
    assert_eq!(img.get_pixel(1, 0).0, [0, 0, 0, 255]);
    assert_eq!(img.get_pixel(2, 0).0, [128, 128, 128, 255]);
}

#[test]
fn gif_extension_check_is_case_insensitive() {
    assert!(is_gif_path(Path::new("a/b/Template.GIF")));
    assert!(is_gif_path(Path::new("x.gif")));
    assert!(!is_gif_path(Path::new("x.png")));
    assert!(!is_gif_path(Path::new("gif")));
}

#[test]
fn decode_still_png_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("still.png");
    let img = image::RgbaImage::from_pixel(4, 2, image::Rgba([1, 2, 3, 255]));
    img.save(&path).unwrap();

    let frame = decode_image_file(&path).unwrap();
    assert_eq!(frame.dimensions(), (4, 2));
    assert_eq!(frame.get_pixel(3, 1).0, [1, 2, 3, 255]);
}

#[test]
fn decode_gif_keeps_frame_order_and_delays() {
    use image::codecs::gif::GifEncoder;
    use image::{Delay, Frame as GifFrame};

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("anim.gif");
    {
        let file = std::fs::File::create(&path).unwrap();
        let mut enc = GifEncoder::new(file);
        for shade in [0u8, 255u8] {
            let buf = image::RgbaImage::from_pixel(2, 2, image::Rgba([shade, shade, shade, 255]));
            enc.encode_frame(GifFrame::from_parts(
                buf,
                0,
                0,
                Delay::from_numer_denom_ms(100, 1),
            ))
            .unwrap();
        }
    }

    let anim = decode_gif_file(&path).unwrap();
    assert_eq!(anim.frames.len(), 2);
    assert_eq!(anim.delays_ms, vec![100, 100]);
    assert!((anim.mean_delay_ms() - 100.0).abs() < 1e-9);
    assert!(anim.frames[0].get_pixel(0, 0).0[0] < 10);
    assert!(anim.frames[1].get_pixel(0, 0).0[0] > 245);
}
