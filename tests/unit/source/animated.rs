use super::*;

#[test]
fn rate_follows_mean_delay() {
    assert_eq!(fps_for_mean_delay(100.0).unwrap().as_f64(), 10.0);
    assert_eq!(fps_for_mean_delay(40.0).unwrap().as_f64(), 25.0);
}

#[test]
fn rate_is_clamped_and_defaults_without_delays() {
    assert_eq!(fps_for_mean_delay(0.0).unwrap().as_f64(), DEFAULT_GIF_FPS);
    assert_eq!(fps_for_mean_delay(f64::NAN).unwrap().as_f64(), DEFAULT_GIF_FPS);
    assert_eq!(fps_for_mean_delay(5.0).unwrap().as_f64(), MAX_GIF_FPS);
    assert_eq!(fps_for_mean_delay(5000.0).unwrap().as_f64(), 1.0);
}

#[test]
fn from_animation_replays_every_frame() {
    let anim = DecodedAnimation {
        frames: vec![
            Frame::from_pixel(2, 2, image::Rgba([1, 0, 0, 255])),
            Frame::from_pixel(2, 2, image::Rgba([2, 0, 0, 255])),
        ],
        delays_ms: vec![50, 150],
    };
    let mut s = AnimatedSource::from_animation("a.gif", anim).unwrap();
    assert_eq!(s.fps().as_f64(), 10.0);
    assert_eq!(s.frame_count_hint(), Some(2));
    assert_eq!(s.next_frame().unwrap().unwrap().get_pixel(0, 0)[0], 1);
    assert_eq!(s.next_frame().unwrap().unwrap().get_pixel(0, 0)[0], 2);
    assert!(s.next_frame().unwrap().is_none());
    s.rewind().unwrap();
    assert_eq!(s.next_frame().unwrap().unwrap().get_pixel(0, 0)[0], 1);
}

#[test]
fn open_decodes_gif_from_disk() {
    use image::codecs::gif::GifEncoder;
    use image::{Delay, Frame as AnimFrame};

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.gif");
    {
        let file = std::fs::File::create(&path).unwrap();
        let mut enc = GifEncoder::new(file);
        for shade in [10u8, 200] {
            let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([shade, shade, shade, 255]));
            enc.encode_frame(AnimFrame::from_parts(
                img,
                0,
                0,
                Delay::from_numer_denom_ms(200, 1),
            ))
            .unwrap();
        }
    }
    let s = AnimatedSource::open(&path).unwrap();
    assert_eq!(s.dimensions(), (4, 4));
    assert_eq!(s.frame_count_hint(), Some(2));
    assert_eq!(s.fps().as_f64(), 5.0);
}
