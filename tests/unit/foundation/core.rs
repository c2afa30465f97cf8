use super::*;

#[test]
fn fps_parses_ffprobe_ratios() {
    let ntsc = Fps::parse_ratio("30000/1001").unwrap();
    assert_eq!(ntsc, Fps { num: 30000, den: 1001 });
    assert_eq!(Fps::parse_ratio("25").unwrap(), Fps { num: 25, den: 1 });
    assert!(Fps::parse_ratio("0/0").is_err());
    assert!(Fps::parse_ratio("abc").is_err());
}

#[test]
fn fps_rounds_seconds_to_frames() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.secs_to_frames_round(10.0), 300);
    assert_eq!(fps.secs_to_frames_round(0.016), 0);
    assert_eq!(fps.secs_to_frames_round(0.017), 1);
    assert!((fps.frames_to_secs(45) - 1.5).abs() < 1e-9);
}

#[test]
fn canvas_requires_even_dimensions() {
    assert!(Canvas::new(1080, 1920).is_ok());
    assert!(Canvas::new(1081, 1920).is_err());
    assert!(Canvas::new(0, 1920).is_err());
    assert_eq!(Canvas::default(), Canvas::PORTRAIT_1080);
}

#[test]
fn hex_colors_round_trip_through_parse() {
    let c = Rgb8::from_hex("#FF8000").unwrap();
    assert_eq!(c, Rgb8 { r: 255, g: 128, b: 0 });
    assert_eq!(c.to_hex(), "#ff8000");
    assert_eq!(Rgb8::from_hex("000000").unwrap(), Rgb8::BLACK);
    assert!(Rgb8::from_hex("#12345").is_err());
    assert!(Rgb8::from_hex("#gg0000").is_err());
}
