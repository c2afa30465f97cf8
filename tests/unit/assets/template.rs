use super::*;

fn solid(canvas: Canvas, rgb: [u8; 3]) -> Frame {
    Frame::from_pixel(
        canvas.width,
        canvas.height,
        image::Rgba([rgb[0], rgb[1], rgb[2], 255]),
    )
}

#[test]
fn animated_template_cycles_per_output_frame() {
    let canvas = Canvas::new(4, 4).unwrap();
    let frames = (0..3)
        .map(|i| TemplateFrame {
            image: solid(canvas, [i * 10, 0, 0]),
            delay_ms: 40,
        })
        .collect();
    let t = TemplateAsset::from_frames("anim.gif", frames).unwrap();
    assert!(t.is_animated());
    let seq: Vec<usize> = (0..7).map(|i| t.index_for_output(i)).collect();
    assert_eq!(seq, vec![0, 1, 2, 0, 1, 2, 0]);
}

#[test]
fn empty_template_is_a_load_error() {
    let err = TemplateAsset::from_frames("t.gif", Vec::new()).unwrap_err();
    assert!(matches!(err, VertikalError::TemplateLoad { .. }));
}

#[test]
fn missing_file_is_a_load_error() {
    let err = TemplateAsset::load(Path::new("does/not/exist.png"), Canvas::new(4, 4).unwrap())
        .unwrap_err();
    assert!(matches!(err, VertikalError::TemplateLoad { .. }));
    assert!(err.is_fatal_for_batch());
}

#[test]
fn still_template_is_stretched_to_canvas() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.png");
    image::RgbaImage::from_pixel(3, 5, image::Rgba([0, 255, 0, 255]))
        .save(&path)
        .unwrap();

    let canvas = Canvas::new(8, 12).unwrap();
    let t = TemplateAsset::load(&path, canvas).unwrap();
    assert!(!t.is_animated());
    assert_eq!(t.frames()[0].image.dimensions(), (8, 12));
    assert_eq!(t.index_for_output(99), 0);
}
