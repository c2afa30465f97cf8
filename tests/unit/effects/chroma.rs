use super::*;
use crate::assets::template::TemplateFrame;
use std::path::Path;

const GREEN: image::Rgba<u8> = image::Rgba([0, 255, 0, 255]);
const FRAME_BORDER: image::Rgba<u8> = image::Rgba([250, 250, 250, 255]);

fn template_with_window(canvas: Canvas) -> Frame {
    Frame::from_fn(canvas.width, canvas.height, |x, y| {
        let inside = x >= 2 && x < canvas.width - 2 && y >= 2 && y < canvas.height - 2;
        if inside { GREEN } else { FRAME_BORDER }
    })
}

#[test]
fn output_always_matches_canvas() {
    let canvas = Canvas::new(12, 20).unwrap();
    let template = template_with_window(canvas);
    let mask = MaskBuilder::default()
        .build(&template, Path::new("t.png"))
        .unwrap();
    let c = ChromaKeyCompositor::new(canvas);
    for (w, h) in [(1, 1), (5, 3), (12, 20), (64, 48), (7, 100)] {
        let src = Frame::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
        let out = c.compose(&template, &src, &mask).unwrap();
        assert_eq!(out.dimensions(), (12, 20));
    }
}

#[test]
fn key_region_shows_source_and_rest_keeps_template() {
    let canvas = Canvas::new(12, 20).unwrap();
    let template = template_with_window(canvas);
    let mask = MaskBuilder::default()
        .build(&template, Path::new("t.png"))
        .unwrap();
    let src = Frame::from_pixel(3, 3, image::Rgba([10, 20, 30, 255]));
    let out = ChromaKeyCompositor::new(canvas)
        .compose(&template, &src, &mask)
        .unwrap();
    assert_eq!(*out.get_pixel(6, 10), image::Rgba([10, 20, 30, 255]));
    assert_eq!(*out.get_pixel(0, 0), FRAME_BORDER);
    assert_eq!(*out.get_pixel(11, 19), FRAME_BORDER);
}

#[test]
fn mismatched_template_is_rejected() {
    let canvas = Canvas::new(12, 20).unwrap();
    let template = template_with_window(Canvas::new(10, 20).unwrap());
    let mask = Mask::from_bools(10, 20, &[true; 200]).unwrap();
    let src = Frame::from_pixel(3, 3, GREEN);
    assert!(
        ChromaKeyCompositor::new(canvas)
            .compose(&template, &src, &mask)
            .is_err()
    );
}

#[test]
fn animated_layer_advances_template_per_output_frame() {
    let canvas = Canvas::new(8, 8).unwrap();
    let shades = [10u8, 20, 30];
    let frames = shades
        .iter()
        .map(|&s| TemplateFrame {
            image: Frame::from_fn(8, 8, |x, _| {
                if x < 4 { GREEN } else { image::Rgba([s, s, s, 255]) }
            }),
            delay_ms: 50,
        })
        .collect();
    let template = TemplateAsset::from_frames("anim.gif", frames).unwrap();
    let layer = ChromaKeyLayer::prepare(template, &MaskBuilder::default(), canvas).unwrap();

    let src = Frame::from_pixel(2, 2, image::Rgba([200, 0, 0, 255]));
    for out_idx in 0..7u64 {
        let out = layer.compose(out_idx, &src).unwrap();
        let expect = shades[(out_idx % 3) as usize];
        assert_eq!(out.get_pixel(7, 0).0, [expect, expect, expect, 255]);
        assert_eq!(out.get_pixel(0, 0).0, [200, 0, 0, 255]);
    }
}

#[test]
fn layer_without_key_pixels_fails_before_compositing() {
    let canvas = Canvas::new(8, 8).unwrap();
    let frames = vec![TemplateFrame {
        image: Frame::from_pixel(8, 8, FRAME_BORDER),
        delay_ms: 0,
    }];
    let template = TemplateAsset::from_frames("plain.png", frames).unwrap();
    let err = ChromaKeyLayer::prepare(template, &MaskBuilder::default(), canvas).unwrap_err();
    assert!(matches!(err, VertikalError::MaskEmpty { .. }));
}
