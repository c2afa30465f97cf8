use super::*;
use crate::config::options::BlurConfig;

fn placement(top: f32, bottom: f32, x: f32, y: f32) -> BlurSpec {
    BlurSpec::new(BlurConfig {
        crop_top_percent: top,
        crop_bottom_percent: bottom,
        x_percent: x,
        y_percent: y,
    })
    .unwrap()
}

const RED: image::Rgba<u8> = image::Rgba([255, 0, 0, 255]);

#[test]
fn inset_stays_inside_canvas_for_all_settings() {
    let canvas = Canvas::new(108, 192).unwrap();
    for (w, h) in [(1, 1), (16, 9), (9, 16), (1920, 1080), (3, 400), (400, 3)] {
        for crop in [0.0, 10.0, 25.0, 40.0] {
            for pct in [0.0, 13.0, 50.0, 87.0, 100.0] {
                let s = placement(crop, crop, pct, 100.0 - pct);
                let (top, bottom) = crop_rows(h, &s);
                assert!(top + bottom < h, "{w}x{h} crop {crop}");
                let rect = inset_geometry(canvas, w, h - top - bottom, &s);
                assert!(rect.fits(canvas), "{w}x{h} crop {crop} pct {pct}: {rect:?}");
            }
        }
    }
}

#[test]
fn inset_uses_fit_fraction_of_limiting_dimension() {
    let canvas = Canvas::new(100, 200).unwrap();
    let rect = inset_geometry(canvas, 100, 50, &placement(0.0, 0.0, 0.0, 0.0));
    assert_eq!((rect.width, rect.height), (90, 45));
    assert_eq!((rect.x, rect.y), (0, 0));

    let rect = inset_geometry(canvas, 100, 50, &placement(0.0, 0.0, 100.0, 100.0));
    assert_eq!((rect.x, rect.y), (10, 155));
}

#[test]
fn crop_rows_keeps_at_least_one_row() {
    let s = placement(40.0, 40.0, 50.0, 50.0);
    assert_eq!(crop_rows(100, &s), (40, 40));
    let (top, bottom) = crop_rows(2, &s);
    assert_eq!(top + bottom, 1);
}

#[test]
fn centered_crop_is_pasted_in_the_middle() {
    let canvas = Canvas::new(100, 200).unwrap();
    // Blue top fifth, red middle, green bottom fifth; a 20/20 crop keeps only red.
    let source = Frame::from_fn(100, 100, |_, y| match y {
        0..20 => image::Rgba([0, 0, 255, 255]),
        80.. => image::Rgba([0, 255, 0, 255]),
        _ => RED,
    });
    let s = placement(20.0, 20.0, 50.0, 50.0);

    let rect = inset_geometry(canvas, 100, 60, &s);
    assert_eq!(rect, InsetRect { x: 5, y: 73, width: 90, height: 54 });
    assert_eq!(rect.x, canvas.width - rect.x - rect.width);
    assert_eq!(rect.y, canvas.height - rect.y - rect.height);

    let out = BlurCompositor::new(canvas).compose(&source, &s).unwrap();
    assert_eq!(out.dimensions(), (100, 200));
    for (x, y) in [(5, 73), (50, 100), (94, 126)] {
        assert_eq!(*out.get_pixel(x, y), RED, "inside inset at {x},{y}");
    }
    assert_ne!(*out.get_pixel(50, 2), RED);
    assert_ne!(*out.get_pixel(50, 197), RED);
}

#[test]
fn output_is_canvas_sized_for_any_source() {
    let canvas = Canvas::new(40, 80).unwrap();
    let c = BlurCompositor::new(canvas);
    for (w, h) in [(1, 1), (7, 3), (200, 90)] {
        let src = Frame::from_pixel(w, h, RED);
        let out = c.compose(&src, &BlurSpec::default()).unwrap();
        assert_eq!(out.dimensions(), (40, 80));
    }
}
