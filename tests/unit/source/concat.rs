use super::*;
use crate::source::MemorySource;

fn clip(name: &str, fps: Fps, w: u32, h: u32, count: usize) -> Box<dyn FrameSource> {
    Box::new(MemorySource::numbered(name, fps, w, h, count))
}

#[test]
fn frames_play_back_to_back_at_first_resolution() {
    let fps = Fps::new(10, 1).unwrap();
    let mut c = concatenate(vec![
        clip("a", fps, 4, 8, 2),
        clip("b", Fps::new(25, 1).unwrap(), 16, 16, 3),
    ])
    .unwrap();
    assert_eq!(c.source_count(), 2);
    assert_eq!(c.fps(), fps);
    assert_eq!(c.dimensions(), (4, 8));
    assert_eq!(c.frame_count_hint(), Some(5));

    let mut seen = Vec::new();
    while let Some(f) = c.next_frame().unwrap() {
        assert_eq!(f.dimensions(), (4, 8));
        seen.push(f.get_pixel(0, 0)[0]);
    }
    assert_eq!(seen, vec![0, 1, 0, 1, 2]);

    c.rewind().unwrap();
    assert_eq!(c.next_frame().unwrap().unwrap().get_pixel(0, 0)[0], 0);
}

#[test]
fn twelve_seconds_of_clips_sum_their_frames() {
    let fps = Fps::new(30, 1).unwrap();
    let c = concatenate(vec![
        clip("a", fps, 2, 2, 120),
        clip("b", fps, 2, 2, 150),
        clip("c", fps, 2, 2, 90),
    ])
    .unwrap();
    assert_eq!(c.frame_count_hint(), Some(360));
    assert!((c.duration_hint().unwrap() - 12.0).abs() < 1e-9);
}

#[test]
fn nothing_to_concatenate_is_rejected() {
    assert!(matches!(
        concatenate(Vec::new()),
        Err(VertikalError::Validation(_))
    ));
    let empty: Box<dyn FrameSource> = Box::new(MemorySource::new("e", Fps::new(1, 1).unwrap(), vec![]));
    assert!(matches!(
        concatenate(vec![empty]),
        Err(VertikalError::EmptySource(_))
    ));
}
