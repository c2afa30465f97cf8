use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        VertikalError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(VertikalError::media("x").to_string().contains("media error:"));
    assert!(
        VertikalError::audio_mix("x")
            .to_string()
            .contains("audio mix error:")
    );
    assert!(
        VertikalError::empty_source("clip.mp4")
            .to_string()
            .contains("clip.mp4")
    );
}

#[test]
fn encoding_open_lists_every_candidate() {
    let err = VertikalError::EncodingOpen {
        tried: vec!["libx264".to_string(), "mpeg4".to_string()],
        last_error: "unknown encoder".to_string(),
    };
    let msg = err.to_string();
    assert!(msg.contains("libx264, mpeg4"));
    assert!(msg.contains("unknown encoder"));
}

#[test]
fn batch_fatal_classification() {
    assert!(VertikalError::template_load("t.png", "missing").is_fatal_for_batch());
    assert!(
        VertikalError::MaskEmpty {
            path: "t.png".into()
        }
        .is_fatal_for_batch()
    );
    assert!(!VertikalError::empty_source("a").is_fatal_for_batch());
    assert!(!VertikalError::audio_mix("a").is_fatal_for_batch());
    assert!(!VertikalError::validation("blur source frame is empty").is_fatal_for_batch());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = VertikalError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
