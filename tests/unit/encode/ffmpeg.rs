use super::*;
use crate::assets::media::is_ffmpeg_on_path;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn first_successful_candidate_wins() {
    let mut attempts = Vec::new();
    let (name, value) = open_first(&names(&["hw_a", "libx264", "hw_b"]), |enc| {
        attempts.push(enc.to_string());
        if enc == "libx264" {
            Ok(42)
        } else {
            Err(VertikalError::media(format!("{enc} missing")))
        }
    })
    .unwrap();
    assert_eq!(name, "libx264");
    assert_eq!(value, 42);
    assert_eq!(attempts, vec!["hw_a", "libx264"]);
}

#[test]
fn exhaustion_reports_every_attempt_and_last_error() {
    let err = open_first::<()>(&names(&["a", "b"]), |enc| {
        Err(VertikalError::media(format!("{enc} broke")))
    })
    .unwrap_err();
    match err {
        VertikalError::EncodingOpen { tried, last_error } => {
            assert_eq!(tried, vec!["a", "b"]);
            assert!(last_error.contains("b broke"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn no_candidates_is_an_open_error() {
    let err = open_first::<()>(&[], |_| Ok(())).unwrap_err();
    assert!(matches!(err, VertikalError::EncodingOpen { tried, .. } if tried.is_empty()));
}

#[test]
fn default_list_starts_with_software_x264() {
    assert_eq!(DEFAULT_ENCODERS[0], "libx264");
    assert_eq!(DEFAULT_ENCODERS.len(), 5);
}

#[test]
fn bogus_encoder_fails_probe() {
    if !is_ffmpeg_on_path() {
        return;
    }
    let cfg = SinkConfig {
        width: 64,
        height: 64,
        fps: Fps::new(30, 1).unwrap(),
    };
    assert!(probe_encoder("definitely_not_an_encoder", cfg).is_err());
}

#[test]
fn encoder_check_uses_job_canvas() {
    let cfg = SinkConfig {
        width: 1080,
        height: 1920,
        fps: Fps::new(30000, 1001).unwrap(),
    };
    let args = probe_args("h264_nvenc", cfg);
    assert!(args.contains(&"color=c=black:s=1080x1920:r=30000/1001:d=1".to_string()));
    let codec = args.iter().position(|a| a == "-c:v").unwrap();
    assert_eq!(args[codec + 1], "h264_nvenc");
}

#[test]
fn sink_rejects_odd_dimensions_before_spawning() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(dir.path().join("o.mp4"), "libx264"));
    let err = sink
        .begin(SinkConfig {
            width: 3,
            height: 4,
            fps: Fps::new(30, 1).unwrap(),
        })
        .unwrap_err();
    assert!(matches!(err, VertikalError::Validation(_)));
    assert_eq!(sink.encoder(), "libx264");
}
