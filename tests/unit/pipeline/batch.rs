use super::*;

use std::fs;

use rand::SeedableRng as _;
use rand::rngs::StdRng;

use crate::config::batch::BatchConfig;
use crate::config::options::AudioConfig;
use crate::foundation::core::Canvas;

fn touch(path: &Path) {
    fs::write(path, b"").unwrap();
}

fn write_template(path: &Path, green: bool) {
    let img = image::RgbaImage::from_fn(20, 36, |x, y| {
        let inside = (5..15).contains(&x) && (8..28).contains(&y);
        if green && inside {
            image::Rgba([0, 255, 0, 255])
        } else {
            image::Rgba([200, 30, 30, 255])
        }
    });
    img.save(path).unwrap();
}

fn settings(mode: ProcessingMode, f: impl FnOnce(&mut BatchConfig)) -> BatchSettings {
    let mut cfg = BatchConfig::new(mode);
    cfg.canvas = Canvas::new(20, 36).unwrap();
    f(&mut cfg);
    cfg.validate().unwrap()
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

#[test]
fn extensions_match_case_insensitively() {
    assert!(has_extension(Path::new("a/clip.MP4"), &VIDEO_EXTENSIONS));
    assert!(has_extension(Path::new("song.Flac"), &AUDIO_EXTENSIONS));
    assert!(!has_extension(Path::new("notes.txt"), &VIDEO_EXTENSIONS));
    assert!(!has_extension(Path::new("noext"), &VIDEO_EXTENSIONS));
    assert!(is_clip_path(Path::new("loop.gif")));
}

#[test]
fn folder_listing_is_sorted_and_filtered() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["b.mp3", "a.wav", "c.txt", "d.OGG"] {
        touch(&dir.path().join(name));
    }
    fs::create_dir(dir.path().join("nested.mp3")).unwrap();

    let files = list_files_with_extensions(dir.path(), &AUDIO_EXTENSIONS).unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["a.wav", "b.mp3", "d.OGG"]);
}

#[test]
fn collect_inputs_expands_folders_and_skips_unknown_files() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["2.mov", "1.mp4", "x.gif", "readme.md"] {
        touch(&dir.path().join(name));
    }
    let extra = dir.path().join("readme.md");
    let got = collect_inputs(&[dir.path().to_path_buf(), extra]).unwrap();
    let names: Vec<_> = got
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["1.mp4", "2.mov", "x.gif"]);
}

#[test]
fn output_locations_follow_mode_and_stem() {
    let inputs = vec![PathBuf::from("/clips/holiday.mp4")];
    let dir = output_dir_for(ProcessingMode::Blur, None, &inputs);
    assert_eq!(dir, PathBuf::from("/clips/edited_videos_blur"));
    let dir = output_dir_for(ProcessingMode::Greenscreen, Some(Path::new("/out")), &inputs);
    assert_eq!(dir, PathBuf::from("/out/edited_videos_greenscreen"));
    assert_eq!(
        output_path_for(&dir, &inputs[0]),
        PathBuf::from("/out/edited_videos_greenscreen/edited_holiday.mp4")
    );
}

#[test]
fn tracks_follow_audio_mode() {
    let dir = tempfile::tempdir().unwrap();
    let s = settings(ProcessingMode::Blur, |c| {
        c.audio = AudioConfig {
            dual_audio_enabled: true,
            original_volume: 80,
            background_volume: 25,
            background_folder: Some(dir.path().to_path_buf()),
            ..AudioConfig::default()
        };
    });
    let bg = PathBuf::from("bg.mp3");
    let input = Path::new("clip.mp4");

    let (dual, fallback) = tracks_for(AudioMode::Dual, input, Some(bg.clone()), &s);
    assert_eq!(dual.len(), 2);
    assert_eq!(dual[0].volume.percent(), 80);
    assert_eq!(dual[1].path, bg);
    assert_eq!(dual[1].volume.percent(), 25);
    assert!(fallback.is_none());

    let (background, fallback) = tracks_for(AudioMode::Background, input, Some(bg.clone()), &s);
    assert_eq!(background.len(), 1);
    assert_eq!(background[0].path, bg);
    // The clip's own audio stands in when the background track is unusable.
    assert_eq!(fallback, Some(AudioTrackRef::new(input, VolumePercent::FULL)));

    let (original, fallback) = tracks_for(AudioMode::Original, input, None, &s);
    assert_eq!(original.len(), 1);
    assert_eq!(original[0].volume, VolumePercent::FULL);
    assert!(fallback.is_none());

    // GIFs have no audio of their own.
    let (gif, _) = tracks_for(AudioMode::Dual, Path::new("loop.gif"), Some(bg.clone()), &s);
    assert_eq!(gif.len(), 1);
    let (gif, fallback) = tracks_for(AudioMode::Background, Path::new("loop.gif"), Some(bg), &s);
    assert_eq!(gif.len(), 1);
    assert!(fallback.is_none());
    assert!(tracks_for(AudioMode::Original, Path::new("loop.gif"), None, &s).0.is_empty());
}

#[test]
fn prepare_rejects_empty_input_list() {
    let s = settings(ProcessingMode::Blur, |_| {});
    let err = Batch::prepare(s, Vec::new(), &FontResolver::empty(), &mut rng())
        .err()
        .unwrap();
    assert!(matches!(err, VertikalError::Validation(_)));
}

#[test]
fn prepare_blur_plans_one_job_per_input() {
    let dir = tempfile::tempdir().unwrap();
    let s = settings(ProcessingMode::Blur, |c| {
        c.output_dir = Some(dir.path().to_path_buf());
    });
    let inputs = vec![PathBuf::from("a.mp4"), PathBuf::from("b.gif")];
    let batch = Batch::prepare(s, inputs, &FontResolver::empty(), &mut rng()).unwrap();

    let jobs = batch.jobs();
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].name, "a.mp4");
    assert_eq!(jobs[0].caption, "a");
    assert_eq!(jobs[0].length, JobLength::SourceLength);
    assert_eq!(
        jobs[1].output,
        dir.path().join("edited_videos_blur").join("edited_b.mp4")
    );
    assert!(jobs[1].audio_tracks.is_empty());
}

#[test]
fn prepare_fails_on_template_without_key_color() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("plain.png");
    write_template(&template, false);
    let s = settings(ProcessingMode::Greenscreen, |c| c.template = Some(template.clone()));

    let err = Batch::prepare(s, vec![PathBuf::from("a.mp4")], &FontResolver::empty(), &mut rng())
        .err()
        .unwrap();
    assert!(matches!(err, VertikalError::MaskEmpty { ref path } if path == &template));
    assert!(err.is_fatal_for_batch());
}

#[test]
fn prepare_requires_template_and_accepts_keyed_one() {
    let s = settings(ProcessingMode::Greenscreen, |_| {});
    let err = Batch::prepare(s, vec![PathBuf::from("a.mp4")], &FontResolver::empty(), &mut rng())
        .err()
        .unwrap();
    assert!(matches!(err, VertikalError::Validation(_)));

    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("frame.png");
    write_template(&template, true);
    let s = settings(ProcessingMode::Greenscreen, |c| c.template = Some(template));
    let batch =
        Batch::prepare(s, vec![PathBuf::from("a.mp4")], &FontResolver::empty(), &mut rng())
            .unwrap();
    assert!(matches!(batch.composer, FrameComposer::Chroma(_)));
}

#[test]
fn missing_template_file_is_a_load_error() {
    let s = settings(ProcessingMode::Greenscreen, |c| {
        c.template = Some(PathBuf::from("/definitely/missing.png"));
    });
    let err = Batch::prepare(s, vec![PathBuf::from("a.mp4")], &FontResolver::empty(), &mut rng())
        .err()
        .unwrap();
    assert!(matches!(err, VertikalError::TemplateLoad { .. }));
}

#[test]
fn background_mode_needs_audio_in_folder() {
    let dir = tempfile::tempdir().unwrap();
    let s = settings(ProcessingMode::Blur, |c| {
        c.audio.background_enabled = true;
        c.audio.background_folder = Some(dir.path().to_path_buf());
    });
    let err = Batch::prepare(s, vec![PathBuf::from("a.mp4")], &FontResolver::empty(), &mut rng())
        .err()
        .unwrap();
    assert!(matches!(err, VertikalError::Validation(_)));

    touch(&dir.path().join("only.mp3"));
    let s = settings(ProcessingMode::Blur, |c| {
        c.audio.background_enabled = true;
        c.audio.background_folder = Some(dir.path().to_path_buf());
    });
    let batch = Batch::prepare(
        s,
        vec![PathBuf::from("a.mp4"), PathBuf::from("b.mp4")],
        &FontResolver::empty(),
        &mut rng(),
    )
    .unwrap();
    for job in batch.jobs() {
        assert_eq!(job.audio_tracks.len(), 1);
        assert_eq!(job.audio_tracks[0].path, dir.path().join("only.mp3"));
        assert_eq!(job.audio_tracks[0].volume.percent(), 30);
    }
}

#[test]
fn narasi_plans_single_audio_driven_job() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("frame.png");
    write_template(&template, true);
    let narration = dir.path().join("story time.mp3");
    touch(&narration);
    let s = settings(ProcessingMode::Narasi, |c| {
        c.template = Some(template);
        c.narration_audio = Some(narration.clone());
        c.output_dir = Some(dir.path().to_path_buf());
    });
    let inputs = vec![
        PathBuf::from("1.mp4"),
        PathBuf::from("2.mp4"),
        PathBuf::from("3.mp4"),
    ];
    let batch = Batch::prepare(s, inputs.clone(), &FontResolver::empty(), &mut rng()).unwrap();

    let [job] = batch.jobs() else {
        panic!("expected one job");
    };
    assert_eq!(job.inputs, inputs);
    assert_eq!(job.caption, NARASI_CAPTION);
    assert_eq!(job.length, JobLength::AudioLength(narration.clone()));
    assert_eq!(job.audio_tracks, vec![AudioTrackRef::new(&narration, VolumePercent::FULL)]);
    assert_eq!(
        job.output,
        dir.path().join("edited_videos_narasi").join(NARASI_OUTPUT)
    );
}

#[test]
fn narasi_caption_uses_fixed_content_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("frame.png");
    write_template(&template, true);
    let narration = dir.path().join("story_time.wav");
    touch(&narration);
    let s = settings(ProcessingMode::Narasi, |c| {
        c.template = Some(template);
        c.narration_audio = Some(narration);
        c.text.content = Some("Part 1".to_string());
    });

    let batch =
        Batch::prepare(s, vec![PathBuf::from("1.mp4")], &FontResolver::empty(), &mut rng()).unwrap();
    assert_eq!(batch.jobs()[0].caption, "Part 1");
}

#[test]
fn narasi_rejects_missing_narration_and_gif_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("frame.png");
    write_template(&template, true);

    let s = settings(ProcessingMode::Narasi, |c| c.template = Some(template.clone()));
    let err = Batch::prepare(s, vec![PathBuf::from("1.mp4")], &FontResolver::empty(), &mut rng())
        .err()
        .unwrap();
    assert!(matches!(err, VertikalError::Validation(_)));

    let narration = dir.path().join("n.wav");
    touch(&narration);
    let s = settings(ProcessingMode::Narasi, |c| {
        c.template = Some(template);
        c.narration_audio = Some(narration);
    });
    let err = Batch::prepare(s, vec![PathBuf::from("1.gif")], &FontResolver::empty(), &mut rng())
        .err()
        .unwrap();
    assert!(matches!(err, VertikalError::Validation(_)));
}

#[test]
fn summary_reports_counts_and_cancellation() {
    let mut report = BatchReport {
        mode: ProcessingMode::Blur,
        successful: 2,
        total: 3,
        outputs: Vec::new(),
        failures: Vec::new(),
        cancelled: false,
        audio: "original audio only".to_string(),
    };
    assert_eq!(report.summary(), "blur: 2/3 videos processed (original audio only)");
    assert!(!report.all_succeeded());
    report.cancelled = true;
    assert!(report.summary().ends_with(", cancelled"));
}
