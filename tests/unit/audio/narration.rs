use super::*;
use crate::assets::media::media_tools_available;

#[test]
fn clip_paths_use_one_based_padded_indices() {
    let p = narration_clip_path(Path::new("voice"), "space_facts", 0);
    assert_eq!(p, PathBuf::from("voice/space_facts_slide_01.wav"));
    let p = narration_clip_path(Path::new("voice"), "space_facts", 11);
    assert_eq!(p, PathBuf::from("voice/space_facts_slide_12.wav"));
}

#[test]
fn missing_clips_are_none() {
    let dir = tempfile::tempdir().unwrap();
    let clips = load_scenario_narration(dir.path(), "s", 2, &AudioConfig::default());
    assert_eq!(clips.len(), 2);
    assert!(clips.iter().all(Option::is_none));
    assert_eq!(clip_durations(&clips), vec![None, None]);
}

#[test]
fn corrupt_clip_degrades_to_none() {
    if !media_tools_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(narration_clip_path(dir.path(), "s", 0), b"garbage").unwrap();
    assert!(load_narration_clip(&narration_clip_path(dir.path(), "s", 0), 1, &AudioConfig::default()).is_none());
}

#[test]
fn decoded_clip_reports_its_duration() {
    if !media_tools_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let path = narration_clip_path(dir.path(), "s", 0);
    let status = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-y", "-f", "lavfi", "-i"])
        .arg("sine=frequency=440:duration=1")
        .arg(&path)
        .status()
        .unwrap();
    if !status.success() {
        return;
    }
    let mut cfg = AudioConfig::default();
    cfg.silence_trimming.enabled = false;
    let clips = load_scenario_narration(dir.path(), "s", 1, &cfg);
    let secs = clip_durations(&clips)[0].unwrap();
    assert!((secs - 1.0).abs() < 0.05, "{secs}");
}
