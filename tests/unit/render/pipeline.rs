use super::*;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::Orientation;

fn project() -> ProjectConfig {
    let mut project = ProjectConfig {
        project_name: Some("demo".to_owned()),
        seed: Some(7),
        ..Default::default()
    };
    project.video.quality = 0.02;
    project.video.orientation = Orientation::Vertical;
    project.video.fps = 10;
    project.video.timing.intro_delay = 0.5;
    project.video.timing.outro_delay = 0.5;
    project
}

fn renderer(root: &Path, force: bool) -> ScenarioRenderer {
    let project = project();
    let paths = project.paths(root);
    ScenarioRenderer::with_pools(&project, paths, AssetPools::default(), force).unwrap()
}

fn write_scenario(dir: &Path, name: &str, has_video: bool) -> PathBuf {
    let path = dir.join(format!("{name}.yaml"));
    let yaml = format!(
        "topic: Demo\nslides:\n  - text: Hello\n    duration_seconds: 1.0\n  - text: World\n    duration_seconds: 1.0\nhas_video: {has_video}\n"
    );
    std::fs::write(&path, yaml).unwrap();
    path
}

#[test]
fn canvas_and_output_follow_the_project() {
    let dir = tempfile::tempdir().unwrap();
    let r = renderer(dir.path(), false);
    assert_eq!(
        r.canvas(),
        Canvas {
            width: 20,
            height: 38
        }
    );
    assert_eq!(
        r.output_path("clip"),
        dir.path().join("output/demo/videos/clip.mp4")
    );
}

#[test]
fn compose_places_overlays_on_their_segments() {
    let dir = tempfile::tempdir().unwrap();
    let r = renderer(dir.path(), false);
    let file = ScenarioFile::load(write_scenario(dir.path(), "s", false)).unwrap();
    let schedule = r.schedule_for(&file).unwrap();
    assert!((schedule.total - 3.0).abs() < 1e-9);

    let plan = ScenarioPlan {
        schedule,
        narration: vec![None, None],
        slide_fonts: Vec::new(),
        background: BackgroundPlan::default(),
        music: None,
    };
    let overlays = vec![
        Some(Overlay {
            x: 0,
            y: 0,
            width: 2,
            height: 2,
            rgba8_premul: [255, 0, 0, 255].repeat(4),
        }),
        None,
    ];
    let mut sink = InMemorySink::new();
    let frames = r.compose(&plan, &overlays, &mut sink, None).unwrap();
    assert_eq!(frames, 30);
    assert!(sink.ended());
    assert_eq!(sink.frames().len(), 30);

    let px = |idx: usize| sink.frames()[idx].1.pixel(0, 0).unwrap();
    assert_eq!(px(0), [0, 0, 0, 255]);
    assert_eq!(px(6), [255, 0, 0, 255]);
    assert_eq!(px(16), [0, 0, 0, 255]);
    assert_eq!(px(29), [0, 0, 0, 255]);
}

#[test]
fn corrupt_clip_on_empty_slide_keeps_declared_duration() {
    let dir = tempfile::tempdir().unwrap();
    let r = renderer(dir.path(), false);
    let path = dir.path().join("quiet.yaml");
    std::fs::write(
        &path,
        "topic: Demo\nslides:\n  - text: Hello\n    duration_seconds: 1.0\n  - text: ''\n    duration_seconds: 2.0\nhas_video: false\n",
    )
    .unwrap();
    std::fs::create_dir_all(&r.paths().voice_lines).unwrap();
    std::fs::write(
        crate::audio::narration::narration_clip_path(&r.paths().voice_lines, "quiet", 1),
        b"not a wav file",
    )
    .unwrap();

    let file = ScenarioFile::load(&path).unwrap();
    let schedule = r.schedule_for(&file).unwrap();
    assert_eq!(schedule.segments.len(), 2);
    assert!((schedule.segments[1].duration() - 2.0).abs() < 1e-9);
    assert!((schedule.total - 4.0).abs() < 1e-9);
}

#[test]
fn seeded_rng_is_per_scenario_and_stable() {
    use rand::Rng;
    let dir = tempfile::tempdir().unwrap();
    let r = renderer(dir.path(), false);
    let a: u64 = r.rng_for("alpha").r#gen();
    let again: u64 = r.rng_for("alpha").r#gen();
    let b: u64 = r.rng_for("beta").r#gen();
    assert_eq!(a, again);
    assert_ne!(a, b);
}

#[test]
fn processed_scenario_is_skipped_without_touching_anything() {
    let dir = tempfile::tempdir().unwrap();
    let r = renderer(dir.path(), false);
    let path = write_scenario(dir.path(), "done", true);
    let before = std::fs::read(&path).unwrap();

    let outcome = r.render(&path).unwrap();
    assert!(matches!(outcome, ScenarioOutcome::Skipped { .. }));
    assert_eq!(std::fs::read(&path).unwrap(), before);
    assert!(!r.output_path("done").exists());
}

#[test]
fn missing_fonts_fail_the_scenario_and_leave_it_unprocessed() {
    let dir = tempfile::tempdir().unwrap();
    let r = renderer(dir.path(), false);
    let path = write_scenario(dir.path(), "nofont", false);

    let err = r.render(&path).unwrap_err();
    assert!(matches!(err, SlidecastError::Font(_)), "{err}");

    let file = ScenarioFile::load(&path).unwrap();
    assert!(!file.scenario.has_video);
    let output = r.output_path("nofont");
    assert!(!output.exists());
    assert!(!with_suffix(&output, ".lock").exists());
    assert!(!with_suffix(&output, ".part").exists());
}

#[test]
fn claimed_output_is_not_rendered_twice() {
    let dir = tempfile::tempdir().unwrap();
    let r = renderer(dir.path(), false);
    let path = write_scenario(dir.path(), "busy", false);
    let output = r.output_path("busy");
    std::fs::create_dir_all(output.parent().unwrap()).unwrap();
    std::fs::write(with_suffix(&output, ".lock"), LockOwner::current().to_string()).unwrap();

    let err = r.render(&path).unwrap_err();
    assert!(matches!(err, SlidecastError::Validation(_)));
    assert!(with_suffix(&output, ".lock").exists());
}

fn assert_lock_reclaimed(lock_contents: &str) {
    let dir = tempfile::tempdir().unwrap();
    let r = renderer(dir.path(), false);
    let path = write_scenario(dir.path(), "crashed", false);
    let output = r.output_path("crashed");
    std::fs::create_dir_all(output.parent().unwrap()).unwrap();
    std::fs::write(with_suffix(&output, ".lock"), lock_contents).unwrap();
    std::fs::write(with_suffix(&output, ".part"), b"half an mp4").unwrap();

    // No fonts are installed, so the render gets past the claim and fails in planning.
    for _ in 0..2 {
        let err = r.render(&path).unwrap_err();
        assert!(matches!(err, SlidecastError::Font(_)), "{err}");
        assert!(!with_suffix(&output, ".lock").exists());
        assert!(!with_suffix(&output, ".part").exists());
    }
}

#[test]
fn lock_without_owner_record_is_reclaimed() {
    assert_lock_reclaimed("");
    assert_lock_reclaimed("garbage");
}

#[test]
fn expired_lock_is_reclaimed() {
    let owner = LockOwner {
        pid: std::process::id(),
        created: unix_now() - STALE_LOCK_AGE.as_secs() - 60,
    };
    assert_lock_reclaimed(&owner.to_string());
}

#[test]
fn lock_of_exited_process_is_reclaimed() {
    if !Path::new("/proc/self").exists() {
        return;
    }
    let Ok(mut child) = std::process::Command::new("true").spawn() else {
        return;
    };
    let pid = child.id();
    child.wait().unwrap();
    assert!(!process_alive(pid));
    let owner = LockOwner {
        pid,
        created: unix_now(),
    };
    assert_lock_reclaimed(&owner.to_string());
}

#[test]
fn lock_owner_record_parses() {
    let owner = LockOwner {
        pid: 42,
        created: 1_700_000_000,
    };
    assert_eq!(LockOwner::parse(&format!("{owner}\n")), Some(owner));
    assert_eq!(LockOwner::parse("42"), None);
    assert!(!LockOwner::current().is_stale(unix_now()));
}

#[test]
fn empty_font_pool_fails_planning() {
    let dir = tempfile::tempdir().unwrap();
    let r = renderer(dir.path(), false);
    let file = ScenarioFile::load(write_scenario(dir.path(), "p", false)).unwrap();
    let mut rng = r.rng_for(&file.id);
    assert!(matches!(
        r.plan(&file, &mut rng).unwrap_err(),
        SlidecastError::Font(_)
    ));
}
