use super::*;

#[test]
fn project_name_defaults_to_file_stem() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("motivation.yaml");
    std::fs::write(&path, "video:\n  fps: 25\n").unwrap();

    let cfg = ProjectConfig::load(&path).unwrap();
    assert_eq!(cfg.name(), "motivation");
    assert_eq!(cfg.video.fps, 25);
    assert_eq!(cfg.seed, None);
}

#[test]
fn invalid_video_section_fails_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    std::fs::write(&path, "video:\n  quality: 2.0\n").unwrap();
    assert!(matches!(
        ProjectConfig::load(&path),
        Err(SlidecastError::Validation(_))
    ));
}

#[test]
fn paths_split_shared_and_per_project() {
    let cfg = ProjectConfig::from_yaml_str("project_name: facts\ndirectories:\n  music_dir: /srv/music\n")
        .unwrap();
    let p = cfg.paths(Path::new("/work"));
    assert_eq!(p.fonts, PathBuf::from("/work/assets/fonts"));
    assert_eq!(p.music, PathBuf::from("/srv/music"));
    assert_eq!(p.scenarios, PathBuf::from("/work/output/facts/scenarios"));
    assert_eq!(p.output_videos, PathBuf::from("/work/output/facts/videos"));
}

#[test]
fn overrides_win_and_revalidate() {
    let mut cfg = ProjectConfig::default();
    cfg.apply_overrides(&RenderOverrides {
        quality: Some(0.5),
        orientation: Some(Orientation::Horizontal),
        seed: Some(7),
    })
    .unwrap();
    assert_eq!(cfg.video.quality, 0.5);
    assert_eq!(cfg.video.orientation, Orientation::Horizontal);
    assert_eq!(cfg.seed, Some(7));

    let err = cfg
        .apply_overrides(&RenderOverrides { quality: Some(-1.0), ..RenderOverrides::default() })
        .unwrap_err();
    assert!(matches!(err, SlidecastError::Validation(_)));
}

#[test]
fn config_shorthand_resolves_into_configs_dir() {
    assert_eq!(
        ProjectConfig::resolve_config_path("motivation"),
        PathBuf::from("configs/motivation.yaml")
    );
    assert_eq!(
        ProjectConfig::resolve_config_path("x/y.yaml"),
        PathBuf::from("x/y.yaml")
    );
}
