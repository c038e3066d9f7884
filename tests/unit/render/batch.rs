use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::config::project::ProjectConfig;
use crate::render::pipeline::AssetPools;

fn write(dir: &Path, name: &str, has_video: bool) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(
        &path,
        format!("slides:\n  - text: Hi\n    duration_seconds: 1.0\nhas_video: {has_video}\n"),
    )
    .unwrap();
    path
}

#[test]
fn selection_modes() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.yaml", false);
    write(dir.path(), "b.yaml", true);
    let c = write(dir.path(), "c.yml", false);
    let mut rng = StdRng::seed_from_u64(1);

    let all = select_scenarios(dir.path(), &Selection::AllUnprocessed, &mut rng).unwrap();
    assert_eq!(all, vec![a.clone(), c.clone()]);

    let one = select_scenarios(dir.path(), &Selection::One("b".into()), &mut rng).unwrap();
    assert_eq!(one, vec![dir.path().join("b.yaml")]);

    let picked = select_scenarios(dir.path(), &Selection::Random(1), &mut rng).unwrap();
    assert_eq!(picked.len(), 1);
    assert!(picked[0] == a || picked[0] == c);

    let many = select_scenarios(dir.path(), &Selection::Random(10), &mut rng).unwrap();
    assert_eq!(many, vec![a, c]);

    assert!(resolve_scenario(dir.path(), "missing").is_err());
}

#[test]
fn reset_clears_flags_unless_dry_run() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.yaml", true);
    write(dir.path(), "b.yaml", false);

    let would = reset_processed(dir.path(), true).unwrap();
    assert_eq!(would, vec![dir.path().join("a.yaml")]);
    assert!(ScenarioFile::load(dir.path().join("a.yaml")).unwrap().scenario.has_video);

    let done = reset_processed(dir.path(), false).unwrap();
    assert_eq!(done.len(), 1);
    assert!(!ScenarioFile::load(dir.path().join("a.yaml")).unwrap().scenario.has_video);
    assert!(reset_processed(dir.path(), false).unwrap().is_empty());
}

#[test]
fn batch_reports_every_scenario_and_keeps_going() {
    let dir = tempfile::tempdir().unwrap();
    let project = ProjectConfig {
        seed: Some(1),
        ..Default::default()
    };
    let renderer = ScenarioRenderer::with_pools(
        &project,
        project.paths(dir.path()),
        AssetPools::default(),
        false,
    )
    .unwrap();
    let done = write(dir.path(), "done.yaml", true);
    let broken = dir.path().join("broken.yaml");
    std::fs::write(&broken, "slides: [ {").unwrap();
    let nofont = write(dir.path(), "nofont.yaml", false);

    let summary = render_batch(&renderer, &[done, broken, nofont], Some(2)).unwrap();
    assert_eq!(summary.reports.len(), 3);
    assert_eq!(summary.skipped(), 1);
    assert_eq!(summary.failed(), 2);
    assert_eq!(summary.rendered(), 0);
    assert!(matches!(
        summary.reports[1].result,
        Err(SlidecastError::Serde(_))
    ));
    summary.log();
}

#[test]
fn zero_jobs_is_rejected() {
    assert!(build_thread_pool(Some(0)).is_err());
}
