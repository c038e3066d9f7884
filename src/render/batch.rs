use std::path::{Path, PathBuf};

use rand::Rng;
use rand::seq::SliceRandom;
use rayon::prelude::*;

use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::render::pipeline::{ScenarioOutcome, ScenarioRenderer};
use crate::scenario::model::{ScenarioFile, list_scenario_files};

/// Which scenarios a run renders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// One scenario, by path or by name inside the scenarios directory.
    One(String),
    /// Every scenario not yet processed.
    AllUnprocessed,
    /// Up to `n` unprocessed scenarios picked at random.
    Random(usize),
}

/// Resolve `selection` against the scenarios in `dir`.
pub fn select_scenarios<R: Rng + ?Sized>(
    dir: &Path,
    selection: &Selection,
    rng: &mut R,
) -> SlidecastResult<Vec<PathBuf>> {
    match selection {
        Selection::One(name) => resolve_scenario(dir, name).map(|p| vec![p]),
        Selection::AllUnprocessed => unprocessed_scenarios(dir),
        Selection::Random(n) => {
            let mut pool = unprocessed_scenarios(dir)?;
            pool.shuffle(rng);
            pool.truncate(*n);
            pool.sort();
            Ok(pool)
        }
    }
}

/// Find a scenario given as a path, a file name, or a bare stem.
pub fn resolve_scenario(dir: &Path, name: &str) -> SlidecastResult<PathBuf> {
    let direct = PathBuf::from(name);
    let candidates = [
        direct.clone(),
        dir.join(name),
        dir.join(format!("{name}.yaml")),
        dir.join(format!("{name}.yml")),
    ];
    candidates
        .into_iter()
        .find(|p| p.is_file())
        .ok_or_else(|| {
            SlidecastError::validation(format!(
                "scenario '{name}' not found (looked in '{}')",
                dir.display()
            ))
        })
}

/// Scenarios whose processed flag is unset. Unreadable documents are included so the batch
/// reports them as failures.
pub fn unprocessed_scenarios(dir: &Path) -> SlidecastResult<Vec<PathBuf>> {
    Ok(list_scenario_files(dir)?
        .into_iter()
        .filter(|p| match ScenarioFile::load(p) {
            Ok(f) => !f.scenario.has_video,
            Err(_) => true,
        })
        .collect())
}

/// Result for one scenario of a batch.
#[derive(Debug)]
pub struct ScenarioReport {
    /// Scenario document.
    pub scenario: PathBuf,
    /// What happened to it.
    pub result: SlidecastResult<ScenarioOutcome>,
}

/// Per-scenario results of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// One report per requested scenario.
    pub reports: Vec<ScenarioReport>,
}

impl BatchSummary {
    /// Scenarios that produced a video.
    pub fn rendered(&self) -> usize {
        self.count(|r| matches!(r, Ok(ScenarioOutcome::Rendered { .. })))
    }

    /// Scenarios skipped as already processed.
    pub fn skipped(&self) -> usize {
        self.count(|r| matches!(r, Ok(ScenarioOutcome::Skipped { .. })))
    }

    /// Scenarios that failed.
    pub fn failed(&self) -> usize {
        self.count(Result::is_err)
    }

    fn count(&self, f: impl Fn(&SlidecastResult<ScenarioOutcome>) -> bool) -> usize {
        self.reports.iter().filter(|r| f(&r.result)).count()
    }

    /// Log one line per scenario and the totals.
    pub fn log(&self) {
        for r in &self.reports {
            match &r.result {
                Ok(ScenarioOutcome::Rendered { output, frames }) => {
                    tracing::info!(scenario = %r.scenario.display(), output = %output.display(), frames, "ok");
                }
                Ok(ScenarioOutcome::Skipped { .. }) => {
                    tracing::info!(scenario = %r.scenario.display(), "skipped");
                }
                Err(err) => {
                    tracing::error!(scenario = %r.scenario.display(), %err, "failed");
                }
            }
        }
        tracing::info!(
            rendered = self.rendered(),
            skipped = self.skipped(),
            failed = self.failed(),
            "batch finished"
        );
    }
}

/// Render `scenarios` in parallel on at most `jobs` threads (all cores when unset).
///
/// A failing scenario never stops the others.
pub fn render_batch(
    renderer: &ScenarioRenderer,
    scenarios: &[PathBuf],
    jobs: Option<usize>,
) -> SlidecastResult<BatchSummary> {
    let pool = build_thread_pool(jobs)?;
    let reports = pool.install(|| {
        scenarios
            .par_iter()
            .map(|path| ScenarioReport {
                scenario: path.clone(),
                result: renderer.render(path),
            })
            .collect()
    });
    Ok(BatchSummary { reports })
}

/// Clear the processed flag of every scenario in `dir`. Returns the scenarios that were (or,
/// with `dry_run`, would be) reset.
pub fn reset_processed(dir: &Path, dry_run: bool) -> SlidecastResult<Vec<PathBuf>> {
    let mut reset = Vec::new();
    for path in list_scenario_files(dir)? {
        let mut file = match ScenarioFile::load(&path) {
            Ok(f) => f,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "skipping unreadable scenario");
                continue;
            }
        };
        if !file.scenario.has_video {
            continue;
        }
        if !dry_run {
            file.scenario.has_video = false;
            file.save()?;
        }
        reset.push(path);
    }
    Ok(reset)
}

fn build_thread_pool(threads: Option<usize>) -> SlidecastResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(SlidecastError::validation("--jobs must be >= 1 when set"));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| SlidecastError::evaluation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/batch.rs"]
mod tests;
