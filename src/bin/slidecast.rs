use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

use slidecast::{
    Orientation, ProjectConfig, RenderOverrides, ScenarioFile, ScenarioRenderer, Selection,
    media_tools_available, render_batch, reset_processed, resolve_scenario, select_scenarios,
};

#[derive(Parser, Debug)]
#[command(name = "slidecast", version, about = "Render narrated slide scenarios to MP4")]
struct Cli {
    /// Project config file, or a name resolved to `configs/<name>.yaml`.
    #[arg(short, long, global = true, default_value = "default")]
    config: String,

    /// Directory that relative asset and output paths are resolved against.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Log debug details (overridden by `RUST_LOG`).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render scenarios to MP4 (requires `ffmpeg` and `ffprobe` on PATH).
    Render(RenderArgs),
    /// Clear the processed flag on every scenario of the project.
    Reset(ResetArgs),
    /// Print the resolved timeline of one scenario as JSON.
    Schedule(ScheduleArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Render only this scenario (path, file name or stem).
    #[arg(short, long, conflicts_with = "count")]
    scenario: Option<String>,

    /// Render this many unprocessed scenarios picked at random.
    #[arg(short = 'n', long = "count")]
    count: Option<usize>,

    /// Shortcut for `--orientation horizontal`.
    #[arg(long, default_value_t = false, conflicts_with = "orientation")]
    horizontal: bool,

    /// Output orientation.
    #[arg(long, value_enum)]
    orientation: Option<Orientation>,

    /// Re-render scenarios that are already processed.
    #[arg(short, long, default_value_t = false)]
    force: bool,

    /// Resolution factor in (0, 1].
    #[arg(short, long)]
    quality: Option<f64>,

    /// Scenarios rendered in parallel (defaults to the number of cores).
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Seed for font choice, emoji angles and random selection.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct ResetArgs {
    /// Report what would be reset without writing.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[derive(Parser, Debug)]
struct ScheduleArgs {
    /// Scenario path, file name or stem.
    scenario: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = ProjectConfig::resolve_config_path(&cli.config);
    let project = if !config_path.exists() && cli.config == "default" {
        tracing::debug!(path = %config_path.display(), "no config file, using defaults");
        ProjectConfig {
            project_name: Some("default".to_owned()),
            ..Default::default()
        }
    } else {
        ProjectConfig::load(&config_path)
            .with_context(|| format!("load config '{}'", config_path.display()))?
    };

    match cli.cmd {
        Command::Render(args) => cmd_render(project, &cli.root, args),
        Command::Reset(args) => cmd_reset(&project, &cli.root, args),
        Command::Schedule(args) => cmd_schedule(&project, &cli.root, args),
    }
}

fn cmd_render(
    mut project: ProjectConfig,
    root: &std::path::Path,
    args: RenderArgs,
) -> anyhow::Result<()> {
    let orientation = if args.horizontal {
        Some(Orientation::Horizontal)
    } else {
        args.orientation
    };
    project.apply_overrides(&RenderOverrides {
        quality: args.quality,
        orientation,
        seed: args.seed,
    })?;

    let renderer = ScenarioRenderer::new(&project, root, args.force)?;
    let selection = match (args.scenario, args.count) {
        (Some(name), _) => Selection::One(name),
        (None, Some(n)) => Selection::Random(n),
        (None, None) => Selection::AllUnprocessed,
    };
    let mut rng = match project.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let scenarios = select_scenarios(&renderer.paths().scenarios, &selection, &mut rng)?;
    if scenarios.is_empty() {
        tracing::info!(dir = %renderer.paths().scenarios.display(), "no scenarios to render");
        return Ok(());
    }
    if !media_tools_available() {
        tracing::warn!("ffmpeg or ffprobe not found on PATH, unprocessed scenarios will fail");
    }
    tracing::info!(count = scenarios.len(), project = project.name(), "rendering");

    let summary = render_batch(&renderer, &scenarios, args.jobs)?;
    summary.log();
    if summary.failed() > 0 {
        anyhow::bail!("{} scenario(s) failed", summary.failed());
    }
    Ok(())
}

fn cmd_reset(project: &ProjectConfig, root: &std::path::Path, args: ResetArgs) -> anyhow::Result<()> {
    let dir = project.paths(root).scenarios;
    let reset = reset_processed(&dir, args.dry_run)?;
    for path in &reset {
        if args.dry_run {
            println!("would reset {}", path.display());
        } else {
            println!("reset {}", path.display());
        }
    }
    tracing::info!(count = reset.len(), dry_run = args.dry_run, "reset finished");
    Ok(())
}

fn cmd_schedule(
    project: &ProjectConfig,
    root: &std::path::Path,
    args: ScheduleArgs,
) -> anyhow::Result<()> {
    let renderer = ScenarioRenderer::new(project, root, false)?;
    let path = resolve_scenario(&renderer.paths().scenarios, &args.scenario)?;
    let file = ScenarioFile::load(&path)?;
    let schedule = renderer.schedule_for(&file)?;
    let doc = serde_json::json!({
        "scenario": file.id,
        "output": renderer.output_path(&file.id),
        "schedule": schedule,
    });
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
