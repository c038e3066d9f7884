use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::assets::library::AssetLibrary;
use crate::assets::media::{AudioPcm, MIX_SAMPLE_RATE, decode_audio_f32_stereo};
use crate::audio::mix::{build_audio_manifest, mix_manifest, write_mix_to_f32le_file};
use crate::audio::narration::{clip_durations, load_scenario_narration};
use crate::background::track::{BackgroundPlan, BackgroundTrack};
use crate::config::model::RenderConfig;
use crate::config::project::{ProjectConfig, ProjectPaths};
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, ensure_parent_dir};
use crate::encode::sink::{AudioInputConfig, FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, Fps, Rgba8Premul};
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::foundation::math::scenario_seed;
use crate::render::composite::blit_overlay;
use crate::render::frame::FrameRGBA;
use crate::scenario::model::ScenarioFile;
use crate::scenario::status::{RenderEvent, RenderState, Transition, advance};
use crate::text::fonts::{FontPool, choose_slide_fonts, find_emoji_font};
use crate::text::overlay::{Overlay, OverlayBuilder};
use crate::timeline::schedule::{Schedule, build_schedule};

const MUSIC_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "aac", "ogg", "flac"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "webm", "avi"];

/// Asset registries shared by every scenario of a run.
#[derive(Clone, Debug, Default)]
pub struct AssetPools {
    /// Slide fonts.
    pub fonts: FontPool,
    /// Emoji font, when emoji are enabled and one was found.
    pub emoji_font: Option<PathBuf>,
    /// Background music.
    pub music: AssetLibrary,
    /// Background videos.
    pub videos: AssetLibrary,
}

impl AssetPools {
    /// Scan the shared asset directories once.
    pub fn load(paths: &ProjectPaths, cfg: &RenderConfig) -> SlidecastResult<Self> {
        let emoji_font = if cfg.emoji.enabled {
            find_emoji_font(&paths.emoji_fonts, cfg.emoji.font.as_deref())
        } else {
            None
        };
        Ok(Self {
            fonts: FontPool::scan(&paths.fonts),
            emoji_font,
            music: AssetLibrary::scan(&paths.music, MUSIC_EXTENSIONS)?,
            videos: AssetLibrary::scan(&paths.videos, VIDEO_EXTENSIONS)?,
        })
    }
}

/// Everything resolved for one scenario before any pixel is drawn.
#[derive(Debug)]
pub struct ScenarioPlan {
    /// Slide timing.
    pub schedule: Schedule,
    /// Processed narration per slide; `None` for silent slides.
    pub narration: Vec<Option<Arc<AudioPcm>>>,
    /// Font file per slide.
    pub slide_fonts: Vec<PathBuf>,
    /// Background sources.
    pub background: BackgroundPlan,
    /// Resolved music file.
    pub music: Option<PathBuf>,
}

/// What [`ScenarioRenderer::render`] did with a scenario.
#[derive(Clone, Debug, PartialEq)]
pub enum ScenarioOutcome {
    /// A new output was written and the scenario marked processed.
    Rendered {
        /// Final video path.
        output: PathBuf,
        /// Frames encoded.
        frames: u64,
    },
    /// Already processed and not forced; nothing was touched.
    Skipped {
        /// Existing video path.
        output: PathBuf,
    },
}

/// Renders scenarios of one project. Shared read-only across worker threads.
#[derive(Debug)]
pub struct ScenarioRenderer {
    config: RenderConfig,
    paths: ProjectPaths,
    pools: AssetPools,
    canvas: Canvas,
    fps: Fps,
    seed: u64,
    force: bool,
}

impl ScenarioRenderer {
    /// Prepare a renderer for `project`, resolving its directories against `root`.
    pub fn new(project: &ProjectConfig, root: &Path, force: bool) -> SlidecastResult<Self> {
        let paths = project.paths(root);
        let pools = AssetPools::load(&paths, &project.video)?;
        Self::with_pools(project, paths, pools, force)
    }

    /// Renderer over already scanned asset pools.
    pub fn with_pools(
        project: &ProjectConfig,
        paths: ProjectPaths,
        pools: AssetPools,
        force: bool,
    ) -> SlidecastResult<Self> {
        project.video.validate()?;
        let canvas = project.video.canvas()?;
        let fps = project.video.fps()?;
        let seed = project.seed.unwrap_or_else(rand::random);
        tracing::debug!(
            width = canvas.width,
            height = canvas.height,
            quality = project.video.quality,
            font_size = project.video.scaled_font_size(),
            seed,
            "render settings"
        );
        Ok(Self {
            config: project.video.clone(),
            paths,
            pools,
            canvas,
            fps,
            seed,
            force,
        })
    }

    /// Resolved project directories.
    pub fn paths(&self) -> &ProjectPaths {
        &self.paths
    }

    /// Output frame size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Deterministic output location for scenario `id`.
    pub fn output_path(&self, id: &str) -> PathBuf {
        self.paths.output_videos.join(format!("{id}.mp4"))
    }

    /// Seeded RNG for one scenario; font choice and emoji angles draw from it in that order.
    pub fn rng_for(&self, id: &str) -> StdRng {
        StdRng::seed_from_u64(scenario_seed(self.seed, id))
    }

    /// Narration-aware schedule of `file`.
    pub fn schedule_for(&self, file: &ScenarioFile) -> SlidecastResult<Schedule> {
        file.scenario.validate()?;
        let narration = self.load_narration(file);
        build_schedule(
            &file.scenario.slides,
            &clip_durations(&narration),
            &self.config.timing,
        )
    }

    fn load_narration(&self, file: &ScenarioFile) -> Vec<Option<Arc<AudioPcm>>> {
        load_scenario_narration(
            &self.paths.voice_lines,
            &file.id,
            file.scenario.slides.len(),
            &self.config.audio,
        )
    }

    /// Resolve timing, fonts, backgrounds and music for `file`.
    pub fn plan(&self, file: &ScenarioFile, rng: &mut StdRng) -> SlidecastResult<ScenarioPlan> {
        let scenario = &file.scenario;
        scenario.validate()?;

        let narration = self.load_narration(file);
        let schedule = build_schedule(
            &scenario.slides,
            &clip_durations(&narration),
            &self.config.timing,
        )?;
        let slide_fonts = choose_slide_fonts(
            &self.pools.fonts,
            scenario.slides.len(),
            self.config.use_consistent_font,
            rng,
        )?;

        let video = scenario
            .video
            .as_deref()
            .and_then(|name| self.pools.videos.resolve_logged("video", name));
        let image = scenario
            .background_image
            .as_deref()
            .map(|name| self.paths.images.join(name));
        if video.is_none() && image.is_none() {
            tracing::warn!(scenario = %file.id, "no background video or image, using solid color");
        }
        let slide_images = scenario
            .slides
            .iter()
            .map(|s| s.background_image.as_deref().map(|n| self.paths.images.join(n)))
            .collect();

        let music = match scenario.music.as_deref() {
            Some(name) => self.pools.music.resolve_logged("music", name),
            None => None,
        };
        if music.is_none() {
            tracing::warn!(scenario = %file.id, "no music resolved, bed is silent");
        }

        Ok(ScenarioPlan {
            schedule,
            narration,
            slide_fonts,
            background: BackgroundPlan {
                video,
                image,
                slide_images,
            },
            music,
        })
    }

    /// Rasterize one overlay per slide.
    pub fn build_overlays(
        &self,
        file: &ScenarioFile,
        plan: &ScenarioPlan,
        rng: &mut StdRng,
    ) -> SlidecastResult<Vec<Option<Overlay>>> {
        let mut builder =
            OverlayBuilder::new(&self.config, self.canvas, self.pools.emoji_font.as_deref());
        file.scenario
            .slides
            .iter()
            .zip(&plan.slide_fonts)
            .enumerate()
            .map(|(i, (slide, font))| builder.build_slide(i + 1, slide, font, rng))
            .collect()
    }

    /// Master audio track for `plan`, interleaved stereo at [`MIX_SAMPLE_RATE`].
    pub fn mix_audio(&self, plan: &ScenarioPlan) -> SlidecastResult<Vec<f32>> {
        let music = plan.music.as_deref().and_then(|path| {
            match decode_audio_f32_stereo(path, MIX_SAMPLE_RATE) {
                Ok(pcm) if pcm.frames() > 0 => Some(Arc::new(pcm)),
                Ok(_) => {
                    tracing::warn!(path = %path.display(), "music has no audio, bed is silent");
                    None
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "music unreadable, bed is silent");
                    None
                }
            }
        });
        let manifest = build_audio_manifest(
            &plan.schedule,
            &plan.narration,
            music,
            self.config.background_music_volume,
            self.config.voice_narration_volume,
        )?;
        Ok(mix_manifest(&manifest))
    }

    /// Composite every frame of `plan` into `sink`. Returns the number of frames pushed.
    pub fn compose(
        &self,
        plan: &ScenarioPlan,
        overlays: &[Option<Overlay>],
        sink: &mut dyn FrameSink,
        audio: Option<AudioInputConfig>,
    ) -> SlidecastResult<u64> {
        let color = self.config.background_color;
        let mut track = BackgroundTrack::open(
            &plan.background,
            self.canvas,
            self.fps,
            Rgba8Premul::from_straight_rgba(color[0], color[1], color[2], color[3]),
        );
        let frames = plan.schedule.frame_count(self.fps);

        sink.begin(SinkConfig {
            width: self.canvas.width,
            height: self.canvas.height,
            fps: self.fps,
            audio,
        })?;
        let mut frame = FrameRGBA::filled(self.canvas, Rgba8Premul::transparent());
        for idx in 0..frames {
            let t = self.fps.frames_to_secs(idx);
            track.next_frame_into(t, &plan.schedule, &mut frame.data);
            if let Some(seg) = plan.schedule.segment_at(t)
                && let Some(Some(overlay)) = overlays.get(seg.slide_index)
            {
                blit_overlay(&mut frame, overlay)?;
            }
            sink.push_frame(idx, &frame)?;
        }
        sink.end()?;
        Ok(frames)
    }

    /// Render the scenario at `path` to its output video and mark it processed.
    ///
    /// Any error leaves the document untouched and removes partial output.
    #[tracing::instrument(skip_all, fields(scenario = %path.display()))]
    pub fn render(&self, path: &Path) -> SlidecastResult<ScenarioOutcome> {
        let mut file = ScenarioFile::load(path)?;
        let output = self.output_path(&file.id);

        let state = RenderState::from_persisted(file.scenario.has_video);
        match advance(state, RenderEvent::Begin { force: self.force })? {
            Transition::Skip => {
                tracing::info!(output = %output.display(), "already processed, skipping");
                return Ok(ScenarioOutcome::Skipped { output });
            }
            Transition::To(_) => {}
        }

        let claim = OutputClaim::acquire(&output)?;
        let frames = match self.render_claimed(&file, &claim) {
            Ok(frames) => frames,
            Err(err) => {
                if let Transition::To(state) = advance(RenderState::Rendering, RenderEvent::Fail)? {
                    tracing::debug!(?state, "scenario left unprocessed");
                }
                return Err(err);
            }
        };

        claim.confirm(&output)?;
        if let Transition::To(done) = advance(RenderState::Rendering, RenderEvent::OutputConfirmed)?
            && let Some(flag) = done.persisted_flag()
        {
            file.scenario.has_video = flag;
            file.save()?;
        }
        tracing::info!(output = %output.display(), frames, "rendered");
        Ok(ScenarioOutcome::Rendered { output, frames })
    }

    fn render_claimed(&self, file: &ScenarioFile, claim: &OutputClaim) -> SlidecastResult<u64> {
        let mut rng = self.rng_for(&file.id);
        let plan = self.plan(file, &mut rng)?;
        let overlays = self.build_overlays(file, &plan, &mut rng)?;

        let mixed = self.mix_audio(&plan)?;
        write_mix_to_f32le_file(&mixed, &claim.audio)?;
        let audio = AudioInputConfig {
            path: claim.audio.clone(),
            sample_rate: MIX_SAMPLE_RATE,
            channels: 2,
        };

        let mut opts = FfmpegSinkOpts::new(&claim.partial, &self.config.encode);
        opts.bg_rgba = self.config.background_color;
        let mut sink = FfmpegSink::new(opts);
        self.compose(&plan, &overlays, &mut sink, Some(audio))
    }
}

/// Locks older than this are treated as left behind by a crashed render.
const STALE_LOCK_AGE: std::time::Duration = std::time::Duration::from_secs(12 * 60 * 60);

/// Exclusive claim on an output name for the duration of one render.
///
/// The lock file is created with `create_new`, so two live renders can never write the same
/// output. It records the owning process and creation time; a lock whose owner is gone, or that
/// outlived [`STALE_LOCK_AGE`], is reclaimed. Dropping the claim removes the lock, the audio
/// scratch file and any unconfirmed partial output.
struct OutputClaim {
    lock: PathBuf,
    partial: PathBuf,
    audio: PathBuf,
}

impl OutputClaim {
    fn acquire(output: &Path) -> SlidecastResult<Self> {
        ensure_parent_dir(output)?;
        let lock = with_suffix(output, ".lock");
        let mut handle = match create_lock(&lock) {
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && lock_is_stale(&lock) => {
                tracing::warn!(lock = %lock.display(), "reclaiming stale render lock");
                let _ = std::fs::remove_file(&lock);
                create_lock(&lock)
            }
            other => other,
        }
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                SlidecastError::validation(format!(
                    "output '{}' is claimed by another render",
                    output.display()
                ))
            } else {
                anyhow::Error::new(e)
                    .context(format!("create lock '{}'", lock.display()))
                    .into()
            }
        })?;

        let claim = Self {
            partial: with_suffix(output, ".part"),
            audio: with_suffix(output, ".audio.f32le"),
            lock,
        };
        use std::io::Write as _;
        writeln!(handle, "{}", LockOwner::current()).map_err(|e| {
            anyhow::Error::new(e).context(format!("write lock '{}'", claim.lock.display()))
        })?;
        Ok(claim)
    }

    /// Move the partial output into place once it exists and is non-empty.
    fn confirm(&self, output: &Path) -> SlidecastResult<()> {
        let len = std::fs::metadata(&self.partial).map(|m| m.len()).unwrap_or(0);
        if len == 0 {
            return Err(SlidecastError::media(format!(
                "encoder produced no output at '{}'",
                self.partial.display()
            )));
        }
        use anyhow::Context as _;
        std::fs::rename(&self.partial, output)
            .with_context(|| format!("move output into place at '{}'", output.display()))?;
        Ok(())
    }
}

impl Drop for OutputClaim {
    fn drop(&mut self) {
        for p in [&self.partial, &self.audio, &self.lock] {
            let _ = std::fs::remove_file(p);
        }
    }
}

fn create_lock(lock: &Path) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(lock)
}

/// Whether the lock at `lock` was left behind. Unreadable owner records count as stale.
fn lock_is_stale(lock: &Path) -> bool {
    match std::fs::read_to_string(lock) {
        Ok(text) => LockOwner::parse(&text).is_none_or(|owner| owner.is_stale(unix_now())),
        Err(e) => e.kind() == std::io::ErrorKind::NotFound,
    }
}

/// Owner record stored in a lock file: `<pid> <unix seconds>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LockOwner {
    pid: u32,
    created: u64,
}

impl LockOwner {
    fn current() -> Self {
        Self {
            pid: std::process::id(),
            created: unix_now(),
        }
    }

    fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let pid = parts.next()?.parse().ok()?;
        let created = parts.next()?.parse().ok()?;
        Some(Self { pid, created })
    }

    fn is_stale(&self, now: u64) -> bool {
        now.saturating_sub(self.created) > STALE_LOCK_AGE.as_secs() || !process_alive(self.pid)
    }
}

impl std::fmt::Display for LockOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.pid, self.created)
    }
}

/// Liveness through procfs; without it only the age bound applies.
fn process_alive(pid: u32) -> bool {
    let proc = Path::new("/proc");
    if !proc.join("self").exists() {
        return true;
    }
    proc.join(pid.to_string()).exists()
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
