//! Slidecast turns narrated slide scripts into finished MP4 videos.
//!
//! A scenario document lists timed text slides. For each one the crate:
//!
//! - resolves an absolute timeline from slide durations, narration clips and configured delays
//! - rasterizes a centered text overlay with inline, individually rotated emoji
//! - fits a still image or looping video to cover the frame
//! - mixes narration over a looped music bed
//! - streams the composited frames and the mixed audio into `ffmpeg`
//!
//! Entry points are [`ScenarioRenderer`] for one scenario and [`render_batch`] for many.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

pub(crate) mod audio;
pub(crate) mod background;
pub(crate) mod config;
/// Encoding sinks.
pub mod encode;
/// Frame composition and the render drivers.
pub mod render;
pub(crate) mod scenario;
pub(crate) mod text;
pub(crate) mod timeline;

pub use crate::foundation::core::{Canvas, Fps, Orientation, Rgba8Premul};
pub use crate::foundation::error::{SlidecastError, SlidecastResult};

pub use crate::assets::library::{AssetLibrary, AssetMatch, similarity};
pub use crate::assets::media::{AudioPcm, MediaInfo, media_tools_available, probe_media};
pub use crate::audio::mix::{AudioManifest, AudioSegment, build_audio_manifest, mix_manifest};
pub use crate::audio::narration::narration_clip_path;
pub use crate::audio::process::process_narration;
pub use crate::background::fit::CoverFit;
pub use crate::background::track::{BackgroundPlan, BackgroundTrack};
pub use crate::config::model::{
    AudioConfig, EmojiConfig, EncodeSettings, RenderConfig, TextStyleConfig, TimingConfig,
};
pub use crate::config::project::{ProjectConfig, ProjectPaths, RenderOverrides};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};
pub use crate::render::batch::{
    BatchSummary, ScenarioReport, Selection, render_batch, reset_processed, resolve_scenario,
    select_scenarios, unprocessed_scenarios,
};
pub use crate::render::frame::FrameRGBA;
pub use crate::render::pipeline::{AssetPools, ScenarioOutcome, ScenarioPlan, ScenarioRenderer};
pub use crate::scenario::model::{Emotion, Scenario, ScenarioFile, Slide, list_scenario_files};
pub use crate::scenario::status::{RenderEvent, RenderState, Transition, advance};
pub use crate::text::layout::{GlyphMeasure, LayoutStyle, OverlayLayout, RunMetrics, layout_overlay};
pub use crate::text::overlay::{Overlay, OverlayBuilder};
pub use crate::text::segment::{TextRun, segment_runs};
pub use crate::text::wrap::format_text_for_display;
pub use crate::timeline::schedule::{Schedule, TimedSegment, build_schedule};
