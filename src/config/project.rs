use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::config::model::RenderConfig;
use crate::foundation::core::Orientation;
use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Directory layout of a project.
///
/// Asset libraries are shared between projects; scenario, narration, image and output
/// directories live under `output/<project_name>/`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Text fonts (`.ttf` / `.otf`).
    pub fonts_dir: PathBuf,
    /// Color emoji fonts.
    pub emoji_fonts_dir: PathBuf,
    /// Background music library.
    pub music_dir: PathBuf,
    /// Background video library.
    pub videos_dir: PathBuf,
    /// Project-relative background image directory.
    pub images: PathBuf,
    /// Project-relative scenario directory.
    pub scenarios: PathBuf,
    /// Project-relative narration clip directory.
    pub voice_lines: PathBuf,
    /// Project-relative rendered video directory.
    pub output_videos: PathBuf,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            fonts_dir: PathBuf::from("assets/fonts"),
            emoji_fonts_dir: PathBuf::from("assets/emoji_fonts"),
            music_dir: PathBuf::from("assets/music"),
            videos_dir: PathBuf::from("assets/videos"),
            images: PathBuf::from("images"),
            scenarios: PathBuf::from("scenarios"),
            voice_lines: PathBuf::from("voice_lines"),
            output_videos: PathBuf::from("videos"),
        }
    }
}

/// Top-level project configuration document.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project name; defaults to the config file stem.
    pub project_name: Option<String>,
    /// Directory layout.
    pub directories: DirectoryConfig,
    /// Render settings.
    pub video: RenderConfig,
    /// Base seed for font choice and emoji angles. Unset means a fresh seed per run.
    pub seed: Option<u64>,
}

/// Absolute directories for one project.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectPaths {
    /// Text fonts.
    pub fonts: PathBuf,
    /// Emoji fonts.
    pub emoji_fonts: PathBuf,
    /// Music library.
    pub music: PathBuf,
    /// Video library.
    pub videos: PathBuf,
    /// Background images.
    pub images: PathBuf,
    /// Scenario documents.
    pub scenarios: PathBuf,
    /// Narration clips.
    pub voice_lines: PathBuf,
    /// Rendered videos.
    pub output_videos: PathBuf,
}

/// Command-line values that take precedence over the config file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderOverrides {
    /// Replaces `video.quality`.
    pub quality: Option<f64>,
    /// Replaces `video.orientation`.
    pub orientation: Option<Orientation>,
    /// Replaces `seed`.
    pub seed: Option<u64>,
}

impl ProjectConfig {
    /// Resolve `-c motivation` style shorthands to `configs/motivation.yaml`.
    pub fn resolve_config_path(arg: &str) -> PathBuf {
        let lower = arg.to_ascii_lowercase();
        if lower.ends_with(".yaml") || lower.ends_with(".yml") {
            PathBuf::from(arg)
        } else {
            Path::new("configs").join(format!("{arg}.yaml"))
        }
    }

    /// Read, default and validate a project config.
    pub fn load(path: &Path) -> SlidecastResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let mut cfg = Self::from_yaml_str(&text)?;
        if cfg.project_name.is_none() {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("slidecast")
                .to_string();
            tracing::debug!(project = %stem, "using config file stem as project name");
            cfg.project_name = Some(stem);
        }
        cfg.video.validate()?;
        Ok(cfg)
    }

    /// Parse a config document; missing keys take their defaults.
    pub fn from_yaml_str(text: &str) -> SlidecastResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
            .map_err(|e| SlidecastError::serde(format!("parse project config: {e}")))
    }

    /// Project name, falling back to `slidecast`.
    pub fn name(&self) -> &str {
        self.project_name.as_deref().unwrap_or("slidecast")
    }

    /// Merge command-line overrides and re-validate.
    pub fn apply_overrides(&mut self, o: &RenderOverrides) -> SlidecastResult<()> {
        if let Some(q) = o.quality {
            self.video.quality = q;
        }
        if let Some(orientation) = o.orientation {
            self.video.orientation = orientation;
        }
        if o.seed.is_some() {
            self.seed = o.seed;
        }
        self.video.validate()
    }

    /// Absolute directories, with relative entries resolved against `root`.
    pub fn paths(&self, root: &Path) -> ProjectPaths {
        let d = &self.directories;
        let project_root = root.join("output").join(self.name());
        let shared = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                root.join(p)
            }
        };
        let per_project = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                project_root.join(p)
            }
        };
        ProjectPaths {
            fonts: shared(&d.fonts_dir),
            emoji_fonts: shared(&d.emoji_fonts_dir),
            music: shared(&d.music_dir),
            videos: shared(&d.videos_dir),
            images: per_project(&d.images),
            scenarios: per_project(&d.scenarios),
            voice_lines: per_project(&d.voice_lines),
            output_videos: per_project(&d.output_videos),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/project.rs"]
mod tests;
