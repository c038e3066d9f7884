use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Emotion tag attached to a slide.
///
/// The tag is produced by the scenario writer and consumed by speech synthesis; here it only
/// tints the overlay backing plate. Unknown tags survive a load/save round trip untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Emotion {
    /// No particular mood.
    #[default]
    Neutral,
    /// Joyful, upbeat.
    Happy,
    /// High energy.
    Excited,
    /// Low, sorrowful.
    Sad,
    /// Intense, aggressive.
    Angry,
    /// Quiet, relaxed.
    Calm,
    /// Earnest, matter-of-fact.
    Serious,
    /// Startled.
    Surprised,
    /// Any tag outside the known palette.
    Custom(String),
}

impl From<String> for Emotion {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "neutral" => Emotion::Neutral,
            "happy" | "joy" | "joyful" => Emotion::Happy,
            "excited" | "energetic" => Emotion::Excited,
            "sad" | "sadness" => Emotion::Sad,
            "angry" | "anger" => Emotion::Angry,
            "calm" | "relaxed" => Emotion::Calm,
            "serious" => Emotion::Serious,
            "surprised" | "surprise" => Emotion::Surprised,
            _ => Emotion::Custom(s),
        }
    }
}

impl From<Emotion> for String {
    fn from(e: Emotion) -> Self {
        match e {
            Emotion::Neutral => "neutral".to_string(),
            Emotion::Happy => "happy".to_string(),
            Emotion::Excited => "excited".to_string(),
            Emotion::Sad => "sad".to_string(),
            Emotion::Angry => "angry".to_string(),
            Emotion::Calm => "calm".to_string(),
            Emotion::Serious => "serious".to_string(),
            Emotion::Surprised => "surprised".to_string(),
            Emotion::Custom(s) => s,
        }
    }
}

impl Emotion {
    /// Straight-alpha RGB tint for the text backing plate.
    pub fn plate_tint(&self) -> [u8; 3] {
        match self {
            Emotion::Neutral | Emotion::Custom(_) => [0, 0, 0],
            Emotion::Happy => [60, 40, 0],
            Emotion::Excited => [70, 10, 30],
            Emotion::Sad => [0, 20, 60],
            Emotion::Angry => [70, 0, 0],
            Emotion::Calm => [0, 40, 40],
            Emotion::Serious => [20, 20, 30],
            Emotion::Surprised => [40, 0, 60],
        }
    }
}

/// One timed unit of narration text.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Slide {
    /// Display text, possibly containing emoji.
    #[serde(default)]
    pub text: String,
    /// Declared on-screen duration in seconds; must be > 0.
    pub duration_seconds: f64,
    /// Emotion tag.
    #[serde(default)]
    pub emotion: Emotion,
    /// Optional per-slide background image (file name inside the images directory).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    /// Keys owned by other tools (e.g. image prompts); preserved on write-back.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// The full script for one video.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Scenario {
    /// Human-readable topic.
    #[serde(default)]
    pub topic: String,
    /// Ordered slides.
    #[serde(default)]
    pub slides: Vec<Slide>,
    /// Requested music file name (fuzzy-matched against the music library).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music: Option<String>,
    /// Requested background video file name (fuzzy-matched against the video library).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    /// Scenario-level background image used when no video resolves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    /// Persisted processed flag.
    #[serde(default)]
    pub has_video: bool,
    /// Keys owned by other tools; preserved on write-back.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Scenario {
    /// Check slide invariants.
    ///
    /// A non-positive or non-finite duration is fatal for the scenario; it is never clamped.
    pub fn validate(&self) -> SlidecastResult<()> {
        for (i, slide) in self.slides.iter().enumerate() {
            if !slide.duration_seconds.is_finite() || slide.duration_seconds <= 0.0 {
                return Err(SlidecastError::validation(format!(
                    "slide {} has non-positive duration_seconds ({})",
                    i + 1,
                    slide.duration_seconds
                )));
            }
        }
        Ok(())
    }
}

/// A scenario document together with its on-disk identity.
#[derive(Clone, Debug)]
pub struct ScenarioFile {
    /// Path of the YAML document.
    pub path: PathBuf,
    /// File stem; names narration clips and the output video.
    pub id: String,
    /// Parsed document.
    pub scenario: Scenario,
}

impl ScenarioFile {
    /// Read and parse a scenario document.
    pub fn load(path: impl Into<PathBuf>) -> SlidecastResult<Self> {
        let path = path.into();
        let id = scenario_id_for(&path)?;
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("read scenario '{}'", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&text).map_err(|e| {
            SlidecastError::serde(format!("parse scenario '{}': {e}", path.display()))
        })?;
        Ok(Self { path, id, scenario })
    }

    /// Write the document back to its path.
    ///
    /// The YAML is written to a sibling temp file and renamed over the original so a crash never
    /// leaves a truncated document behind.
    pub fn save(&self) -> SlidecastResult<()> {
        let yaml = serde_yaml::to_string(&self.scenario)
            .map_err(|e| SlidecastError::serde(format!("serialize scenario '{}': {e}", self.id)))?;
        let tmp = self.path.with_extension("yaml.tmp");
        std::fs::write(&tmp, yaml)
            .with_context(|| format!("write scenario temp file '{}'", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("replace scenario '{}'", self.path.display()))?;
        Ok(())
    }
}

fn scenario_id_for(path: &Path) -> SlidecastResult<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            SlidecastError::validation(format!(
                "scenario path '{}' has no usable file stem",
                path.display()
            ))
        })
}

/// List scenario documents (`*.yaml` / `*.yml`) in `dir`, sorted by file name.
///
/// A missing directory yields an empty list.
pub fn list_scenario_files(dir: &Path) -> SlidecastResult<Vec<PathBuf>> {
    let rd = match std::fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(anyhow::Error::new(e)
                .context(format!("list scenarios in '{}'", dir.display()))
                .into());
        }
    };
    let mut out = Vec::new();
    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/scenario/model.rs"]
mod tests;
