use crate::foundation::core::{Canvas, Fps, Orientation};
use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Slide timing knobs consumed by the timeline builder.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Seconds before the first slide starts.
    pub intro_delay: f64,
    /// Seconds appended after the last slide ends.
    pub outro_delay: f64,
    /// Gap between consecutive slides.
    pub voice_line_delay: f64,
    /// Trailing pad added to a narration clip before comparing against the declared duration.
    pub narration_pad: f64,
    /// Minimum on-screen time for any slide.
    pub min_slide_seconds: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            intro_delay: 0.0,
            outro_delay: 0.0,
            voice_line_delay: 0.0,
            narration_pad: 0.5,
            min_slide_seconds: 0.0,
        }
    }
}

/// Plain-text overlay styling at full quality; scaled by the quality factor at render time.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TextStyleConfig {
    /// Font size in pixels.
    pub font_size: f32,
    /// Outline width in pixels.
    pub stroke_width: f32,
    /// Maximum line width as a fraction of the frame width.
    pub max_width_ratio: f32,
    /// Opacity of the backing plate behind the text.
    pub plate_opacity: f32,
    /// Padding between text bounds and plate edge, in pixels.
    pub plate_padding: f32,
    /// Fill color (straight RGBA).
    pub color: [u8; 4],
    /// Outline color (straight RGBA).
    pub stroke_color: [u8; 4],
}

impl Default for TextStyleConfig {
    fn default() -> Self {
        Self {
            font_size: 90.0,
            stroke_width: 3.0,
            max_width_ratio: 0.8,
            plate_opacity: 0.45,
            plate_padding: 24.0,
            color: [255, 255, 255, 255],
            stroke_color: [0, 0, 0, 255],
        }
    }
}

/// Emoji run styling.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EmojiConfig {
    /// When false, emoji code points are dropped from the overlay.
    pub enabled: bool,
    /// Emoji font file name inside the emoji fonts directory. `None` picks the first Noto emoji
    /// font, then any font in the directory.
    pub font: Option<String>,
    /// Emoji size relative to the plain-text font size.
    pub scale: f32,
    /// Rotate each emoji by an angle drawn from `[min_angle, max_angle]`.
    pub rotation_enabled: bool,
    /// Lower rotation bound, degrees.
    pub min_angle: f32,
    /// Upper rotation bound, degrees.
    pub max_angle: f32,
}

impl Default for EmojiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            font: None,
            scale: 1.2,
            rotation_enabled: true,
            min_angle: -15.0,
            max_angle: 15.0,
        }
    }
}

/// Loudness normalization of narration clips.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Toggle.
    pub enabled: bool,
    /// Target RMS level in dBFS.
    pub target_db: f32,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            target_db: -20.0,
        }
    }
}

/// Trailing-silence trimming of narration clips.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SilenceTrimConfig {
    /// Toggle.
    pub enabled: bool,
    /// Trailing silence kept after the last audible sample, seconds.
    pub max_silence_sec: f64,
    /// Samples quieter than this (dBFS) count as silence.
    pub threshold_db: f32,
}

impl Default for SilenceTrimConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_silence_sec: 1.0,
            threshold_db: -50.0,
        }
    }
}

/// Speed change of narration clips.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TempoConfig {
    /// Toggle.
    pub enabled: bool,
    /// Playback rate; `1.1` is ten percent faster.
    pub rate: f64,
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            rate: 1.0,
        }
    }
}

/// Single-tap feedback echo on narration clips.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EchoConfig {
    /// Toggle.
    pub enabled: bool,
    /// Echo delay, seconds.
    pub delay_sec: f64,
    /// Feedback gain in `[0, 1)`.
    pub decay: f32,
}

impl Default for EchoConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            delay_sec: 0.12,
            decay: 0.3,
        }
    }
}

/// Narration processing chain, applied in field order.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Loudness normalization.
    pub normalization: NormalizationConfig,
    /// Trailing-silence trimming.
    pub silence_trimming: SilenceTrimConfig,
    /// Tempo change.
    pub tempo: TempoConfig,
    /// Echo.
    pub echo: EchoConfig,
}

/// libx264 settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EncodeSettings {
    /// Constant rate factor (0..=51).
    pub crf: u8,
    /// x264 preset name.
    pub preset: String,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            crf: 23,
            preset: "medium".to_string(),
        }
    }
}

/// Everything one render call needs besides the scenario and its assets.
///
/// Immutable for the duration of a render.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Resolution scale in `(0, 1]`.
    pub quality: f64,
    /// Output orientation.
    pub orientation: Orientation,
    /// Integer output frame rate.
    pub fps: u32,
    /// Music bed gain.
    pub background_music_volume: f32,
    /// Narration gain applied after processing.
    pub voice_narration_volume: f32,
    /// Slide timing.
    pub timing: TimingConfig,
    /// Plain-text styling.
    pub text: TextStyleConfig,
    /// Emoji styling.
    pub emoji: EmojiConfig,
    /// One font for the whole scenario instead of one per slide.
    pub use_consistent_font: bool,
    /// Narration processing chain.
    pub audio: AudioConfig,
    /// Encoder settings.
    pub encode: EncodeSettings,
    /// Solid background color (straight RGBA) used when no visual resolves.
    pub background_color: [u8; 4],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            quality: 1.0,
            orientation: Orientation::Vertical,
            fps: 30,
            background_music_volume: 0.5,
            voice_narration_volume: 1.0,
            timing: TimingConfig::default(),
            text: TextStyleConfig::default(),
            emoji: EmojiConfig::default(),
            use_consistent_font: true,
            audio: AudioConfig::default(),
            encode: EncodeSettings::default(),
            background_color: [0, 0, 0, 255],
        }
    }
}

impl RenderConfig {
    /// Reject values no render could honor.
    pub fn validate(&self) -> SlidecastResult<()> {
        if !self.quality.is_finite() || self.quality <= 0.0 || self.quality > 1.0 {
            return Err(SlidecastError::validation(format!(
                "video.quality must be in (0, 1], got {}",
                self.quality
            )));
        }
        if self.fps == 0 {
            return Err(SlidecastError::validation("video.fps must be > 0"));
        }
        let t = &self.timing;
        for (name, v) in [
            ("intro_delay", t.intro_delay),
            ("outro_delay", t.outro_delay),
            ("voice_line_delay", t.voice_line_delay),
            ("narration_pad", t.narration_pad),
            ("min_slide_seconds", t.min_slide_seconds),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(SlidecastError::validation(format!(
                    "video.timing.{name} must be a non-negative number, got {v}"
                )));
            }
        }
        for (name, v) in [
            ("background_music_volume", self.background_music_volume),
            ("voice_narration_volume", self.voice_narration_volume),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(SlidecastError::validation(format!(
                    "video.{name} must be >= 0, got {v}"
                )));
            }
        }
        if !self.text.font_size.is_finite() || self.text.font_size <= 0.0 {
            return Err(SlidecastError::validation("video.text.font_size must be > 0"));
        }
        let ratio = self.text.max_width_ratio;
        if !ratio.is_finite() || ratio <= 0.0 || ratio > 1.0 {
            return Err(SlidecastError::validation(
                "video.text.max_width_ratio must be in (0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&self.text.plate_opacity) {
            return Err(SlidecastError::validation(
                "video.text.plate_opacity must be in [0, 1]",
            ));
        }
        if self.emoji.min_angle > self.emoji.max_angle {
            return Err(SlidecastError::validation(format!(
                "video.emoji angle range is inverted ({} > {})",
                self.emoji.min_angle, self.emoji.max_angle
            )));
        }
        if !self.emoji.scale.is_finite() || self.emoji.scale <= 0.0 {
            return Err(SlidecastError::validation("video.emoji.scale must be > 0"));
        }
        if !self.audio.tempo.rate.is_finite() || self.audio.tempo.rate <= 0.0 {
            return Err(SlidecastError::validation(
                "video.audio.tempo.rate must be > 0",
            ));
        }
        if !(0.0..1.0).contains(&self.audio.echo.decay) {
            return Err(SlidecastError::validation(
                "video.audio.echo.decay must be in [0, 1)",
            ));
        }
        if !self.audio.echo.delay_sec.is_finite() || self.audio.echo.delay_sec < 0.0 {
            return Err(SlidecastError::validation(
                "video.audio.echo.delay_sec must be >= 0",
            ));
        }
        let max_silence = self.audio.silence_trimming.max_silence_sec;
        if !max_silence.is_finite() || max_silence < 0.0 {
            return Err(SlidecastError::validation(
                "video.audio.silence_trimming.max_silence_sec must be >= 0",
            ));
        }
        if self.encode.crf > 51 {
            return Err(SlidecastError::validation("video.encode.crf must be <= 51"));
        }
        Ok(())
    }

    /// Output canvas for the configured orientation and quality.
    pub fn canvas(&self) -> SlidecastResult<Canvas> {
        Canvas::for_output(self.orientation, self.quality)
    }

    /// Output frame rate.
    pub fn fps(&self) -> SlidecastResult<Fps> {
        Fps::new(self.fps, 1)
    }

    /// Font size scaled by quality.
    pub fn scaled_font_size(&self) -> f32 {
        (self.text.font_size * self.quality as f32).max(1.0)
    }

    /// Stroke width scaled by quality; never thinner than one pixel unless disabled.
    pub fn scaled_stroke_width(&self) -> f32 {
        if self.text.stroke_width <= 0.0 {
            return 0.0;
        }
        (self.text.stroke_width * self.quality as f32).max(1.0)
    }

    /// Plate padding scaled by quality.
    pub fn scaled_plate_padding(&self) -> f32 {
        (self.text.plate_padding * self.quality as f32).max(0.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/model.rs"]
mod tests;
