use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::assets::media::{AudioPcm, MIX_SAMPLE_RATE, decode_audio_f32_stereo};
use crate::audio::process::process_narration;
use crate::config::model::AudioConfig;

/// Path of the narration clip for slide `slide_index` (0-based) of scenario `stem`.
pub fn narration_clip_path(voice_dir: &Path, stem: &str, slide_index: usize) -> PathBuf {
    voice_dir.join(format!("{stem}_slide_{:02}.wav", slide_index + 1))
}

/// Decode and process one clip. Missing, unreadable and empty clips yield `None`.
pub fn load_narration_clip(path: &Path, slide: usize, cfg: &AudioConfig) -> Option<AudioPcm> {
    if !path.is_file() {
        tracing::warn!(slide, path = %path.display(), "narration clip missing, slide stays silent");
        return None;
    }
    let pcm = match decode_audio_f32_stereo(path, MIX_SAMPLE_RATE) {
        Ok(pcm) => pcm,
        Err(err) => {
            tracing::warn!(slide, path = %path.display(), %err, "narration clip unreadable, slide stays silent");
            return None;
        }
    };
    if pcm.frames() == 0 {
        tracing::warn!(slide, path = %path.display(), "narration clip is empty");
        return None;
    }
    let processed = process_narration(pcm, cfg);
    (processed.frames() > 0).then_some(processed)
}

/// Load the clip of every slide, in slide order.
pub fn load_scenario_narration(
    voice_dir: &Path,
    stem: &str,
    slide_count: usize,
    cfg: &AudioConfig,
) -> Vec<Option<Arc<AudioPcm>>> {
    (0..slide_count)
        .map(|i| {
            let path = narration_clip_path(voice_dir, stem, i);
            load_narration_clip(&path, i + 1, cfg).map(Arc::new)
        })
        .collect()
}

/// Clip durations in seconds as the timeline builder expects them.
pub fn clip_durations(clips: &[Option<Arc<AudioPcm>>]) -> Vec<Option<f64>> {
    clips
        .iter()
        .map(|c| c.as_ref().map(|pcm| pcm.duration_sec()))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/audio/narration.rs"]
mod tests;
