//! Narration clip processing.
//!
//! Steps run in a fixed order: loudness normalization, trailing-silence trimming, tempo, echo.
//! Each step is toggled independently by [`AudioConfig`].

use crate::assets::media::AudioPcm;
use crate::config::model::{AudioConfig, EchoConfig, SilenceTrimConfig, TempoConfig};
use crate::foundation::math::{amplitude_to_db, db_to_amplitude};

/// Highest absolute sample value normalization may produce.
const PEAK_CEILING: f32 = 0.99;

/// Apply every enabled step of `cfg` to `pcm`.
pub fn process_narration(mut pcm: AudioPcm, cfg: &AudioConfig) -> AudioPcm {
    if cfg.normalization.enabled {
        normalize_loudness(&mut pcm, cfg.normalization.target_db);
    }
    if cfg.silence_trimming.enabled {
        trim_trailing_silence(&mut pcm, &cfg.silence_trimming);
    }
    if cfg.tempo.enabled {
        pcm = change_tempo(&pcm, &cfg.tempo);
    }
    if cfg.echo.enabled {
        apply_echo(&mut pcm, &cfg.echo);
    }
    pcm
}

/// Root-mean-square level over every sample.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    (sum / samples.len() as f64).sqrt() as f32
}

/// Scale `pcm` so its RMS level reaches `target_db` dBFS, never pushing the peak past 0.99.
///
/// Digital silence is left untouched.
pub fn normalize_loudness(pcm: &mut AudioPcm, target_db: f32) {
    let level = rms(&pcm.interleaved_f32);
    if level <= 1e-9 {
        return;
    }
    let peak = pcm
        .interleaved_f32
        .iter()
        .fold(0.0f32, |m, s| m.max(s.abs()));
    let gain = (db_to_amplitude(target_db) / level).min(PEAK_CEILING / peak);
    tracing::debug!(
        measured_db = amplitude_to_db(level),
        target_db,
        gain_db = amplitude_to_db(gain),
        "normalizing narration"
    );
    for s in &mut pcm.interleaved_f32 {
        *s *= gain;
    }
}

/// Length kept from a clip that is silent throughout.
const SILENT_CLIP_KEEP_SEC: f64 = 0.5;

/// Shorten trailing silence (frames at or below `threshold_db` on every channel) to at most
/// `max_silence_sec`. A clip with no audible frame at all is cut to half a second.
pub fn trim_trailing_silence(pcm: &mut AudioPcm, cfg: &SilenceTrimConfig) {
    let channels = usize::from(pcm.channels);
    if channels == 0 {
        return;
    }
    let threshold = db_to_amplitude(cfg.threshold_db);
    let frames = pcm.frames();
    let audible_end = pcm
        .interleaved_f32
        .chunks_exact(channels)
        .rposition(|f| f.iter().any(|s| s.abs() > threshold))
        .map_or(0, |i| i + 1);
    let keep = if audible_end == 0 {
        tracing::warn!(frames, "narration clip is entirely silent");
        (SILENT_CLIP_KEEP_SEC * f64::from(pcm.sample_rate)).round() as usize
    } else {
        let keep_silence =
            (cfg.max_silence_sec.max(0.0) * f64::from(pcm.sample_rate)).round() as usize;
        audible_end + keep_silence
    }
    .min(frames);
    pcm.interleaved_f32.truncate(keep * channels);
}

/// Play back `rate` times faster by linear resampling. Pitch follows the rate.
pub fn change_tempo(pcm: &AudioPcm, cfg: &TempoConfig) -> AudioPcm {
    let channels = usize::from(pcm.channels);
    let src_frames = pcm.frames();
    if channels == 0 || src_frames == 0 || !(cfg.rate.is_finite() && cfg.rate > 0.0) {
        return pcm.clone();
    }
    if (cfg.rate - 1.0).abs() < 1e-9 {
        return pcm.clone();
    }
    let out_frames = ((src_frames as f64) / cfg.rate).round().max(1.0) as usize;
    let src = &pcm.interleaved_f32;
    let mut out = Vec::with_capacity(out_frames * channels);
    for i in 0..out_frames {
        let pos = i as f64 * cfg.rate;
        let f0 = (pos.floor() as usize).min(src_frames - 1);
        let f1 = (f0 + 1).min(src_frames - 1);
        let frac = (pos - f0 as f64).clamp(0.0, 1.0) as f32;
        for c in 0..channels {
            let a = src[f0 * channels + c];
            let b = src[f1 * channels + c];
            out.push(a + (b - a) * frac);
        }
    }
    AudioPcm {
        sample_rate: pcm.sample_rate,
        channels: pcm.channels,
        interleaved_f32: out,
    }
}

/// Add one delayed copy scaled by `decay`. The clip grows by the delay so the tail is kept.
pub fn apply_echo(pcm: &mut AudioPcm, cfg: &EchoConfig) {
    let channels = usize::from(pcm.channels);
    let delay_frames = (cfg.delay_sec.max(0.0) * f64::from(pcm.sample_rate)).round() as usize;
    if channels == 0 || delay_frames == 0 || cfg.decay <= 0.0 || pcm.frames() == 0 {
        return;
    }
    let offset = delay_frames * channels;
    let dry_len = pcm.interleaved_f32.len();
    pcm.interleaved_f32.resize(dry_len + offset, 0.0);
    for i in (0..dry_len).rev() {
        let wet = pcm.interleaved_f32[i] * cfg.decay;
        pcm.interleaved_f32[i + offset] += wet;
    }
    for s in &mut pcm.interleaved_f32 {
        *s = s.clamp(-1.0, 1.0);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/process.rs"]
mod tests;
