use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::assets::media::{AudioPcm, MIX_SAMPLE_RATE};
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::timeline::schedule::Schedule;

/// One source placed on the master timeline.
#[derive(Clone, Debug)]
pub struct AudioSegment {
    /// First output sample frame the source covers.
    pub timeline_start_sample: u64,
    /// Output sample frame where the source stops (exclusive).
    pub timeline_end_sample: u64,
    /// Restart the source from its first sample whenever it runs out.
    pub looped: bool,
    /// Linear gain.
    pub volume: f32,
    /// Decoded source, already at the manifest's rate and channel count.
    pub source: Arc<AudioPcm>,
}

/// Every audio source of a scenario, laid out against the master timeline.
#[derive(Clone, Debug)]
pub struct AudioManifest {
    /// Output sample rate.
    pub sample_rate: u32,
    /// Output channel count.
    pub channels: u16,
    /// Length of the mix in sample frames.
    pub total_samples: u64,
    /// Sources summed into the mix.
    pub segments: Vec<AudioSegment>,
}

/// Lay out the master track: the music bed across the whole schedule plus each narration clip
/// at its segment start, cut at the segment end.
pub fn build_audio_manifest(
    schedule: &Schedule,
    narration: &[Option<Arc<AudioPcm>>],
    music: Option<Arc<AudioPcm>>,
    music_volume: f32,
    voice_volume: f32,
) -> SlidecastResult<AudioManifest> {
    if narration.len() != schedule.segments.len() {
        return Err(SlidecastError::evaluation(format!(
            "{} narration entries for {} segments",
            narration.len(),
            schedule.segments.len()
        )));
    }
    let sample_rate = MIX_SAMPLE_RATE;
    let total_samples = secs_to_sample(schedule.total, sample_rate);
    let mut segments = Vec::new();

    if let Some(music) = music
        && music.frames() > 0
        && music_volume > 0.0
    {
        segments.push(AudioSegment {
            timeline_start_sample: 0,
            timeline_end_sample: total_samples,
            looped: true,
            volume: music_volume,
            source: music,
        });
    }

    for (seg, clip) in schedule.segments.iter().zip(narration) {
        let Some(clip) = clip else { continue };
        if clip.frames() == 0 || voice_volume <= 0.0 {
            continue;
        }
        let start = secs_to_sample(seg.start, sample_rate).min(total_samples);
        let end = secs_to_sample(seg.end, sample_rate).min(total_samples);
        if start >= end {
            continue;
        }
        segments.push(AudioSegment {
            timeline_start_sample: start,
            timeline_end_sample: end,
            looped: false,
            volume: voice_volume,
            source: clip.clone(),
        });
    }

    Ok(AudioManifest {
        sample_rate,
        channels: 2,
        total_samples,
        segments,
    })
}

/// Sum every segment into an interleaved buffer of `total_samples` frames, clamped to `[-1, 1]`.
pub fn mix_manifest(manifest: &AudioManifest) -> Vec<f32> {
    let frames = manifest.total_samples as usize;
    let channels = usize::from(manifest.channels);
    let mut out = vec![0.0f32; frames * channels];

    for seg in &manifest.segments {
        let src = &seg.source;
        let src_channels = usize::from(src.channels);
        let src_frames = src.frames();
        if src_frames == 0 || src.sample_rate == 0 {
            continue;
        }
        let step = f64::from(src.sample_rate) / f64::from(manifest.sample_rate);

        for dst_sample in seg.timeline_start_sample..seg.timeline_end_sample {
            let rel = (dst_sample - seg.timeline_start_sample) as f64;
            let mut src_pos = rel * step;
            if seg.looped {
                src_pos %= src_frames as f64;
            }
            let src_frame0 = src_pos.floor() as usize;
            if src_frame0 >= src_frames {
                break;
            }
            let src_frame1 = if seg.looped {
                (src_frame0 + 1) % src_frames
            } else {
                (src_frame0 + 1).min(src_frames - 1)
            };
            let frac = (src_pos - src_frame0 as f64) as f32;

            let samples = &src.interleaved_f32;
            let (l, r) = if src_channels == 1 {
                let v0 = samples[src_frame0];
                let v1 = samples[src_frame1];
                let v = v0 + ((v1 - v0) * frac);
                (v, v)
            } else {
                let i0 = src_frame0 * src_channels;
                let i1 = src_frame1 * src_channels;
                (
                    samples[i0] + ((samples[i1] - samples[i0]) * frac),
                    samples[i0 + 1] + ((samples[i1 + 1] - samples[i0 + 1]) * frac),
                )
            };

            let dst_idx = dst_sample as usize * channels;
            out[dst_idx] += l * seg.volume;
            if channels > 1 {
                out[dst_idx + 1] += r * seg.volume;
            }
        }
    }

    for s in &mut out {
        *s = s.clamp(-1.0, 1.0);
    }
    out
}

/// Write interleaved samples as raw little-endian `f32`, the format `ffmpeg` reads with `-f f32le`.
pub fn write_mix_to_f32le_file(samples_interleaved: &[f32], out_path: &Path) -> SlidecastResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!(
                "failed to create audio mix output directory '{}'",
                parent.display()
            )
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes)
        .with_context(|| format!("failed to write mixed audio file '{}'", out_path.display()))?;
    Ok(())
}

/// Nearest sample index for `secs` seconds.
pub fn secs_to_sample(secs: f64, sample_rate: u32) -> u64 {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    (secs * f64::from(sample_rate)).round() as u64
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
