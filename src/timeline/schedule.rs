//! Absolute slide timing.
//!
//! Each slide occupies `[start, end)` where the span is the largest of its declared duration, its
//! narration clip plus the trailing pad, and the configured floor. Slides are separated by
//! `voice_line_delay`; the first starts at `intro_delay` and `outro_delay` follows the last.

use crate::config::model::TimingConfig;
use crate::foundation::core::Fps;
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::scenario::model::Slide;

/// One slide's placement on the timeline, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct TimedSegment {
    /// Index into the scenario's slide list.
    pub slide_index: usize,
    /// Inclusive start.
    pub start: f64,
    /// Exclusive end.
    pub end: f64,
}

impl TimedSegment {
    /// `end - start`.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether `t` falls inside `[start, end)`.
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t < self.end
    }
}

/// Resolved timeline for one scenario.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Schedule {
    /// Segments in slide order.
    pub segments: Vec<TimedSegment>,
    /// Total duration including intro and outro.
    pub total: f64,
}

impl Schedule {
    /// Segment covering time `t`, if any. Intro, gaps and outro return `None`.
    pub fn segment_at(&self, t: f64) -> Option<&TimedSegment> {
        let idx = self.segments.partition_point(|s| s.end <= t);
        self.segments.get(idx).filter(|s| s.contains(t))
    }

    /// Number of frames needed to cover the whole schedule.
    pub fn frame_count(&self, fps: Fps) -> u64 {
        fps.secs_to_frames_ceil(self.total)
    }
}

/// Build the schedule for `slides`.
///
/// `narration` holds one optional clip duration per slide; a zero (or negative) duration counts
/// as no clip. A slide with a non-positive declared duration aborts the scenario. A slide with
/// neither text nor narration keeps its declared duration and renders as a silent, bare slide.
pub fn build_schedule(
    slides: &[Slide],
    narration: &[Option<f64>],
    timing: &TimingConfig,
) -> SlidecastResult<Schedule> {
    if narration.len() != slides.len() {
        return Err(SlidecastError::evaluation(format!(
            "narration list has {} entries for {} slides",
            narration.len(),
            slides.len()
        )));
    }

    let mut segments = Vec::with_capacity(slides.len());
    let mut cursor = timing.intro_delay;
    for (i, (slide, clip)) in slides.iter().zip(narration).enumerate() {
        let declared = slide.duration_seconds;
        if !declared.is_finite() || declared <= 0.0 {
            return Err(SlidecastError::validation(format!(
                "slide {} has non-positive duration_seconds ({declared})",
                i + 1
            )));
        }
        let clip = clip.filter(|d| d.is_finite() && *d > 0.0);
        if clip.is_none() && slide.text.trim().is_empty() {
            tracing::warn!(slide = i + 1, "empty slide without narration");
        }

        let mut effective = declared.max(timing.min_slide_seconds);
        if let Some(d) = clip {
            effective = effective.max(d + timing.narration_pad);
        }

        if i > 0 {
            cursor += timing.voice_line_delay;
        }
        segments.push(TimedSegment {
            slide_index: i,
            start: cursor,
            end: cursor + effective,
        });
        cursor += effective;
    }

    Ok(Schedule {
        segments,
        total: cursor + timing.outro_delay,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/schedule.rs"]
mod tests;
