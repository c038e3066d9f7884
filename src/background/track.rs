use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::assets::decode::{decode_image_file, premultiply_rgba8_in_place};
use crate::assets::media::{VideoFrameReader, probe_media};
use crate::background::fit::{CoverFit, fit_still};
use crate::foundation::core::{Canvas, Fps, Rgba8Premul};
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::timeline::schedule::Schedule;

/// Resolved background references for one scenario.
///
/// A slide's own image covers that slide's segment. Everything else (intro, gaps, outro, slides
/// without an image) shows the bed: the video, else the scenario image, else a solid color.
#[derive(Clone, Debug, Default)]
pub struct BackgroundPlan {
    /// Looping background video.
    pub video: Option<PathBuf>,
    /// Scenario-wide still.
    pub image: Option<PathBuf>,
    /// Per-slide stills, indexed like the slides.
    pub slide_images: Vec<Option<PathBuf>>,
}

enum Bed {
    Solid,
    Still(Arc<Vec<u8>>),
    Video(LoopingVideo),
}

/// Per-frame background producer for one scenario.
pub struct BackgroundTrack {
    canvas: Canvas,
    solid: Vec<u8>,
    bed: Bed,
    bed_image: Option<Arc<Vec<u8>>>,
    slide_stills: Vec<Option<Arc<Vec<u8>>>>,
}

impl BackgroundTrack {
    /// Open every layer of `plan`. Unusable references are logged and replaced by their fallback.
    pub fn open(plan: &BackgroundPlan, canvas: Canvas, fps: Fps, color: Rgba8Premul) -> Self {
        let bed_image = plan
            .image
            .as_deref()
            .and_then(|p| load_still(p, canvas, None));
        let slide_stills = plan
            .slide_images
            .iter()
            .enumerate()
            .map(|(i, p)| p.as_deref().and_then(|p| load_still(p, canvas, Some(i + 1))))
            .collect();

        let video = plan
            .video
            .as_deref()
            .and_then(|p| match LoopingVideo::open(p, canvas, fps) {
                Ok(v) => Some(v),
                Err(err) => {
                    tracing::warn!(path = %p.display(), %err, "background video unusable, falling back");
                    None
                }
            });
        let bed = match (video, &bed_image) {
            (Some(v), _) => Bed::Video(v),
            (None, Some(img)) => Bed::Still(img.clone()),
            (None, None) => Bed::Solid,
        };

        Self {
            canvas,
            solid: solid_frame(canvas, color),
            bed,
            bed_image,
            slide_stills,
        }
    }

    /// Solid-color track with no other layers.
    pub fn solid(canvas: Canvas, color: Rgba8Premul) -> Self {
        Self {
            canvas,
            solid: solid_frame(canvas, color),
            bed: Bed::Solid,
            bed_image: None,
            slide_stills: Vec::new(),
        }
    }

    /// Slide whose own image is shown at time `t`, if any.
    pub fn slide_layer(&self, t: f64, schedule: &Schedule) -> Option<usize> {
        let seg = schedule.segment_at(t)?;
        self.slide_stills
            .get(seg.slide_index)
            .and_then(Option::as_ref)
            .map(|_| seg.slide_index)
    }

    /// Write the background for the next output frame (timeline time `t`) into `dst`.
    ///
    /// Must be called once per output frame in order; a video bed advances on every call.
    pub fn next_frame_into(&mut self, t: f64, schedule: &Schedule, dst: &mut [u8]) {
        debug_assert_eq!(dst.len(), self.canvas.rgba_len());
        let bed_frame = self.advance_bed();
        if let Some(idx) = self.slide_layer(t, schedule)
            && let Some(Some(still)) = self.slide_stills.get(idx)
        {
            dst.copy_from_slice(still);
            return;
        }
        match bed_frame {
            BedFrame::Video => {
                if let Bed::Video(v) = &self.bed {
                    dst.copy_from_slice(&v.current);
                }
            }
            BedFrame::Still => {
                if let Bed::Still(img) = &self.bed {
                    dst.copy_from_slice(img);
                }
            }
            BedFrame::Solid => dst.copy_from_slice(&self.solid),
        }
    }

    fn advance_bed(&mut self) -> BedFrame {
        let failed = match &mut self.bed {
            Bed::Solid => return BedFrame::Solid,
            Bed::Still(_) => return BedFrame::Still,
            Bed::Video(v) => match v.advance() {
                Ok(()) => return BedFrame::Video,
                Err(err) => err,
            },
        };
        tracing::warn!(err = %failed, "background video stopped, falling back");
        self.bed = match &self.bed_image {
            Some(img) => Bed::Still(img.clone()),
            None => Bed::Solid,
        };
        self.advance_bed()
    }
}

#[derive(Clone, Copy)]
enum BedFrame {
    Solid,
    Still,
    Video,
}

/// Video bed that restarts from its first frame whenever a pass runs out.
struct LoopingVideo {
    path: PathBuf,
    canvas: Canvas,
    fit: CoverFit,
    fps: Fps,
    reader: Option<VideoFrameReader>,
    current: Vec<u8>,
    frame_in_pass: u64,
    pass_frames: Option<u64>,
}

impl LoopingVideo {
    fn open(path: &Path, canvas: Canvas, fps: Fps) -> SlidecastResult<Self> {
        let info = probe_media(path)?;
        if !info.has_video {
            return Err(SlidecastError::media(format!(
                "'{}' has no video stream",
                path.display()
            )));
        }
        let fit = CoverFit::compute(info.width, info.height, canvas)?;
        tracing::debug!(path = %path.display(), ?fit, duration = info.duration_sec, "background video");
        Ok(Self {
            path: path.to_path_buf(),
            canvas,
            fit,
            fps,
            reader: None,
            current: vec![0; canvas.rgba_len()],
            frame_in_pass: 0,
            pass_frames: None,
        })
    }

    fn advance(&mut self) -> SlidecastResult<()> {
        for _ in 0..2 {
            if self.reader.is_none() {
                self.reader = Some(VideoFrameReader::spawn(
                    &self.path, self.canvas, self.fit, self.fps,
                )?);
            }
            let Some(reader) = self.reader.as_mut() else {
                continue;
            };
            if reader.read_frame(&mut self.current)? {
                premultiply_rgba8_in_place(&mut self.current);
                self.frame_in_pass += 1;
                return Ok(());
            }
            if self.frame_in_pass == 0 {
                break;
            }
            if self.pass_frames.is_none() {
                tracing::debug!(path = %self.path.display(), frames = self.frame_in_pass, "background video loops");
            }
            self.pass_frames = Some(self.frame_in_pass);
            self.frame_in_pass = 0;
            self.reader = None;
        }
        Err(SlidecastError::media(format!(
            "'{}' produced no frames",
            self.path.display()
        )))
    }
}

fn load_still(path: &Path, canvas: Canvas, slide: Option<usize>) -> Option<Arc<Vec<u8>>> {
    if !path.is_file() {
        tracing::warn!(?slide, path = %path.display(), "background image missing");
        return None;
    }
    match decode_image_file(path).and_then(|img| fit_still(&img, canvas)) {
        Ok(px) => Some(Arc::new(px)),
        Err(err) => {
            tracing::warn!(?slide, path = %path.display(), %err, "background image unusable");
            None
        }
    }
}

fn solid_frame(canvas: Canvas, color: Rgba8Premul) -> Vec<u8> {
    color.to_array().repeat(canvas.width as usize * canvas.height as usize)
}

#[cfg(test)]
#[path = "../../tests/unit/background/track.rs"]
mod tests;
