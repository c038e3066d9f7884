use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use crate::background::fit::CoverFit;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Sample rate of the master mix and of every decoded clip.
pub const MIX_SAMPLE_RATE: u32 = 48_000;

/// Result of probing a media file with `ffprobe`.
#[derive(Clone, Debug)]
pub struct MediaInfo {
    /// Probed file.
    pub source_path: PathBuf,
    /// Video width, zero without a video stream.
    pub width: u32,
    /// Video height, zero without a video stream.
    pub height: u32,
    /// Container duration in seconds (0 when unknown).
    pub duration_sec: f64,
    /// Whether a video stream exists.
    pub has_video: bool,
    /// Whether an audio stream exists.
    pub has_audio: bool,
}

/// Interleaved float PCM.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioPcm {
    /// Samples per second per channel.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Silent buffer of `frames` sample frames.
    pub fn silence(sample_rate: u32, channels: u16, frames: usize) -> Self {
        Self {
            sample_rate,
            channels,
            interleaved_f32: vec![0.0; frames * usize::from(channels)],
        }
    }

    /// Number of sample frames.
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.interleaved_f32.len() / usize::from(self.channels)
    }

    /// Duration in seconds.
    pub fn duration_sec(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }
}

/// Return `true` when both `ffmpeg` and `ffprobe` can be invoked from `PATH`.
pub fn media_tools_available() -> bool {
    ["ffmpeg", "ffprobe"].iter().all(|tool| {
        Command::new(tool)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    })
}

/// Probe stream layout and duration.
pub fn probe_media(source_path: &Path) -> SlidecastResult<MediaInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        #[serde(default)]
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| SlidecastError::media(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(SlidecastError::media(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| SlidecastError::media(format!("ffprobe json parse failed: {e}")))?;
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"));
    let has_audio = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));
    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .or_else(|| video.and_then(|v| v.duration.as_deref()))
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
        .unwrap_or(0.0);

    Ok(MediaInfo {
        source_path: source_path.to_path_buf(),
        width: video.and_then(|v| v.width).unwrap_or(0),
        height: video.and_then(|v| v.height).unwrap_or(0),
        duration_sec,
        has_video: video.is_some(),
        has_audio,
    })
}

/// Decode any audio `ffmpeg` understands into interleaved stereo f32 at `sample_rate`.
///
/// Files without an audio stream decode to empty PCM.
pub fn decode_audio_f32_stereo(path: &Path, sample_rate: u32) -> SlidecastResult<AudioPcm> {
    let out = Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| {
            SlidecastError::media(format!("failed to run ffmpeg for audio decode: {e}"))
        })?;

    if !out.status.success() {
        let msg = String::from_utf8_lossy(&out.stderr);
        // ffmpeg reports a missing audio stream as an error
        if msg.contains("Stream specifier")
            || msg.contains("matches no streams")
            || msg.contains("Output file #0 does not contain any stream")
        {
            return Ok(AudioPcm::silence(sample_rate, 2, 0));
        }
        return Err(SlidecastError::media(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            msg.trim()
        )));
    }

    if !out.stdout.len().is_multiple_of(4) {
        return Err(SlidecastError::media(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    let interleaved_f32 = out
        .stdout
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    Ok(AudioPcm {
        sample_rate,
        channels: 2,
        interleaved_f32,
    })
}

/// Streams cover-fitted RGBA frames of one pass through a video at the output frame rate.
pub struct VideoFrameReader {
    child: Child,
    stdout: ChildStdout,
    frame_len: usize,
}

impl VideoFrameReader {
    /// Spawn `ffmpeg` scaling and center-cropping `source` to `canvas` per `fit`.
    pub fn spawn(source: &Path, canvas: Canvas, fit: CoverFit, fps: Fps) -> SlidecastResult<Self> {
        let filter = format!(
            "scale={}:{}:flags=bilinear,crop={}:{}:{}:{}",
            fit.scaled_width, fit.scaled_height, canvas.width, canvas.height, fit.crop_x, fit.crop_y
        );
        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-nostdin", "-i"])
            .arg(source)
            .args([
                "-an",
                "-vf",
                &filter,
                "-r",
                &format!("{}/{}", fps.num, fps.den),
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "pipe:1",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                SlidecastError::media(format!("failed to spawn ffmpeg for video decode: {e}"))
            })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SlidecastError::media("failed to open ffmpeg stdout (unexpected)"))?;
        Ok(Self {
            child,
            stdout,
            frame_len: canvas.rgba_len(),
        })
    }

    /// Read the next frame into `dst` (straight RGBA8). Returns `false` at end of stream.
    pub fn read_frame(&mut self, dst: &mut [u8]) -> SlidecastResult<bool> {
        if dst.len() != self.frame_len {
            return Err(SlidecastError::media(
                "video frame buffer size mismatch with canvas",
            ));
        }
        let mut filled = 0;
        while filled < dst.len() {
            match self.stdout.read(&mut dst[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => {
                    return Err(SlidecastError::media(format!(
                        "failed to read decoded video frame: {e}"
                    )));
                }
            }
        }
        Ok(filled == dst.len())
    }
}

impl Drop for VideoFrameReader {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/media.rs"]
mod tests;
