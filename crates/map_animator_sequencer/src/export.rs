// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frame-by-frame export.
//!
//! Export does not run playback. It seeks to each frame time in turn, lets
//! the camera and layers settle, and hands the surface to a [`FrameSink`].
//! Encoding the captured frames into a video is up to the sink.

use crate::error::{Result, TimelineError};
use crate::surface::{HeadlessSurface, MapSurface, SurfaceSnapshot};
use crate::timeline::Timeline;
use serde::{Deserialize, Serialize};

/// Output container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VideoFormat {
    /// H.264 in MP4
    #[default]
    Mp4,
    /// VP9 in WebM
    Webm,
}

impl VideoFormat {
    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
        }
    }

    /// Default output file name
    pub fn file_name(&self) -> String {
        format!("map_animation.{}", self.extension())
    }

    /// MIME type of the output
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp4 => "video/mp4",
            Self::Webm => "video/webm",
        }
    }

    /// Encoder arguments for an ffmpeg-style encoder
    pub fn encoder_args(&self) -> &'static [&'static str] {
        match self {
            Self::Mp4 => &[
                "-c:v", "libx264", "-preset", "medium", "-crf", "23", "-pix_fmt", "yuv420p",
            ],
            Self::Webm => &["-c:v", "libvpx-vp9", "-crf", "30", "-b:v", "0"],
        }
    }
}

/// Export resolution, rate and container
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Frames per second
    pub fps: u32,
    /// Output container
    #[serde(default)]
    pub format: VideoFormat,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fps: 30,
            format: VideoFormat::Mp4,
        }
    }
}

impl ExportSettings {
    /// Reject settings that cannot produce frames
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(TimelineError::InvalidExportSettings(format!(
                "resolution must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.fps == 0 {
            return Err(TimelineError::InvalidExportSettings(
                "fps must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Frames needed to cover `duration` seconds
    pub fn frame_count(&self, duration: f64) -> u32 {
        (duration * self.fps as f64).ceil().max(0.0) as u32
    }

    /// Timeline time of frame `index`
    pub fn frame_time(&self, index: u32) -> f64 {
        index as f64 / self.fps as f64
    }
}

/// The frame being captured
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// Zero-based frame index
    pub index: u32,
    /// Timeline time of the frame
    pub time: f64,
    /// Total frames in this export
    pub total: u32,
}

/// Receives settled frames during export
pub trait FrameSink<S: MapSurface> {
    /// Capture failure
    type Error: std::error::Error + Send + Sync + 'static;

    /// Grab the surface for one frame
    fn capture(&mut self, frame: FrameInfo, surface: &S) -> std::result::Result<(), Self::Error>;
}

/// Collects a snapshot of a [`HeadlessSurface`] per frame
#[derive(Debug, Default)]
pub struct SnapshotCollector {
    /// Captured frames in order
    pub frames: Vec<(FrameInfo, SurfaceSnapshot)>,
}

impl FrameSink<HeadlessSurface> for SnapshotCollector {
    type Error = std::convert::Infallible;

    fn capture(
        &mut self,
        frame: FrameInfo,
        surface: &HeadlessSurface,
    ) -> std::result::Result<(), Self::Error> {
        self.frames.push((frame, surface.snapshot()));
        Ok(())
    }
}

/// What an export produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportSummary {
    /// Frames captured
    pub frames: u32,
    /// Frame rate
    pub fps: u32,
    /// Covered timeline length in seconds
    pub duration: f64,
}

/// Sample the timeline at `settings.fps` and feed every frame to `sink`.
///
/// Playback is stopped first. `progress` gets the captured fraction in
/// `[0, 1]` after each frame. The timeline is left at the last frame time.
pub fn export_frames<S, K>(
    timeline: &mut Timeline<S>,
    settings: &ExportSettings,
    sink: &mut K,
    mut progress: impl FnMut(f64),
) -> Result<ExportSummary>
where
    S: MapSurface,
    K: FrameSink<S>,
{
    settings.validate()?;
    timeline.stop();
    timeline.reset_camera_gate();

    let duration = timeline.duration();
    let total = settings.frame_count(duration);
    tracing::info!(
        "Exporting {total} frames at {}x{} {}fps ({:?})",
        settings.width,
        settings.height,
        settings.fps,
        settings.format
    );

    for index in 0..total {
        let time = timeline.seek(settings.frame_time(index));
        let frame = FrameInfo { index, time, total };
        sink.capture(frame, timeline.surface())
            .map_err(|e| TimelineError::Capture {
                frame: index,
                source: Box::new(e),
            })?;
        progress((index + 1) as f64 / total as f64);
    }

    tracing::info!("Export finished: {total} frames");
    Ok(ExportSummary {
        frames: total,
        fps: settings.fps,
        duration,
    })
}
