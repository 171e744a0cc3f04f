// SPDX-License-Identifier: MIT OR Apache-2.0
//! JSON-lines frame output.

use map_animator_sequencer::{FrameInfo, FrameSink, HeadlessSurface, SurfaceSnapshot};
use serde::Serialize;
use std::io::{self, Write};
use thiserror::Error;

/// Failure writing a frame
#[derive(Debug, Error)]
pub enum SinkError {
    /// Output stream failed
    #[error("Failed to write frame: {0}")]
    Io(#[from] io::Error),

    /// Snapshot could not be encoded
    #[error("Failed to encode frame: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct FrameLine {
    frame: u32,
    time: f64,
    #[serde(flatten)]
    snapshot: SurfaceSnapshot,
}

/// Writes one JSON object per frame
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Flush and return the writer
    pub fn finish(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> FrameSink<HeadlessSurface> for JsonLinesSink<W> {
    type Error = SinkError;

    fn capture(&mut self, frame: FrameInfo, surface: &HeadlessSurface) -> Result<(), SinkError> {
        let line = FrameLine {
            frame: frame.index,
            time: frame.time,
            snapshot: surface.snapshot(),
        };
        serde_json::to_writer(&mut self.writer, &line)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}
