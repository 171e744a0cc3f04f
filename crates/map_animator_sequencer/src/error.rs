// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for the sequencer.

use crate::layer::LayerId;
use thiserror::Error;

/// Errors reported by timeline operations.
///
/// None of these are fatal: the timeline keeps its prior valid state and the
/// caller decides whether to surface or log them.
#[derive(Debug, Error)]
pub enum TimelineError {
    /// Timeline duration must be positive and finite
    #[error("Invalid timeline duration: {0}")]
    InvalidDuration(f64),

    /// Camera pose with a non-finite component
    #[error("Invalid camera pose: lat={lat}, lng={lng}, zoom={zoom}")]
    InvalidPose {
        /// Latitude
        lat: f64,
        /// Longitude
        lng: f64,
        /// Zoom level
        zoom: f64,
    },

    /// No keyframe at the given index
    #[error("Keyframe not found at index {0}")]
    KeyframeNotFound(usize),

    /// No layer with the given id
    #[error("Layer not found: {0}")]
    LayerNotFound(LayerId),

    /// Content edit that does not apply to the layer's kind
    #[error("Layer {id} is not a {expected} layer")]
    KindMismatch {
        /// Target layer
        id: LayerId,
        /// Kind the edit requires
        expected: &'static str,
    },

    /// Export settings rejected before sampling
    #[error("Invalid export settings: {0}")]
    InvalidExportSettings(String),

    /// Frame sink failed while capturing a frame
    #[error("Failed to capture frame {frame}: {source}")]
    Capture {
        /// Frame index that failed
        frame: u32,
        /// Underlying sink error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for timeline operations
pub type Result<T> = std::result::Result<T, TimelineError>;

/// Errors loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// RON parse error
    #[error("Failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// RON serialization error
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),

    /// Config written by a newer format version
    #[error("Config version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Highest version this build reads
        supported: u32,
    },

    /// Semantically invalid value
    #[error("Invalid config: {0}")]
    Invalid(String),
}
