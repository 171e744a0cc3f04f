// SPDX-License-Identifier: MIT OR Apache-2.0
//! Camera keyframe definitions for the sequencer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Capturing within this many seconds of an existing keyframe replaces it
pub const DEDUP_TOLERANCE: f64 = 0.1;

/// Resolving within this many seconds of a keyframe snaps to its pose
pub const SNAP_TOLERANCE: f64 = 0.01;

/// Unique identifier for a keyframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyframeId(pub Uuid);

impl KeyframeId {
    /// Create a new random keyframe ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for KeyframeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Geographic coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lng: f64,
}

impl LatLng {
    /// Create a coordinate
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both components are finite
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Map camera: center and zoom
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraPose {
    /// Map center
    pub center: LatLng,
    /// Zoom level
    pub zoom: f64,
}

impl CameraPose {
    /// Create a pose from raw components
    pub const fn new(lat: f64, lng: f64, zoom: f64) -> Self {
        Self {
            center: LatLng::new(lat, lng),
            zoom,
        }
    }

    /// All components are finite
    pub fn is_finite(&self) -> bool {
        self.center.is_finite() && self.zoom.is_finite()
    }

    /// Component-wise linear interpolation
    pub fn lerp(&self, other: &CameraPose, t: f64) -> CameraPose {
        CameraPose::new(
            Interpolation::lerp(self.center.lat, other.center.lat, t),
            Interpolation::lerp(self.center.lng, other.center.lng, t),
            Interpolation::lerp(self.zoom, other.zoom, t),
        )
    }
}

/// A camera keyframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Unique keyframe ID
    pub id: KeyframeId,
    /// Time in seconds
    pub time: f64,
    /// Camera pose at this keyframe
    pub pose: CameraPose,
}

impl Keyframe {
    /// Create a new keyframe
    pub fn new(time: f64, pose: CameraPose) -> Self {
        Self {
            id: KeyframeId::new(),
            time,
            pose,
        }
    }

    /// Whether this keyframe lies strictly within `tolerance` of `time`
    pub fn is_near(&self, time: f64, tolerance: f64) -> bool {
        (self.time - time).abs() < tolerance
    }
}

/// Interpolation utilities
pub struct Interpolation;

impl Interpolation {
    /// Linear interpolation between two values
    pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
        a + (b - a) * t
    }

    /// Cubic ease-in/ease-out
    pub fn ease_in_out_cubic(t: f64) -> f64 {
        if t < 0.5 {
            4.0 * t * t * t
        } else {
            1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
        }
    }
}
