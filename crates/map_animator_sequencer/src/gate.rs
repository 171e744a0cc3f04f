// SPDX-License-Identifier: MIT OR Apache-2.0
//! Change suppression for camera poses.
//!
//! Playback re-resolves the camera at tick rate. Most of those poses differ
//! from the previous one by an imperceptible amount; pushing them to the map
//! anyway makes the camera stutter and wastes redraws.

use crate::keyframe::CameraPose;

/// Minimum latitude/longitude change (degrees) worth applying
pub const POSITION_EPSILON: f64 = 1e-5;

/// Minimum zoom change worth applying
pub const ZOOM_EPSILON: f64 = 0.01;

/// Remembers the last applied pose
#[derive(Debug, Clone, Default)]
pub struct ChangeGate {
    last: Option<CameraPose>,
}

impl ChangeGate {
    /// Create a gate with no memory
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `next` differs enough from `last` to be applied
    pub fn differs(next: &CameraPose, last: Option<&CameraPose>) -> bool {
        let Some(last) = last else {
            return true;
        };
        (next.center.lat - last.center.lat).abs() > POSITION_EPSILON
            || (next.center.lng - last.center.lng).abs() > POSITION_EPSILON
            || (next.zoom - last.zoom).abs() > ZOOM_EPSILON
    }

    /// Whether `next` should be applied given the remembered pose
    pub fn should_apply(&self, next: &CameraPose) -> bool {
        Self::differs(next, self.last.as_ref())
    }

    /// Remember `pose` as applied
    pub fn record(&mut self, pose: CameraPose) {
        self.last = Some(pose);
    }

    /// Forget the last applied pose so the next one always goes through
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Last applied pose, if known
    pub fn last(&self) -> Option<&CameraPose> {
        self.last.as_ref()
    }
}
