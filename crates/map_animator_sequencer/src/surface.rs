// SPDX-License-Identifier: MIT OR Apache-2.0
//! The map surface the sequencer drives.
//!
//! Tile rendering, projection math and drawing tools live behind
//! [`MapSurface`]. [`HeadlessSurface`] is an in-memory implementation that
//! records every call; it backs frame sampling and the tests.

use crate::keyframe::CameraPose;
use crate::layer::{AnimatedLayer, LayerId, Reveal};
use indexmap::IndexMap;
use serde::Serialize;

/// How a camera change should be presented
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum PoseTransition {
    /// Jump immediately (scrubbing, selection)
    Instant,
    /// Fly over a short duration (playback)
    Animated {
        /// Transition duration in seconds
        duration_secs: f64,
    },
}

/// Capabilities the sequencer needs from a map
pub trait MapSurface {
    /// Current camera pose
    fn pose(&self) -> CameraPose;

    /// Move the camera
    fn set_pose(&mut self, pose: CameraPose, transition: PoseTransition);

    /// Show a layer at `progress` in `[0, 1]`
    fn set_layer_progress(&mut self, id: LayerId, progress: f64);

    /// Start drawing a layer
    fn add_layer(&mut self, layer: &AnimatedLayer);

    /// Stop drawing a layer
    fn remove_layer(&mut self, id: LayerId);

    /// Layer style or content changed
    fn update_layer(&mut self, _layer: &AnimatedLayer) {}
}

/// Snapshot of one layer on a [`HeadlessSurface`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSnapshot {
    /// Layer ID
    pub id: LayerId,
    /// Layer kind name
    pub kind: &'static str,
    /// Last pushed progress
    pub progress: f64,
    /// Visual state for that progress
    pub reveal: Reveal,
}

/// Snapshot of a [`HeadlessSurface`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceSnapshot {
    /// Camera pose
    pub pose: CameraPose,
    /// Layers in draw order
    pub layers: Vec<LayerSnapshot>,
}

/// In-memory map surface
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    pose: CameraPose,
    pose_log: Vec<(CameraPose, PoseTransition)>,
    layers: IndexMap<LayerId, AnimatedLayer>,
    progress: IndexMap<LayerId, f64>,
    progress_updates: usize,
}

impl HeadlessSurface {
    /// Create a surface at the origin, zoom 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a surface looking at `pose`
    pub fn with_pose(pose: CameraPose) -> Self {
        Self {
            pose,
            ..Self::default()
        }
    }

    /// Move the camera as a user would (not recorded as a sequencer call)
    pub fn pan_to(&mut self, pose: CameraPose) {
        self.pose = pose;
    }

    /// Every `set_pose` call, oldest first
    pub fn pose_log(&self) -> &[(CameraPose, PoseTransition)] {
        &self.pose_log
    }

    /// Forget recorded `set_pose` calls
    pub fn clear_pose_log(&mut self) {
        self.pose_log.clear();
    }

    /// Last progress pushed for a layer
    pub fn layer_progress(&self, id: LayerId) -> Option<f64> {
        self.progress.get(&id).copied()
    }

    /// Total number of `set_layer_progress` calls
    pub fn progress_updates(&self) -> usize {
        self.progress_updates
    }

    /// Whether a layer is drawn
    pub fn has_layer(&self, id: LayerId) -> bool {
        self.layers.contains_key(&id)
    }

    /// Visual state of a layer
    pub fn reveal(&self, id: LayerId) -> Option<Reveal> {
        let layer = self.layers.get(&id)?;
        Some(layer.reveal(self.layer_progress(id).unwrap_or(0.0)))
    }

    /// Capture the current state
    pub fn snapshot(&self) -> SurfaceSnapshot {
        let layers = self
            .layers
            .values()
            .map(|layer| {
                let progress = self.layer_progress(layer.id).unwrap_or(0.0);
                LayerSnapshot {
                    id: layer.id,
                    kind: layer.kind.name(),
                    progress,
                    reveal: layer.reveal(progress),
                }
            })
            .collect();
        SurfaceSnapshot {
            pose: self.pose,
            layers,
        }
    }
}

impl MapSurface for HeadlessSurface {
    fn pose(&self) -> CameraPose {
        self.pose
    }

    fn set_pose(&mut self, pose: CameraPose, transition: PoseTransition) {
        self.pose = pose;
        self.pose_log.push((pose, transition));
    }

    fn set_layer_progress(&mut self, id: LayerId, progress: f64) {
        self.progress_updates += 1;
        if self.layers.contains_key(&id) {
            self.progress.insert(id, progress);
        } else {
            tracing::debug!("Progress for unknown layer {id}");
        }
    }

    fn add_layer(&mut self, layer: &AnimatedLayer) {
        self.layers.insert(layer.id, layer.clone());
    }

    fn remove_layer(&mut self, id: LayerId) {
        self.layers.shift_remove(&id);
        self.progress.shift_remove(&id);
    }

    fn update_layer(&mut self, layer: &AnimatedLayer) {
        if let Some(existing) = self.layers.get_mut(&layer.id) {
            *existing = layer.clone();
        }
    }
}
