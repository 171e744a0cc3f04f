// SPDX-License-Identifier: MIT OR Apache-2.0
//! Drag gestures on the timeline.
//!
//! A gesture is `Idle -> Dragging -> Idle`. It remembers where it started so
//! it can be cancelled, and it never outlives its commit or cancel.

use crate::keyframe::KeyframeId;
use crate::layer::{AnimationWindow, LayerId, MIN_WINDOW_LENGTH};

/// Grab distance from a window edge that resizes instead of moving (pixels)
pub const EDGE_GRAB_PX: f64 = 10.0;

/// What dragging a layer window does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowDragMode {
    /// Shift the whole window
    Move,
    /// Drag the start edge
    ResizeStart,
    /// Drag the end edge
    ResizeEnd,
}

impl WindowDragMode {
    /// Pick the mode from where the window bar was grabbed
    pub fn from_grab(offset_px: f64, width_px: f64) -> Self {
        if offset_px < EDGE_GRAB_PX {
            Self::ResizeStart
        } else if offset_px > width_px - EDGE_GRAB_PX {
            Self::ResizeEnd
        } else {
            Self::Move
        }
    }

    /// Window after dragging `origin` by `delta` seconds
    pub fn apply(self, origin: AnimationWindow, delta: f64) -> AnimationWindow {
        match self {
            Self::Move => {
                let start = (origin.start + delta).max(0.0);
                AnimationWindow::new(start, start + origin.length())
            }
            Self::ResizeStart => {
                let start = (origin.start + delta).max(0.0);
                AnimationWindow::new(start, origin.end.max(start + MIN_WINDOW_LENGTH))
            }
            Self::ResizeEnd => {
                let length = (origin.length() + delta).max(MIN_WINDOW_LENGTH);
                AnimationWindow::new(origin.start, origin.start + length)
            }
        }
    }
}

/// Drag operation state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragOperation {
    /// Not dragging
    #[default]
    Idle,
    /// Dragging the playhead
    Playhead,
    /// Dragging a keyframe
    Keyframe {
        /// Dragged keyframe (stable while the list is re-sorted)
        id: KeyframeId,
        /// Keyframe time when the drag started
        origin_time: f64,
        /// Pointer x when the drag started
        pointer_origin: f64,
    },
    /// Dragging a layer window
    LayerWindow {
        /// Dragged layer
        id: LayerId,
        /// Move or resize
        mode: WindowDragMode,
        /// Window when the drag started
        origin: AnimationWindow,
        /// Pointer x when the drag started
        pointer_origin: f64,
    },
}

impl DragOperation {
    /// A gesture is in progress
    pub fn is_active(&self) -> bool {
        !matches!(self, DragOperation::Idle)
    }
}
