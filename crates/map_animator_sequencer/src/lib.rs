// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline/sequencer for Map Animator.
//!
//! This crate turns a sparse set of camera keyframes and a list of map layers
//! with reveal windows into a continuous animation:
//! - Playback clock with real-time ticking
//! - Camera keyframe track with eased interpolation
//! - Layer track with linear reveal progress
//! - Drag gestures and ruler geometry
//! - Frame-by-frame export
//!
//! ## Architecture
//!
//! The sequencer is built on:
//! - A [`Timeline`] that owns all state and dispatches events in a fixed order
//! - A [`MapSurface`] trait for the map being animated
//! - RON configuration
//! - An optional tokio driver for real-time playback

pub mod clock;
pub mod config;
pub mod drag;
pub mod driver;
pub mod error;
pub mod events;
pub mod export;
pub mod gate;
pub mod keyframe;
pub mod layer;
pub mod surface;
pub mod timeline;
pub mod track;
pub mod view;

pub use clock::{PlaybackState, TickOutcome, TimelineClock};
pub use config::TimelineConfig;
pub use drag::{DragOperation, WindowDragMode};
pub use driver::{command_channel, play_to_end, PlaybackCommand, PlaybackHandle};
pub use error::{ConfigError, Result, TimelineError};
pub use events::{TimelineEvent, TimelineObserver};
pub use export::{export_frames, ExportSettings, FrameInfo, FrameSink, SnapshotCollector, VideoFormat};
pub use gate::ChangeGate;
pub use keyframe::{CameraPose, Interpolation, Keyframe, KeyframeId, LatLng};
pub use layer::{
    AnimatedLayer, AnimationWindow, LayerContent, LayerId, LayerKind, LayerStyle, LayerTrack,
    Reveal, TextAlign, TextStyle,
};
pub use surface::{HeadlessSurface, MapSurface, PoseTransition, SurfaceSnapshot};
pub use timeline::Timeline;
pub use track::{CaptureOutcome, KeyframeTrack};
pub use view::{format_time, TimelineView};
