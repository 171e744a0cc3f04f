// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline notifications.

use crate::layer::LayerId;

/// Something that changed on the timeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimelineEvent {
    /// Current time was written
    TimeChanged {
        /// New current time (seconds, clamped)
        time: f64,
        /// Whether playback was running when the time was written
        playing: bool,
    },
    /// Playback started
    PlaybackStarted,
    /// Playback stopped (explicitly or by reaching the end)
    PlaybackStopped,
    /// Keyframe set or a keyframe time changed
    KeyframesChanged,
    /// A layer was added
    LayerAdded(LayerId),
    /// A layer was removed
    LayerRemoved(LayerId),
    /// A layer's style or content changed
    LayerUpdated(LayerId),
    /// A layer's time window changed
    LayerWindowChanged(LayerId),
}

/// FIFO of pending events
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<TimelineEvent>,
}

impl EventQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append an event
    pub fn emit(&mut self, event: TimelineEvent) {
        self.events.push(event);
    }

    /// Take all pending events
    pub fn drain(&mut self) -> Vec<TimelineEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Receives timeline events after the timeline's own tracks have handled them
pub trait TimelineObserver {
    /// Called once per event, in emission order
    fn on_event(&mut self, event: &TimelineEvent);
}

impl<F> TimelineObserver for F
where
    F: FnMut(&TimelineEvent),
{
    fn on_event(&mut self, event: &TimelineEvent) {
        self(event);
    }
}
