// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline clock: the single source of truth for "now".
//!
//! The clock owns elapsed time and playback state and nothing else. It knows
//! nothing about cameras or layers; it only queues [`TimelineEvent`]s that the
//! owning timeline drains and dispatches.

use crate::error::{Result, TimelineError};
use crate::events::{EventQueue, TimelineEvent};
use std::time::{Duration, Instant};

/// Default playback tick rate (best effort)
pub const DEFAULT_TICK_RATE_HZ: f64 = 60.0;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Not playing
    #[default]
    Stopped,
    /// Playing forward
    Playing,
}

impl PlaybackState {
    /// Status string for display
    pub fn status_text(&self) -> &'static str {
        match self {
            PlaybackState::Stopped => "Stopped",
            PlaybackState::Playing => "Playing",
        }
    }
}

/// Result of a playback tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Not playing; nothing happened
    Idle,
    /// Time advanced to the contained value
    Advanced(f64),
    /// Reached the end; playback has stopped
    Finished,
}

/// Recurring tick bookkeeping, present exactly while playing
#[derive(Debug, Clone, Copy)]
struct TickSchedule {
    last_tick: Instant,
}

/// Timeline clock
#[derive(Debug)]
pub struct TimelineClock {
    duration: f64,
    current_time: f64,
    tick_rate_hz: f64,
    schedule: Option<TickSchedule>,
    events: EventQueue,
}

impl TimelineClock {
    /// Create a stopped clock at time zero
    pub fn new(duration: f64) -> Result<Self> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(TimelineError::InvalidDuration(duration));
        }
        Ok(Self {
            duration,
            current_time: 0.0,
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
            schedule: None,
            events: EventQueue::new(),
        })
    }

    /// Set the target tick rate; non-positive rates are ignored
    pub fn with_tick_rate(mut self, hz: f64) -> Self {
        if hz.is_finite() && hz > 0.0 {
            self.tick_rate_hz = hz;
        } else {
            tracing::warn!("Ignoring invalid tick rate {hz}");
        }
        self
    }

    /// Total duration in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Current time in seconds
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Whether playback is running
    pub fn is_playing(&self) -> bool {
        self.schedule.is_some()
    }

    /// Playback state
    pub fn state(&self) -> PlaybackState {
        if self.is_playing() {
            PlaybackState::Playing
        } else {
            PlaybackState::Stopped
        }
    }

    /// Target tick rate in Hz
    pub fn tick_rate_hz(&self) -> f64 {
        self.tick_rate_hz
    }

    /// Interval between scheduled ticks
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate_hz)
    }

    /// Set the current time, clamped to `[0, duration]`.
    ///
    /// Always emits `TimeChanged`, even if the value did not change, so a seek
    /// from the UI re-syncs everything downstream. NaN is ignored.
    pub fn seek(&mut self, time: f64) -> f64 {
        if time.is_nan() {
            tracing::debug!("Ignoring NaN seek");
            return self.current_time;
        }
        self.current_time = time.clamp(0.0, self.duration);
        self.events.emit(TimelineEvent::TimeChanged {
            time: self.current_time,
            playing: self.is_playing(),
        });
        self.current_time
    }

    /// Start playback. Returns false if already playing.
    pub fn play(&mut self, now: Instant) -> bool {
        if self.is_playing() {
            return false;
        }

        // Restart from the top when parked at the end
        if self.current_time >= self.duration {
            self.seek(0.0);
        }

        self.schedule = Some(TickSchedule { last_tick: now });
        self.events.emit(TimelineEvent::PlaybackStarted);
        tracing::info!("Playback started at {:.3}s", self.current_time);
        true
    }

    /// Stop playback. Returns false if not playing.
    pub fn stop(&mut self) -> bool {
        if self.schedule.take().is_none() {
            return false;
        }
        self.events.emit(TimelineEvent::PlaybackStopped);
        tracing::info!("Playback stopped at {:.3}s", self.current_time);
        true
    }

    /// Stop if playing, otherwise play
    pub fn toggle_play(&mut self, now: Instant) {
        if self.is_playing() {
            self.stop();
        } else {
            self.play(now);
        }
    }

    /// Advance by the wall time elapsed since the previous tick
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let Some(schedule) = self.schedule.as_mut() else {
            return TickOutcome::Idle;
        };

        let delta = now.saturating_duration_since(schedule.last_tick).as_secs_f64();
        schedule.last_tick = now;

        let next = self.current_time + delta;
        if next >= self.duration {
            self.seek(self.duration);
            self.stop();
            return TickOutcome::Finished;
        }

        TickOutcome::Advanced(self.seek(next))
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<TimelineEvent> {
        self.events.drain()
    }
}
