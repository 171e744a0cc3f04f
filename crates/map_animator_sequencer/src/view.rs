// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline view geometry: pixels per second, zoom, ruler.

/// Default horizontal scale (pixels per second)
pub const DEFAULT_TIME_SCALE: f64 = 100.0;
/// Most zoomed-out scale
pub const MIN_TIME_SCALE: f64 = 50.0;
/// Most zoomed-in scale
pub const MAX_TIME_SCALE: f64 = 300.0;
/// Scale change per zoom step
pub const ZOOM_STEP: f64 = 25.0;

/// A tick on the time ruler
#[derive(Debug, Clone, PartialEq)]
pub struct RulerMark {
    /// Time position
    pub time: f64,
    /// X position in pixels
    pub x: f64,
    /// Label, only on whole seconds
    pub label: Option<String>,
}

/// Maps between timeline pixels and seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineView {
    time_scale: f64,
}

impl TimelineView {
    /// Create a view with the given scale, clamped to the zoom range
    pub fn new(time_scale: f64) -> Self {
        let time_scale = if time_scale.is_finite() {
            time_scale.clamp(MIN_TIME_SCALE, MAX_TIME_SCALE)
        } else {
            DEFAULT_TIME_SCALE
        };
        Self { time_scale }
    }

    /// Pixels per second
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Convert time to x position
    pub fn time_to_x(&self, time: f64) -> f64 {
        time * self.time_scale
    }

    /// Convert x position to time
    pub fn x_to_time(&self, x: f64) -> f64 {
        x / self.time_scale
    }

    /// Total track width for a duration
    pub fn width(&self, duration: f64) -> f64 {
        self.time_to_x(duration)
    }

    /// Zoom in one step. Returns false at the limit.
    pub fn zoom_in(&mut self) -> bool {
        if self.time_scale >= MAX_TIME_SCALE {
            return false;
        }
        self.time_scale = (self.time_scale + ZOOM_STEP).min(MAX_TIME_SCALE);
        true
    }

    /// Zoom out one step. Returns false at the limit.
    pub fn zoom_out(&mut self) -> bool {
        if self.time_scale <= MIN_TIME_SCALE {
            return false;
        }
        self.time_scale = (self.time_scale - ZOOM_STEP).max(MIN_TIME_SCALE);
        true
    }

    /// Seconds between ruler marks at the current zoom
    pub fn ruler_interval(&self) -> f64 {
        if self.time_scale <= 50.0 {
            5.0
        } else if self.time_scale <= 100.0 {
            1.0
        } else {
            0.5
        }
    }

    /// Ruler marks from 0 to `duration` inclusive
    pub fn ruler_marks(&self, duration: f64) -> Vec<RulerMark> {
        let interval = self.ruler_interval();
        let count = (duration / interval).floor() as usize;
        (0..=count)
            .map(|i| {
                let time = i as f64 * interval;
                let label = ((time - time.round()).abs() < 0.01).then(|| format!("{}s", time.round()));
                RulerMark {
                    time,
                    x: self.time_to_x(time),
                    label,
                }
            })
            .collect()
    }
}

impl Default for TimelineView {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_SCALE)
    }
}

/// Format a time for display, e.g. `3.5s`
pub fn format_time(time: f64) -> String {
    format!("{time:.1}s")
}
