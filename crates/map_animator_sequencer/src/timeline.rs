// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline: the single owner of playback, tracks and the map surface.
//!
//! Every mutation goes through [`Timeline`]. Operations queue events; before
//! an operation returns the queue is dispatched in a fixed order:
//! 1. Camera keyframe track
//! 2. Layer track
//! 3. Subscribed observers

use crate::clock::{PlaybackState, TickOutcome, TimelineClock};
use crate::config::TimelineConfig;
use crate::drag::{DragOperation, WindowDragMode};
use crate::error::{Result, TimelineError};
use crate::events::{EventQueue, TimelineEvent, TimelineObserver};
use crate::keyframe::{CameraPose, Keyframe, KeyframeId};
use crate::layer::{
    AnimatedLayer, AnimationWindow, LayerContent, LayerId, LayerKind, LayerStyle, LayerTrack,
};
use crate::surface::MapSurface;
use crate::track::{CaptureOutcome, KeyframeTrack};
use crate::view::TimelineView;
use std::time::Instant;

/// Log a rejected edit and pass the result through
fn logged<T>(result: Result<T>) -> Result<T> {
    result.inspect_err(|e| tracing::warn!("Rejected timeline edit: {e}"))
}

/// A map animation timeline driving a [`MapSurface`]
pub struct Timeline<S: MapSurface> {
    clock: TimelineClock,
    keyframes: KeyframeTrack,
    layers: LayerTrack,
    surface: S,
    view: TimelineView,
    drag: DragOperation,
    pending: EventQueue,
    observers: Vec<Box<dyn TimelineObserver>>,
}

impl<S: MapSurface> Timeline<S> {
    /// Create a timeline of `duration` seconds with default settings
    pub fn new(duration: f64, surface: S) -> Result<Self> {
        let config = TimelineConfig {
            duration_secs: duration,
            ..TimelineConfig::default()
        };
        Self::from_config(&config, surface)
    }

    /// Create a timeline from loaded settings
    pub fn from_config(config: &TimelineConfig, surface: S) -> Result<Self> {
        Ok(Self {
            clock: TimelineClock::new(config.duration_secs)?.with_tick_rate(config.tick_rate_hz),
            keyframes: KeyframeTrack::new().with_transition_secs(config.playback_transition_secs),
            layers: LayerTrack::new().with_default_window(config.default_window),
            surface,
            view: TimelineView::new(config.time_scale),
            drag: DragOperation::Idle,
            pending: EventQueue::new(),
            observers: Vec::new(),
        })
    }

    /// Register an observer; it sees every event after the tracks have
    pub fn subscribe(&mut self, observer: impl TimelineObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    // --- Queries ---

    /// Playback clock
    pub fn clock(&self) -> &TimelineClock {
        &self.clock
    }

    /// Camera keyframes
    pub fn keyframes(&self) -> &KeyframeTrack {
        &self.keyframes
    }

    /// Animated layers
    pub fn layers(&self) -> &LayerTrack {
        &self.layers
    }

    /// Map surface
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Map surface, for user camera moves outside the timeline
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// View geometry
    pub fn view(&self) -> &TimelineView {
        &self.view
    }

    /// View geometry, for zooming the ruler
    pub fn view_mut(&mut self) -> &mut TimelineView {
        &mut self.view
    }

    /// Active drag gesture
    pub fn drag(&self) -> &DragOperation {
        &self.drag
    }

    /// Current time in seconds
    pub fn current_time(&self) -> f64 {
        self.clock.current_time()
    }

    /// Timeline length in seconds
    pub fn duration(&self) -> f64 {
        self.clock.duration()
    }

    /// Whether playback is running
    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    /// Playback state
    pub fn state(&self) -> PlaybackState {
        self.clock.state()
    }

    // --- Playback ---

    /// Move the playhead. Returns the clamped time.
    pub fn seek(&mut self, time: f64) -> f64 {
        let time = self.clock.seek(time);
        self.dispatch();
        time
    }

    /// Start playback, rewinding first when parked at the end
    pub fn play(&mut self, now: Instant) -> bool {
        let started = self.clock.play(now);
        self.dispatch();
        started
    }

    /// Stop playback
    pub fn stop(&mut self) -> bool {
        let stopped = self.clock.stop();
        self.dispatch();
        stopped
    }

    /// Play if stopped, stop if playing
    pub fn toggle_play(&mut self, now: Instant) {
        self.clock.toggle_play(now);
        self.dispatch();
    }

    /// Advance playback to `now`
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let outcome = self.clock.tick(now);
        self.dispatch();
        outcome
    }

    /// Forget the last applied camera pose so the next resolve is pushed
    pub fn reset_camera_gate(&mut self) {
        self.keyframes.reset_gate();
    }

    // --- Keyframes ---

    /// Record the surface's current camera at the current time
    pub fn capture_keyframe(&mut self) -> Result<CaptureOutcome> {
        let time = self.clock.current_time();
        let pose = self.surface.pose();
        let outcome = logged(self.keyframes.capture(time, pose))?;
        // The camera was moved outside the timeline
        self.keyframes.reset_gate();
        self.pending.emit(TimelineEvent::KeyframesChanged);
        self.dispatch();
        Ok(outcome)
    }

    /// Add a keyframe at an explicit time and pose.
    /// A keyframe within the capture tolerance is overwritten instead.
    pub fn insert_keyframe(&mut self, time: f64, pose: CameraPose) -> Result<KeyframeId> {
        let time = time.max(0.0).min(self.duration());
        let outcome = logged(self.keyframes.insert(Keyframe::new(time, pose)))?;
        self.pending.emit(TimelineEvent::KeyframesChanged);
        self.dispatch();
        Ok(outcome.id())
    }

    /// Retime a keyframe and restore time order. Returns the clamped time.
    pub fn retime_keyframe(&mut self, index: usize, time: f64) -> Result<f64> {
        let duration = self.duration();
        let time = logged(self.keyframes.retime(index, time, duration))?;
        self.keyframes.finish_retime();
        self.pending.emit(TimelineEvent::KeyframesChanged);
        self.dispatch();
        Ok(time)
    }

    /// Delete a keyframe
    pub fn remove_keyframe(&mut self, index: usize) -> Result<Keyframe> {
        let removed = logged(self.keyframes.remove(index))?;
        tracing::debug!("Removed keyframe at {:.2}s", removed.time);
        self.pending.emit(TimelineEvent::KeyframesChanged);
        self.dispatch();
        Ok(removed)
    }

    /// Jump the playhead and camera to a keyframe
    pub fn select_keyframe(&mut self, index: usize) -> Result<()> {
        let time = self
            .keyframes
            .get(index)
            .ok_or(TimelineError::KeyframeNotFound(index))
            .map(|keyframe| keyframe.time);
        let time = logged(time)?;
        self.keyframes.apply_keyframe(index, &mut self.surface)?;
        self.clock.seek(time);
        self.dispatch();
        Ok(())
    }

    // --- Layers ---

    /// Add a layer with the default window; `style` overrides the kind default
    pub fn add_layer(&mut self, kind: LayerKind, style: Option<LayerStyle>) -> LayerId {
        let id = self.layers.add(kind, style);
        self.mount_layer(id)
    }

    /// Add a fully built layer
    pub fn insert_layer(&mut self, layer: AnimatedLayer) -> LayerId {
        let id = self.layers.insert(layer);
        self.mount_layer(id)
    }

    fn mount_layer(&mut self, id: LayerId) -> LayerId {
        if let Some(layer) = self.layers.get(id) {
            self.surface.add_layer(layer);
        }
        self.pending.emit(TimelineEvent::LayerAdded(id));
        self.dispatch();
        id
    }

    /// Remove a layer from the timeline and the map
    pub fn remove_layer(&mut self, id: LayerId) -> Result<AnimatedLayer> {
        let layer = logged(self.layers.remove(id))?;
        self.surface.remove_layer(id);
        if matches!(self.drag, DragOperation::LayerWindow { id: dragged, .. } if dragged == id) {
            self.drag = DragOperation::Idle;
        }
        self.pending.emit(TimelineEvent::LayerRemoved(id));
        self.dispatch();
        Ok(layer)
    }

    /// Replace a layer's style
    pub fn update_layer_style(&mut self, id: LayerId, style: LayerStyle) -> Result<()> {
        logged(self.layers.update_style(id, style))?;
        self.redraw_layer(id);
        Ok(())
    }

    /// Edit a layer's content
    pub fn update_layer_content(&mut self, id: LayerId, content: LayerContent) -> Result<()> {
        logged(self.layers.update_content(id, content))?;
        self.redraw_layer(id);
        Ok(())
    }

    fn redraw_layer(&mut self, id: LayerId) {
        if let Some(layer) = self.layers.get(id) {
            self.surface.update_layer(layer);
        }
        self.pending.emit(TimelineEvent::LayerUpdated(id));
        self.dispatch();
    }

    /// Replace a layer's window and re-resolve it at the current time.
    /// Returns the corrected window.
    pub fn update_layer_window(&mut self, id: LayerId, window: AnimationWindow) -> Result<AnimationWindow> {
        let window = logged(self.layers.update_window(id, window))?;
        self.pending.emit(TimelineEvent::LayerWindowChanged(id));
        self.dispatch();
        Ok(window)
    }

    // --- Drag gestures ---

    /// Grab the playhead at pointer `x`. Stops playback.
    pub fn begin_playhead_drag(&mut self, x: f64) {
        self.commit_drag();
        self.clock.stop();
        self.clock.seek(self.view.x_to_time(x));
        self.drag = DragOperation::Playhead;
        self.dispatch();
    }

    /// Grab keyframe `index` at pointer `x`
    pub fn begin_keyframe_drag(&mut self, index: usize, x: f64) -> Result<()> {
        self.commit_drag();
        let keyframe = logged(
            self.keyframes
                .get(index)
                .ok_or(TimelineError::KeyframeNotFound(index)),
        )?;
        self.drag = DragOperation::Keyframe {
            id: keyframe.id,
            origin_time: keyframe.time,
            pointer_origin: x,
        };
        Ok(())
    }

    /// Grab a layer's window bar `grab_offset_px` from its left edge, pointer at `x`
    pub fn begin_layer_drag(&mut self, id: LayerId, grab_offset_px: f64, x: f64) -> Result<()> {
        self.commit_drag();
        let layer = logged(self.layers.get(id).ok_or(TimelineError::LayerNotFound(id)))?;
        let origin = layer.window;
        let width_px = self.view.time_to_x(origin.length());
        self.drag = DragOperation::LayerWindow {
            id,
            mode: WindowDragMode::from_grab(grab_offset_px, width_px),
            origin,
            pointer_origin: x,
        };
        Ok(())
    }

    /// Move the active gesture to pointer `x`. Returns false when idle.
    pub fn drag_to(&mut self, x: f64) -> bool {
        match self.drag.clone() {
            DragOperation::Idle => return false,
            DragOperation::Playhead => {
                self.clock.seek(self.view.x_to_time(x));
            }
            DragOperation::Keyframe {
                id,
                origin_time,
                pointer_origin,
            } => {
                let Some(index) = self.keyframes.index_of(id) else {
                    tracing::warn!("Dragged keyframe no longer exists");
                    self.drag = DragOperation::Idle;
                    return false;
                };
                let time = origin_time + self.view.x_to_time(x - pointer_origin);
                let duration = self.duration();
                if self.keyframes.retime(index, time, duration).is_err() {
                    self.drag = DragOperation::Idle;
                    return false;
                }
                self.pending.emit(TimelineEvent::KeyframesChanged);
            }
            DragOperation::LayerWindow {
                id,
                mode,
                origin,
                pointer_origin,
            } => {
                let window = mode.apply(origin, self.view.x_to_time(x - pointer_origin));
                if let Err(e) = self.layers.update_window(id, window) {
                    tracing::warn!("Dropping window drag: {e}");
                    self.drag = DragOperation::Idle;
                    return false;
                }
                self.pending.emit(TimelineEvent::LayerWindowChanged(id));
            }
        }
        self.dispatch();
        true
    }

    /// End the active gesture, keeping its result
    pub fn commit_drag(&mut self) {
        if let DragOperation::Keyframe { .. } = std::mem::take(&mut self.drag) {
            self.keyframes.finish_retime();
            self.pending.emit(TimelineEvent::KeyframesChanged);
            self.dispatch();
        }
    }

    /// End the active gesture, restoring what it moved
    pub fn cancel_drag(&mut self) {
        match std::mem::take(&mut self.drag) {
            DragOperation::Idle | DragOperation::Playhead => {}
            DragOperation::Keyframe { id, origin_time, .. } => {
                if let Some(index) = self.keyframes.index_of(id) {
                    let duration = self.duration();
                    let _ = self.keyframes.retime(index, origin_time, duration);
                    self.keyframes.finish_retime();
                    self.pending.emit(TimelineEvent::KeyframesChanged);
                }
            }
            DragOperation::LayerWindow { id, origin, .. } => {
                if self.layers.update_window(id, origin).is_ok() {
                    self.pending.emit(TimelineEvent::LayerWindowChanged(id));
                }
            }
        }
        self.dispatch();
    }

    // --- Dispatch ---

    fn dispatch(&mut self) {
        for event in self.clock.drain_events() {
            self.pending.emit(event);
        }

        for event in self.pending.drain() {
            match event {
                TimelineEvent::TimeChanged { time, playing } => {
                    self.keyframes.apply(time, playing, &mut self.surface);
                    self.layers.apply(time, &mut self.surface);
                }
                TimelineEvent::PlaybackStarted | TimelineEvent::PlaybackStopped => {
                    self.keyframes.reset_gate();
                }
                TimelineEvent::LayerAdded(id) | TimelineEvent::LayerWindowChanged(id) => {
                    let time = self.clock.current_time();
                    // Absent only if removed in the same batch
                    let _ = self.layers.apply_one(id, time, &mut self.surface);
                }
                TimelineEvent::KeyframesChanged
                | TimelineEvent::LayerRemoved(_)
                | TimelineEvent::LayerUpdated(_) => {}
            }

            for observer in &mut self.observers {
                observer.on_event(&event);
            }
        }
    }
}

impl<S: MapSurface + std::fmt::Debug> std::fmt::Debug for Timeline<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("clock", &self.clock)
            .field("keyframes", &self.keyframes)
            .field("layers", &self.layers)
            .field("surface", &self.surface)
            .field("view", &self.view)
            .field("drag", &self.drag)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyframe::LatLng;
    use crate::layer::{TextStyle, DEFAULT_WINDOW};
    use crate::surface::{HeadlessSurface, PoseTransition};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    fn pose(lat: f64, lng: f64, zoom: f64) -> CameraPose {
        CameraPose::new(lat, lng, zoom)
    }

    fn timeline() -> Timeline<HeadlessSurface> {
        Timeline::new(10.0, HeadlessSurface::new()).unwrap()
    }

    fn recorded(timeline: &mut Timeline<HeadlessSurface>) -> Rc<RefCell<Vec<TimelineEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        timeline.subscribe(move |event: &TimelineEvent| sink.borrow_mut().push(*event));
        events
    }

    fn capture_at(timeline: &mut Timeline<HeadlessSurface>, time: f64, camera: CameraPose) {
        timeline.seek(time);
        timeline.surface_mut().pan_to(camera);
        timeline.capture_keyframe().unwrap();
    }

    fn text_layer() -> LayerKind {
        LayerKind::Text {
            position: LatLng::new(0.0, 0.0),
            content: "Paris".to_string(),
            text_style: TextStyle::default(),
        }
    }

    #[test]
    fn test_invalid_duration() {
        assert!(matches!(
            Timeline::new(0.0, HeadlessSurface::new()),
            Err(TimelineError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_seek_clamps_and_notifies() {
        let mut timeline = timeline();
        let events = recorded(&mut timeline);

        assert_eq!(timeline.seek(12.0), 10.0);
        assert_eq!(timeline.seek(-1.0), 0.0);
        timeline.seek(f64::NAN);

        assert_eq!(
            *events.borrow(),
            vec![
                TimelineEvent::TimeChanged { time: 10.0, playing: false },
                TimelineEvent::TimeChanged { time: 0.0, playing: false },
            ]
        );
    }

    #[test]
    fn test_scrub_interpolates_camera() {
        let mut timeline = timeline();
        capture_at(&mut timeline, 0.0, pose(0.0, 0.0, 4.0));
        capture_at(&mut timeline, 4.0, pose(10.0, 20.0, 8.0));
        timeline.surface_mut().clear_pose_log();

        timeline.seek(2.0);
        let camera = timeline.surface().pose();
        assert!((camera.center.lat - 5.0).abs() < 1e-9);
        assert!((camera.center.lng - 10.0).abs() < 1e-9);
        assert!((camera.zoom - 6.0).abs() < 1e-9);
        assert_eq!(timeline.surface().pose_log()[0].1, PoseTransition::Instant);
    }

    #[test]
    fn test_unchanged_pose_is_not_reapplied() {
        let mut timeline = timeline();
        capture_at(&mut timeline, 0.0, pose(0.0, 0.0, 4.0));
        capture_at(&mut timeline, 4.0, pose(10.0, 20.0, 8.0));
        timeline.seek(2.0);
        timeline.surface_mut().clear_pose_log();

        timeline.seek(2.0);
        assert!(timeline.surface().pose_log().is_empty());
    }

    #[test]
    fn test_play_to_end() {
        let mut timeline = Timeline::new(1.0, HeadlessSurface::new()).unwrap();
        capture_at(&mut timeline, 0.0, pose(0.0, 0.0, 4.0));
        capture_at(&mut timeline, 1.0, pose(10.0, 20.0, 8.0));
        let events = recorded(&mut timeline);

        let start = Instant::now();
        assert!(timeline.play(start));
        assert_eq!(timeline.current_time(), 0.0);

        let mut now = start;
        let mut outcome = TickOutcome::Idle;
        for _ in 0..100 {
            now += Duration::from_millis(50);
            outcome = timeline.tick(now);
            if outcome == TickOutcome::Finished {
                break;
            }
        }

        assert_eq!(outcome, TickOutcome::Finished);
        assert!(!timeline.is_playing());
        assert_eq!(timeline.current_time(), 1.0);
        assert_eq!(timeline.surface().pose(), pose(10.0, 20.0, 8.0));

        let events = events.borrow();
        assert_eq!(events[0], TimelineEvent::TimeChanged { time: 0.0, playing: false });
        assert_eq!(events[1], TimelineEvent::PlaybackStarted);
        assert_eq!(
            events.iter().filter(|e| **e == TimelineEvent::PlaybackStopped).count(),
            1
        );
        assert_eq!(events.last(), Some(&TimelineEvent::PlaybackStopped));
    }

    #[test]
    fn test_playing_uses_animated_transition() {
        let mut timeline = timeline();
        capture_at(&mut timeline, 0.0, pose(0.0, 0.0, 4.0));
        capture_at(&mut timeline, 4.0, pose(10.0, 20.0, 8.0));
        timeline.seek(0.0);
        timeline.surface_mut().clear_pose_log();

        let start = Instant::now();
        timeline.play(start);
        timeline.tick(start + Duration::from_millis(500));

        let log = timeline.surface().pose_log();
        assert!(!log.is_empty());
        assert!(matches!(
            log.last().map(|(_, t)| *t),
            Some(PoseTransition::Animated { .. })
        ));
    }

    #[test]
    fn test_play_reapplies_unchanged_pose() {
        let mut timeline = timeline();
        capture_at(&mut timeline, 0.0, pose(1.0, 1.0, 3.0));
        timeline.seek(2.0);
        assert_eq!(timeline.surface().pose_log().len(), 1);
        timeline.surface_mut().clear_pose_log();

        let start = Instant::now();
        timeline.play(start);
        timeline.tick(start + Duration::from_millis(100));

        let log = timeline.surface().pose_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].0, pose(1.0, 1.0, 3.0));
        assert!(matches!(log[0].1, PoseTransition::Animated { .. }));
    }

    #[test]
    fn test_stop_reapplies_unchanged_pose() {
        let mut timeline = timeline();
        capture_at(&mut timeline, 0.0, pose(1.0, 1.0, 3.0));
        let start = Instant::now();
        timeline.play(start);
        timeline.tick(start + Duration::from_millis(100));
        timeline.surface_mut().clear_pose_log();

        timeline.stop();
        let time = timeline.current_time();
        timeline.seek(time);

        let log = timeline.surface().pose_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0], (pose(1.0, 1.0, 3.0), PoseTransition::Instant));
    }

    #[test]
    fn test_insert_keyframe_dedups() {
        let mut timeline = timeline();
        let first = timeline.insert_keyframe(1.0, pose(1.0, 1.0, 3.0)).unwrap();
        let second = timeline.insert_keyframe(1.05, pose(2.0, 2.0, 5.0)).unwrap();

        assert_eq!(first, second);
        assert_eq!(timeline.keyframes().len(), 1);
        assert_eq!(timeline.keyframes().keyframes()[0].time, 1.05);
        assert_eq!(timeline.keyframes().keyframes()[0].pose, pose(2.0, 2.0, 5.0));
    }

    #[test]
    fn test_capture_dedups() {
        let mut timeline = timeline();
        capture_at(&mut timeline, 2.0, pose(1.0, 1.0, 3.0));
        timeline.seek(2.05);
        timeline.surface_mut().pan_to(pose(2.0, 2.0, 5.0));
        let outcome = timeline.capture_keyframe().unwrap();

        assert!(matches!(outcome, CaptureOutcome::Updated(_)));
        assert_eq!(timeline.keyframes().len(), 1);
        assert_eq!(timeline.keyframes().keyframes()[0].time, 2.05);
        assert_eq!(timeline.keyframes().keyframes()[0].pose, pose(2.0, 2.0, 5.0));
    }

    #[test]
    fn test_capture_rejects_invalid_camera() {
        let mut timeline = timeline();
        timeline.surface_mut().pan_to(pose(f64::NAN, 0.0, 3.0));
        assert!(matches!(
            timeline.capture_keyframe(),
            Err(TimelineError::InvalidPose { .. })
        ));
        assert!(timeline.keyframes().is_empty());
    }

    #[test]
    fn test_select_keyframe() {
        let mut timeline = timeline();
        capture_at(&mut timeline, 1.0, pose(1.0, 1.0, 3.0));
        capture_at(&mut timeline, 6.0, pose(6.0, 6.0, 6.0));
        timeline.surface_mut().pan_to(pose(50.0, 50.0, 1.0));

        timeline.select_keyframe(0).unwrap();
        assert_eq!(timeline.current_time(), 1.0);
        assert_eq!(timeline.surface().pose(), pose(1.0, 1.0, 3.0));
        assert!(matches!(
            timeline.select_keyframe(9),
            Err(TimelineError::KeyframeNotFound(9))
        ));
    }

    #[test]
    fn test_retime_and_remove_keyframe() {
        let mut timeline = timeline();
        capture_at(&mut timeline, 1.0, pose(1.0, 1.0, 3.0));
        capture_at(&mut timeline, 6.0, pose(6.0, 6.0, 6.0));

        assert_eq!(timeline.retime_keyframe(0, 8.0).unwrap(), 8.0);
        assert!(timeline.keyframes().is_sorted());
        assert_eq!(timeline.keyframes().keyframes()[1].time, 8.0);
        assert_eq!(timeline.retime_keyframe(0, 99.0).unwrap(), 10.0);

        let removed = timeline.remove_keyframe(0).unwrap();
        assert_eq!(removed.time, 8.0);
        assert_eq!(timeline.keyframes().len(), 1);
        assert!(timeline.remove_keyframe(5).is_err());
    }

    #[test]
    fn test_layer_lifecycle() {
        let mut timeline = timeline();
        let events = recorded(&mut timeline);
        timeline.seek(2.5);

        let id = timeline.add_layer(text_layer(), None);
        assert!(timeline.surface().has_layer(id));
        assert_eq!(timeline.layers().get(id).map(|l| l.window), Some(DEFAULT_WINDOW));
        assert_eq!(timeline.surface().layer_progress(id), Some(0.5));

        let window = timeline
            .update_layer_window(id, AnimationWindow::new(2.0, 3.0))
            .unwrap();
        assert_eq!(window, AnimationWindow::new(2.0, 3.0));
        assert_eq!(timeline.surface().layer_progress(id), Some(0.5));

        timeline
            .update_layer_content(id, LayerContent::Text("Lyon".to_string()))
            .unwrap();
        assert!(matches!(
            timeline.update_layer_content(id, LayerContent::Points(vec![])),
            Err(TimelineError::KindMismatch { .. })
        ));

        timeline.remove_layer(id).unwrap();
        assert!(!timeline.surface().has_layer(id));
        assert!(matches!(
            timeline.remove_layer(id),
            Err(TimelineError::LayerNotFound(_))
        ));

        let events = events.borrow();
        assert!(events.contains(&TimelineEvent::LayerAdded(id)));
        assert!(events.contains(&TimelineEvent::LayerWindowChanged(id)));
        assert!(events.contains(&TimelineEvent::LayerUpdated(id)));
        assert!(events.contains(&TimelineEvent::LayerRemoved(id)));
    }

    #[test]
    fn test_inverted_window_corrected() {
        let mut timeline = timeline();
        let id = timeline.add_layer(text_layer(), None);
        let window = timeline
            .update_layer_window(id, AnimationWindow { start: 4.0, end: 3.0 })
            .unwrap();
        assert_eq!(window.start, 4.0);
        assert!((window.end - 4.1).abs() < 1e-9);
    }

    #[test]
    fn test_inserted_empty_window_corrected() {
        let mut timeline = timeline();
        let id = timeline.insert_layer(AnimatedLayer::new(
            text_layer(),
            AnimationWindow { start: 3.0, end: 3.0 },
        ));
        assert!(timeline.layers().get(id).is_some_and(|l| l.window.end > 3.0));

        timeline.seek(3.0);
        assert_eq!(timeline.surface().layer_progress(id), Some(0.0));
        timeline.seek(5.0);
        assert_eq!(timeline.surface().layer_progress(id), Some(1.0));
    }

    #[test]
    fn test_empty_default_window_corrected() {
        let config = TimelineConfig {
            default_window: AnimationWindow { start: 2.0, end: 2.0 },
            ..TimelineConfig::default()
        };
        let mut timeline = Timeline::from_config(&config, HeadlessSurface::new()).unwrap();
        let id = timeline.add_layer(text_layer(), None);

        timeline.seek(2.0);
        assert_eq!(timeline.surface().layer_progress(id), Some(0.0));
    }

    #[test]
    fn test_layers_follow_time() {
        let mut timeline = timeline();
        let id = timeline.insert_layer(AnimatedLayer::new(
            LayerKind::Line { points: vec![] },
            AnimationWindow::new(2.0, 4.0),
        ));

        timeline.seek(1.0);
        assert_eq!(timeline.surface().layer_progress(id), Some(0.0));
        timeline.seek(3.0);
        assert_eq!(timeline.surface().layer_progress(id), Some(0.5));
        timeline.seek(9.0);
        assert_eq!(timeline.surface().layer_progress(id), Some(1.0));
    }

    #[test]
    fn test_dispatch_order() {
        let mut timeline = timeline();
        capture_at(&mut timeline, 0.0, pose(0.0, 0.0, 4.0));
        capture_at(&mut timeline, 4.0, pose(10.0, 20.0, 8.0));
        let id = timeline.insert_layer(AnimatedLayer::new(
            LayerKind::Line { points: vec![] },
            AnimationWindow::new(0.0, 4.0),
        ));

        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        // Observers run after both tracks have applied the new time
        timeline.subscribe(move |event: &TimelineEvent| {
            if let TimelineEvent::TimeChanged { time, .. } = event {
                *sink.borrow_mut() = Some(*time);
            }
        });
        timeline.seek(2.0);

        assert_eq!(*seen.borrow(), Some(2.0));
        assert_eq!(timeline.surface().layer_progress(id), Some(0.5));
        assert!((timeline.surface().pose().zoom - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_playhead_drag_stops_playback() {
        let mut timeline = timeline();
        timeline.play(Instant::now());

        timeline.begin_playhead_drag(250.0);
        assert!(!timeline.is_playing());
        assert_eq!(timeline.current_time(), 2.5);

        assert!(timeline.drag_to(400.0));
        assert_eq!(timeline.current_time(), 4.0);
        timeline.commit_drag();
        assert!(!timeline.drag().is_active());
        assert!(!timeline.drag_to(100.0));
    }

    #[test]
    fn test_keyframe_drag_commit_and_cancel() {
        let mut timeline = timeline();
        capture_at(&mut timeline, 1.0, pose(1.0, 1.0, 3.0));
        capture_at(&mut timeline, 3.0, pose(3.0, 3.0, 3.0));

        // Drag the first keyframe past the second: order is fixed on commit
        timeline.begin_keyframe_drag(0, 100.0).unwrap();
        timeline.drag_to(500.0);
        assert_eq!(timeline.keyframes().keyframes()[0].time, 5.0);
        assert!(!timeline.keyframes().is_sorted());
        timeline.commit_drag();
        assert!(timeline.keyframes().is_sorted());
        assert_eq!(timeline.keyframes().keyframes()[1].time, 5.0);

        timeline.begin_keyframe_drag(1, 500.0).unwrap();
        timeline.drag_to(-1000.0);
        assert_eq!(timeline.keyframes().keyframes()[1].time, 0.0);
        timeline.cancel_drag();
        assert_eq!(timeline.keyframes().keyframes()[1].time, 5.0);
    }

    #[test]
    fn test_layer_window_drag() {
        let mut timeline = timeline();
        let id = timeline.insert_layer(AnimatedLayer::new(
            text_layer(),
            AnimationWindow::new(2.0, 4.0),
        ));

        // Grab the middle of the 200px bar and move right by one second
        timeline.begin_layer_drag(id, 100.0, 300.0).unwrap();
        timeline.drag_to(400.0);
        assert_eq!(
            timeline.layers().get(id).map(|l| l.window),
            Some(AnimationWindow::new(3.0, 5.0))
        );
        timeline.commit_drag();

        // Grab the right edge and shrink
        timeline.begin_layer_drag(id, 195.0, 500.0).unwrap();
        timeline.drag_to(450.0);
        assert_eq!(
            timeline.layers().get(id).map(|l| l.window),
            Some(AnimationWindow::new(3.0, 4.5))
        );
        timeline.cancel_drag();
        assert_eq!(
            timeline.layers().get(id).map(|l| l.window),
            Some(AnimationWindow::new(3.0, 5.0))
        );
    }

    #[test]
    fn test_drag_on_removed_layer_ends_gesture() {
        let mut timeline = timeline();
        let id = timeline.add_layer(text_layer(), None);
        timeline.begin_layer_drag(id, 100.0, 0.0).unwrap();
        timeline.remove_layer(id).unwrap();
        assert!(!timeline.drag().is_active());
        assert!(!timeline.drag_to(50.0));
    }

    #[test]
    fn test_new_drag_commits_previous() {
        let mut timeline = timeline();
        capture_at(&mut timeline, 1.0, pose(1.0, 1.0, 3.0));
        capture_at(&mut timeline, 3.0, pose(3.0, 3.0, 3.0));

        timeline.begin_keyframe_drag(0, 100.0).unwrap();
        timeline.drag_to(500.0);
        timeline.begin_playhead_drag(0.0);
        assert!(timeline.keyframes().is_sorted());
        assert_eq!(*timeline.drag(), DragOperation::Playhead);
    }

    #[test]
    fn test_from_config() {
        let config = TimelineConfig {
            duration_secs: 30.0,
            time_scale: 200.0,
            default_window: AnimationWindow::new(1.0, 2.0),
            ..TimelineConfig::default()
        };
        let mut timeline = Timeline::from_config(&config, HeadlessSurface::new()).unwrap();
        assert_eq!(timeline.duration(), 30.0);
        assert_eq!(timeline.view().time_scale(), 200.0);
        let id = timeline.add_layer(text_layer(), None);
        assert_eq!(
            timeline.layers().get(id).map(|l| l.window),
            Some(AnimationWindow::new(1.0, 2.0))
        );
    }
}
