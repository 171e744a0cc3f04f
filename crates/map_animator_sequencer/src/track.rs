// SPDX-License-Identifier: MIT OR Apache-2.0
//! Camera keyframe track.
//!
//! Holds the sparse set of camera samples and turns it into a camera pose for
//! any time. Between two samples the pose follows an ease-in-out cubic curve;
//! on a sample, or with a single sample, the stored pose is used as is.

use crate::error::{Result, TimelineError};
use crate::gate::ChangeGate;
use crate::keyframe::{
    CameraPose, Interpolation, Keyframe, KeyframeId, DEDUP_TOLERANCE, SNAP_TOLERANCE,
};
use crate::surface::{MapSurface, PoseTransition};

/// Camera fly duration used while playing
pub const DEFAULT_TRANSITION_SECS: f64 = 0.25;

/// What [`KeyframeTrack::capture`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// A new keyframe was inserted
    Inserted(KeyframeId),
    /// An existing keyframe near the capture time was overwritten
    Updated(KeyframeId),
}

impl CaptureOutcome {
    /// ID of the affected keyframe
    pub fn id(&self) -> KeyframeId {
        match self {
            Self::Inserted(id) | Self::Updated(id) => *id,
        }
    }
}

fn check_pose(pose: &CameraPose) -> Result<()> {
    if pose.is_finite() {
        Ok(())
    } else {
        Err(TimelineError::InvalidPose {
            lat: pose.center.lat,
            lng: pose.center.lng,
            zoom: pose.zoom,
        })
    }
}

/// Camera keyframes plus the memo of the last pose pushed to the map
#[derive(Debug, Clone)]
pub struct KeyframeTrack {
    keyframes: Vec<Keyframe>,
    gate: ChangeGate,
    transition_secs: f64,
}

impl KeyframeTrack {
    /// Create an empty track
    pub fn new() -> Self {
        Self {
            keyframes: Vec::new(),
            gate: ChangeGate::new(),
            transition_secs: DEFAULT_TRANSITION_SECS,
        }
    }

    /// Set the fly duration used while playing
    pub fn with_transition_secs(mut self, secs: f64) -> Self {
        self.transition_secs = secs.max(0.0);
        self
    }

    /// Record `pose` at `time`.
    ///
    /// A keyframe already within [`DEDUP_TOLERANCE`] of `time` is overwritten
    /// (time and pose) instead of adding a near-duplicate.
    pub fn capture(&mut self, time: f64, pose: CameraPose) -> Result<CaptureOutcome> {
        self.place(Keyframe::new(time, pose))
    }

    /// Insert a prepared keyframe, keeping the set sorted.
    ///
    /// Follows the same dedup rule as [`KeyframeTrack::capture`]: a keyframe
    /// within [`DEDUP_TOLERANCE`] is overwritten and keeps its ID.
    pub fn insert(&mut self, keyframe: Keyframe) -> Result<CaptureOutcome> {
        self.place(keyframe)
    }

    fn place(&mut self, keyframe: Keyframe) -> Result<CaptureOutcome> {
        check_pose(&keyframe.pose)?;
        let time = keyframe.time.max(0.0);
        let pose = keyframe.pose;
        let id = keyframe.id;

        let outcome = if let Some(index) = self.keyframe_near(time, DEDUP_TOLERANCE) {
            let existing = &mut self.keyframes[index];
            existing.time = time;
            existing.pose = pose;
            CaptureOutcome::Updated(existing.id)
        } else {
            self.keyframes.push(Keyframe { id, time, pose });
            CaptureOutcome::Inserted(id)
        };
        self.sort_keyframes();

        tracing::debug!(
            "Keyframe {:?} at {time:.2}s: ({:.4}, {:.4}) zoom {:.2}",
            outcome,
            pose.center.lat,
            pose.center.lng,
            pose.zoom
        );
        Ok(outcome)
    }

    /// Move a keyframe to `time`, clamped to `[0, duration]`.
    ///
    /// The keyframe keeps its position in the list so a drag in progress stays
    /// visually stable; call [`KeyframeTrack::finish_retime`] when the drag ends.
    /// Returns the clamped time.
    pub fn retime(&mut self, index: usize, time: f64, duration: f64) -> Result<f64> {
        let keyframe = self
            .keyframes
            .get_mut(index)
            .ok_or(TimelineError::KeyframeNotFound(index))?;
        if !time.is_nan() {
            keyframe.time = time.clamp(0.0, duration);
        }
        Ok(keyframe.time)
    }

    /// Restore time order after retiming
    pub fn finish_retime(&mut self) {
        self.sort_keyframes();
    }

    /// Delete a keyframe
    pub fn remove(&mut self, index: usize) -> Result<Keyframe> {
        if index >= self.keyframes.len() {
            return Err(TimelineError::KeyframeNotFound(index));
        }
        Ok(self.keyframes.remove(index))
    }

    fn sort_keyframes(&mut self) {
        self.keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    /// Whether keyframes are in time order
    pub fn is_sorted(&self) -> bool {
        self.keyframes.windows(2).all(|w| w[0].time <= w[1].time)
    }

    /// All keyframes in list order
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Keyframe by index
    pub fn get(&self, index: usize) -> Option<&Keyframe> {
        self.keyframes.get(index)
    }

    /// Index of a keyframe by ID
    pub fn index_of(&self, id: KeyframeId) -> Option<usize> {
        self.keyframes.iter().position(|k| k.id == id)
    }

    /// Index of the first keyframe strictly within `tolerance` of `time`
    pub fn keyframe_near(&self, time: f64, tolerance: f64) -> Option<usize> {
        self.keyframes.iter().position(|k| k.is_near(time, tolerance))
    }

    /// Keyframe count
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// No keyframes
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Keyframes bracketing `time`: latest at or before it, earliest after it.
    ///
    /// Chosen by time rather than list order, so the answer is right while a
    /// retime drag has the list out of order.
    fn bracket(&self, time: f64) -> Option<(&Keyframe, &Keyframe)> {
        let earliest = self.keyframes.iter().min_by(|a, b| a.time.total_cmp(&b.time))?;
        let latest = self.keyframes.iter().max_by(|a, b| a.time.total_cmp(&b.time))?;

        let prev = self
            .keyframes
            .iter()
            .filter(|k| k.time <= time)
            .max_by(|a, b| a.time.total_cmp(&b.time))
            .unwrap_or(earliest);
        let next = self
            .keyframes
            .iter()
            .filter(|k| k.time > time)
            .min_by(|a, b| a.time.total_cmp(&b.time))
            .unwrap_or(latest);

        Some((prev, next))
    }

    /// Camera pose at `time`, or `None` without keyframes.
    ///
    /// Pure: depends only on the keyframe set and `time`.
    pub fn resolve(&self, time: f64) -> Option<CameraPose> {
        let first = self.keyframes.first()?;
        if self.keyframes.len() == 1 {
            return Some(first.pose);
        }

        // Sitting on a sample: use it exactly, no easing
        if let Some(exact) = self.keyframes.iter().find(|k| k.is_near(time, SNAP_TOLERANCE)) {
            return Some(exact.pose);
        }

        let (prev, next) = self.bracket(time)?;
        if std::ptr::eq(prev, next) {
            return Some(prev.pose);
        }

        let raw = (time - prev.time) / (next.time - prev.time);
        let progress = Interpolation::ease_in_out_cubic(raw);
        Some(prev.pose.lerp(&next.pose, progress))
    }

    /// Resolve `time` and push the pose to the surface if it moved enough.
    ///
    /// While playing the camera flies over the transition duration; otherwise
    /// it jumps, since a fly would trail behind a scrub gesture. Returns
    /// whether the surface was updated.
    pub fn apply(&mut self, time: f64, playing: bool, surface: &mut impl MapSurface) -> bool {
        let Some(pose) = self.resolve(time) else {
            return false;
        };

        if !pose.is_finite() {
            tracing::warn!("Skipping invalid camera pose at {time}: {pose:?}");
            return false;
        }

        if !self.gate.should_apply(&pose) {
            return false;
        }

        let transition = if playing {
            PoseTransition::Animated {
                duration_secs: self.transition_secs,
            }
        } else {
            PoseTransition::Instant
        };
        surface.set_pose(pose, transition);
        self.gate.record(pose);
        true
    }

    /// Jump straight to a keyframe's pose and remember it as applied
    pub fn apply_keyframe(&mut self, index: usize, surface: &mut impl MapSurface) -> Result<()> {
        let pose = self
            .keyframes
            .get(index)
            .ok_or(TimelineError::KeyframeNotFound(index))?
            .pose;
        surface.set_pose(pose, PoseTransition::Instant);
        self.gate.record(pose);
        Ok(())
    }

    /// Forget the last applied pose
    pub fn reset_gate(&mut self) {
        self.gate.reset();
    }

    /// Last pose pushed to the surface, if known
    pub fn last_applied(&self) -> Option<&CameraPose> {
        self.gate.last()
    }
}

impl Default for KeyframeTrack {
    fn default() -> Self {
        Self::new()
    }
}
