//! Hold-to-record drag gesture
//!
//! A horizontal drag past the cancel threshold arms "release to cancel"; a
//! vertical (upward) drag past the lock threshold switches to hands-free
//! recording. Once locked, horizontal movement is ignored for the rest of the
//! recording.

use serde::{Deserialize, Serialize};

/// Drag distances that arm cancel and lock
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureThresholds {
    pub cancel_threshold: f32,
    pub lock_threshold: f32,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            cancel_threshold: 100.0,
            lock_threshold: 80.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// What the caller should do in response to the current drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureSignal {
    None,
    Cancel,
    Lock,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureState {
    pub initial: Point,
    pub current: Point,
    pub cancel_threshold: f32,
    pub lock_threshold: f32,
    pub is_long_pressing: bool,
    pub is_locked: bool,
    pub is_cancelling: bool,
}

impl Default for GestureState {
    fn default() -> Self {
        Self::with_thresholds(GestureThresholds::default())
    }
}

impl GestureState {
    pub fn with_thresholds(thresholds: GestureThresholds) -> Self {
        Self {
            initial: Point::default(),
            current: Point::default(),
            cancel_threshold: thresholds.cancel_threshold,
            lock_threshold: thresholds.lock_threshold,
            is_long_pressing: false,
            is_locked: false,
            is_cancelling: false,
        }
    }

    /// Start tracking a press at `(x, y)`
    pub fn begin(x: f32, y: f32, thresholds: GestureThresholds) -> Self {
        let origin = Point::new(x, y);
        Self {
            initial: origin,
            current: origin,
            is_long_pressing: true,
            ..Self::with_thresholds(thresholds)
        }
    }

    /// Follow the pointer to `(x, y)`
    pub fn moved_to(self, x: f32, y: f32) -> Self {
        let mut next = Self {
            current: Point::new(x, y),
            ..self
        };
        next.is_cancelling = !next.is_locked && next.should_cancel();
        next
    }

    /// Enter hands-free mode; there is no way back within a recording
    pub fn lock(self) -> Self {
        Self {
            is_locked: true,
            is_cancelling: false,
            ..self
        }
    }

    /// Finish the gesture, keeping only the thresholds
    pub fn end(self) -> Self {
        Self::with_thresholds(self.thresholds())
    }

    pub fn thresholds(&self) -> GestureThresholds {
        GestureThresholds {
            cancel_threshold: self.cancel_threshold,
            lock_threshold: self.lock_threshold,
        }
    }

    pub fn horizontal_distance(&self) -> f32 {
        (self.current.x - self.initial.x).abs()
    }

    /// Upward travel; a downward drag also counts as distance
    pub fn vertical_distance(&self) -> f32 {
        (self.initial.y - self.current.y).abs()
    }

    pub fn should_cancel(&self) -> bool {
        self.horizontal_distance() > self.cancel_threshold
    }

    pub fn should_lock(&self) -> bool {
        self.vertical_distance() > self.lock_threshold
    }

    pub fn cancel_progress(&self) -> f32 {
        if self.cancel_threshold <= 0.0 {
            return if self.horizontal_distance() > 0.0 { 1.0 } else { 0.0 };
        }
        (self.horizontal_distance() / self.cancel_threshold).clamp(0.0, 1.0)
    }

    /// Derive the caller's next action; lock wins, cancel is moot once locked
    pub fn signal(&self) -> GestureSignal {
        if self.is_locked {
            return GestureSignal::None;
        }
        if self.should_lock() {
            GestureSignal::Lock
        } else if self.should_cancel() {
            GestureSignal::Cancel
        } else {
            GestureSignal::None
        }
    }
}
