//! Virtual playback cursor
//!
//! Position is advanced by fixed increments rather than read back from the
//! device, and always stays within `[0, duration]`.

use std::time::Duration;

/// Result of advancing the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advance {
    pub position: Duration,
    pub reached_end: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackClock {
    position: Duration,
    duration: Duration,
}

impl PlaybackClock {
    pub fn new(duration: Duration) -> Self {
        Self {
            position: Duration::ZERO,
            duration,
        }
    }

    /// Resume a cursor at an existing position
    pub fn at(position: Duration, duration: Duration) -> Self {
        Self {
            position: position.min(duration),
            duration,
        }
    }

    pub fn position(&self) -> Duration {
        self.position
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Move forward by `delta`, stopping at the end of the media
    pub fn advance(&mut self, delta: Duration) -> Advance {
        self.position = self.position.saturating_add(delta).min(self.duration);
        Advance {
            position: self.position,
            reached_end: self.position >= self.duration,
        }
    }

    /// Jump to `fraction` of the duration; backward jumps are allowed
    pub fn seek(&mut self, fraction: f64) -> Duration {
        self.position = position_at(fraction, self.duration);
        self.position
    }

    /// Adopt a position reported elsewhere (e.g. by the device)
    pub fn sync(&mut self, position: Duration) -> Advance {
        self.position = position.min(self.duration);
        Advance {
            position: self.position,
            reached_end: self.position >= self.duration,
        }
    }

    pub fn reset(&mut self) {
        self.position = Duration::ZERO;
    }
}

/// Position of `fraction` (clamped to [0, 1]) within `duration`
pub fn position_at(fraction: f64, duration: Duration) -> Duration {
    let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
    duration.mul_f64(fraction).min(duration)
}
