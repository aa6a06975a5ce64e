//! Session data model
//!
//! The published [`SessionRecord`] carries its per-state data inside the
//! [`SessionPhase`] variant, so fields that only make sense in some states
//! (a playback position while idle, live amplitudes after stop) cannot exist.

use crate::waveform::AmplitudeWindow;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Coarse session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Recording,
    Paused,
    Completed,
    Playing,
    PlayingPaused,
}

impl SessionState {
    /// Recording or paused: the capture device owns the session
    pub fn is_capturing(&self) -> bool {
        matches!(self, SessionState::Recording | SessionState::Paused)
    }

    /// A finished recording exists and playback commands are allowed
    pub fn has_recording(&self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Playing | SessionState::PlayingPaused
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Idle => "idle",
            SessionState::Recording => "recording",
            SessionState::Paused => "paused",
            SessionState::Completed => "completed",
            SessionState::Playing => "playing",
            SessionState::PlayingPaused => "playing paused",
        };
        f.write_str(label)
    }
}

/// Playback device status, tracked independently of [`SessionState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    #[default]
    Stopped,
    Playing,
    Paused,
    Loading,
}

/// A recording in progress (recording or paused)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Capture {
    pub file_path: PathBuf,
    pub duration: Duration,
    pub live: AmplitudeWindow,
}

impl Capture {
    pub fn new(file_path: PathBuf, cap: usize) -> Self {
        Self {
            file_path,
            duration: Duration::ZERO,
            live: AmplitudeWindow::new(cap),
        }
    }
}

/// A finished recording, with its waveform and playback cursor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Take {
    pub file_path: PathBuf,
    pub duration: Duration,
    pub waveform: Vec<f32>,
    /// Set once the extracted waveform has replaced the live amplitudes
    pub waveform_ready: bool,
    position: Duration,
}

impl Take {
    pub fn new(file_path: PathBuf, duration: Duration, waveform: Vec<f32>) -> Self {
        Self {
            file_path,
            duration,
            waveform,
            waveform_ready: false,
            position: Duration::ZERO,
        }
    }

    pub fn position(&self) -> Duration {
        self.position
    }

    /// Set the playback cursor, clamped to the recording length
    pub fn set_position(&mut self, position: Duration) {
        self.position = position.min(self.duration);
    }
}

/// Per-state session data
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Idle,
    Recording(Capture),
    Paused(Capture),
    Completed(Take),
    Playing(Take),
    PlayingPaused(Take),
}

/// Snapshot of the session published to observers
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SessionRecord {
    pub(crate) phase: SessionPhase,
    pub(crate) player_state: PlayerState,
}

impl SessionRecord {
    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn state(&self) -> SessionState {
        match self.phase {
            SessionPhase::Idle => SessionState::Idle,
            SessionPhase::Recording(_) => SessionState::Recording,
            SessionPhase::Paused(_) => SessionState::Paused,
            SessionPhase::Completed(_) => SessionState::Completed,
            SessionPhase::Playing(_) => SessionState::Playing,
            SessionPhase::PlayingPaused(_) => SessionState::PlayingPaused,
        }
    }

    pub fn player_state(&self) -> PlayerState {
        self.player_state
    }

    pub fn file_path(&self) -> Option<&Path> {
        match &self.phase {
            SessionPhase::Idle => None,
            SessionPhase::Recording(c) | SessionPhase::Paused(c) => Some(&c.file_path),
            SessionPhase::Completed(t) | SessionPhase::Playing(t) | SessionPhase::PlayingPaused(t) => {
                Some(&t.file_path)
            }
        }
    }

    pub fn duration(&self) -> Duration {
        match &self.phase {
            SessionPhase::Idle => Duration::ZERO,
            SessionPhase::Recording(c) | SessionPhase::Paused(c) => c.duration,
            SessionPhase::Completed(t) | SessionPhase::Playing(t) | SessionPhase::PlayingPaused(t) => {
                t.duration
            }
        }
    }

    /// Live window while capturing, downsampled waveform afterwards
    pub fn amplitudes(&self) -> Vec<f32> {
        match &self.phase {
            SessionPhase::Idle => Vec::new(),
            SessionPhase::Recording(c) | SessionPhase::Paused(c) => c.live.to_vec(),
            SessionPhase::Completed(t) | SessionPhase::Playing(t) | SessionPhase::PlayingPaused(t) => {
                t.waveform.clone()
            }
        }
    }

    /// True once extraction has delivered the full-recording waveform
    pub fn waveform_ready(&self) -> bool {
        self.take().is_some_and(|t| t.waveform_ready)
    }

    pub fn playback_position(&self) -> Option<Duration> {
        self.take().map(Take::position)
    }

    /// Playback progress as fraction (0.0 - 1.0)
    pub fn progress(&self) -> f32 {
        match self.take() {
            Some(t) if !t.duration.is_zero() => {
                (t.position().as_secs_f64() / t.duration.as_secs_f64()) as f32
            }
            _ => 0.0,
        }
    }

    pub(crate) fn take(&self) -> Option<&Take> {
        match &self.phase {
            SessionPhase::Completed(t) | SessionPhase::Playing(t) | SessionPhase::PlayingPaused(t) => {
                Some(t)
            }
            _ => None,
        }
    }

    pub(crate) fn take_mut(&mut self) -> Option<&mut Take> {
        match &mut self.phase {
            SessionPhase::Completed(t) | SessionPhase::Playing(t) | SessionPhase::PlayingPaused(t) => {
                Some(t)
            }
            _ => None,
        }
    }
}
