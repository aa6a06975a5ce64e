//! Error types for the session core
//!
//! Capability failures are reported by the external devices; session errors
//! are what every command hands back to its caller.

use crate::models::SessionState;
use thiserror::Error;

/// Failures reported by a capture, playback, extraction or file capability
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CapabilityError {
    /// The capture device refused to start
    #[error("Capture start failed: {0}")]
    CaptureStartFailed(String),

    /// The capture device could not report an amplitude sample
    #[error("Amplitude unavailable: {0}")]
    AmplitudeUnavailable(String),

    /// The playback device could not load the recording
    #[error("Load failed: {0}")]
    LoadFailed(String),

    /// The playback device could not report its position
    #[error("Position unavailable: {0}")]
    PositionUnavailable(String),

    /// Waveform extraction failed
    #[error("Waveform extraction failed: {0}")]
    ExtractionFailed(String),

    /// A recording file could not be removed
    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    /// Any other device call (pause, resume, stop, play, seek) failed
    #[error("Device error: {0}")]
    Device(String),
}

/// Errors returned by session commands
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Microphone permission was not granted
    #[error("Recording permission denied")]
    PermissionDenied,

    /// The command is not valid in the current session state
    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    /// A playback command was issued before any recording exists
    #[error("No recording available")]
    NoRecording,

    #[error(transparent)]
    Capability(#[from] CapabilityError),
}

impl SessionError {
    /// Check if this error is recoverable
    ///
    /// Recoverable errors leave the session usable: the caller may retry the
    /// same command or issue another one without resetting anything.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SessionError::PermissionDenied => true,
            SessionError::InvalidState { .. } => true,
            SessionError::NoRecording => true,
            SessionError::Capability(e) => match e {
                CapabilityError::CaptureStartFailed(_) => false,
                CapabilityError::LoadFailed(_) => false,
                CapabilityError::Device(_) => false,
                // Poll and cleanup failures never block the session
                CapabilityError::AmplitudeUnavailable(_)
                | CapabilityError::PositionUnavailable(_)
                | CapabilityError::ExtractionFailed(_)
                | CapabilityError::DeleteFailed(_) => true,
            },
        }
    }

    /// Get a user-friendly description of the error
    pub fn user_message(&self) -> String {
        match self {
            SessionError::PermissionDenied => {
                "Microphone access is required to record a voice message.".to_string()
            }
            SessionError::InvalidState { .. } => "That action is not available right now.".to_string(),
            SessionError::NoRecording => "There is no recording to play.".to_string(),
            SessionError::Capability(CapabilityError::CaptureStartFailed(_)) => {
                "Could not start recording. Please check your microphone.".to_string()
            }
            SessionError::Capability(CapabilityError::LoadFailed(_)) => {
                "Could not open the recording for playback.".to_string()
            }
            SessionError::Capability(_) => "Audio device error. Please try again.".to_string(),
        }
    }
}

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
