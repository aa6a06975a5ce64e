//! Voxmemo - voice message capture and playback
//!
//! A session core that drives one voice message from recording through
//! review and playback. Platform audio is reached through the capability
//! traits in [`capability`]; [`audio`] holds file-backed implementations.

pub mod audio;
pub mod capability;
pub mod clock;
pub mod config;
pub mod error;
pub mod gesture;
pub mod models;
pub mod session;
pub mod waveform;

pub use capability::{CaptureDevice, ExtractionEvent, FileStore, PlaybackDevice, WaveformExtractor};
pub use clock::PlaybackClock;
pub use config::{CaptureSettings, ConfigError, PositionSource, SessionConfig};
pub use error::{CapabilityError, SessionError};
pub use gesture::{GestureSignal, GestureState, GestureThresholds};
pub use models::{PlayerState, SessionPhase, SessionRecord, SessionState};
pub use session::{ActiveTimers, SessionStateMachine};
pub use waveform::AmplitudeWindow;
