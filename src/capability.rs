//! Platform capabilities consumed by the session core
//!
//! Each device call is asynchronous and may suspend; timers keep firing while
//! a call is outstanding. Implementations live outside the core (see
//! [`crate::audio`] for file-backed ones).

use crate::config::CaptureSettings;
use crate::error::CapabilityError;
use futures::stream::BoxStream;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Microphone capture
pub trait CaptureDevice: Send + Sync + 'static {
    fn has_permission(&self) -> impl Future<Output = bool> + Send;

    fn start(
        &self,
        target: &Path,
        settings: CaptureSettings,
    ) -> impl Future<Output = Result<(), CapabilityError>> + Send;

    fn pause(&self) -> impl Future<Output = Result<(), CapabilityError>> + Send;

    fn resume(&self) -> impl Future<Output = Result<(), CapabilityError>> + Send;

    /// Finish the capture, yielding the final file path when one was written
    fn stop(&self) -> impl Future<Output = Result<Option<PathBuf>, CapabilityError>> + Send;

    /// Current input level on the device's decibel-like scale
    fn current_amplitude(&self) -> impl Future<Output = Result<f32, CapabilityError>> + Send;
}

/// Audio playback
pub trait PlaybackDevice: Send + Sync + 'static {
    type Handle: Clone + fmt::Debug + Send + Sync + 'static;

    fn load(&self, path: &Path) -> impl Future<Output = Result<Self::Handle, CapabilityError>> + Send;

    fn play(&self, handle: &Self::Handle) -> impl Future<Output = Result<(), CapabilityError>> + Send;

    fn pause_toggle(
        &self,
        handle: &Self::Handle,
    ) -> impl Future<Output = Result<(), CapabilityError>> + Send;

    fn stop(&self, handle: &Self::Handle) -> impl Future<Output = Result<(), CapabilityError>> + Send;

    fn seek(
        &self,
        handle: &Self::Handle,
        position: Duration,
    ) -> impl Future<Output = Result<(), CapabilityError>> + Send;

    fn position(
        &self,
        handle: &Self::Handle,
    ) -> impl Future<Output = Result<Duration, CapabilityError>> + Send;
}

/// Event emitted while reading a finished recording
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionEvent {
    /// Fraction of the file read so far (0.0 - 1.0)
    Progress(f32),
    /// Signed sample magnitudes for the whole recording
    Complete(Vec<i16>),
}

/// Post-recording waveform extraction
pub trait WaveformExtractor: Send + Sync + 'static {
    fn extract(&self, path: &Path) -> BoxStream<'static, Result<ExtractionEvent, CapabilityError>>;
}

/// Recording file naming and removal
pub trait FileStore: Send + Sync + 'static {
    /// Fresh target path for a new recording
    fn generate_path(&self) -> PathBuf;

    /// Derived file (e.g. a cached waveform) stored next to a recording
    fn waveform_artifact(&self, _recording: &Path) -> Option<PathBuf> {
        None
    }

    fn delete(&self, path: &Path) -> impl Future<Output = Result<(), CapabilityError>> + Send;
}
