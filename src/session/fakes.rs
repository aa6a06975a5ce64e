//! Scriptable in-memory capabilities that record every call

use crate::capability::{CaptureDevice, ExtractionEvent, FileStore, PlaybackDevice, WaveformExtractor};
use crate::config::CaptureSettings;
use crate::error::CapabilityError;
use futures::stream::{self, BoxStream, StreamExt};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct CaptureScript {
    pub denied: bool,
    pub fail_start: bool,
    pub fail_pause: bool,
    pub fail_stop: bool,
    pub amplitude_unavailable: bool,
    /// Levels returned in order; `level` once exhausted
    pub levels: VecDeque<f32>,
    pub level: f32,
    /// Path reported by `stop()` instead of the start target
    pub final_path: Option<PathBuf>,
    pub target: Option<PathBuf>,
    pub calls: Vec<&'static str>,
}

#[derive(Clone, Default)]
pub struct FakeCapture(pub Arc<Mutex<CaptureScript>>);

impl FakeCapture {
    pub fn calls(&self, name: &str) -> usize {
        self.0.lock().calls.iter().filter(|c| **c == name).count()
    }
}

impl CaptureDevice for FakeCapture {
    async fn has_permission(&self) -> bool {
        !self.0.lock().denied
    }

    async fn start(&self, target: &Path, _settings: CaptureSettings) -> Result<(), CapabilityError> {
        let mut script = self.0.lock();
        script.calls.push("start");
        if script.fail_start {
            return Err(CapabilityError::CaptureStartFailed("device busy".into()));
        }
        script.target = Some(target.to_path_buf());
        Ok(())
    }

    async fn pause(&self) -> Result<(), CapabilityError> {
        let mut script = self.0.lock();
        script.calls.push("pause");
        if script.fail_pause {
            return Err(CapabilityError::Device("pause rejected".into()));
        }
        Ok(())
    }

    async fn resume(&self) -> Result<(), CapabilityError> {
        self.0.lock().calls.push("resume");
        Ok(())
    }

    async fn stop(&self) -> Result<Option<PathBuf>, CapabilityError> {
        let mut script = self.0.lock();
        script.calls.push("stop");
        if script.fail_stop {
            return Err(CapabilityError::Device("stop rejected".into()));
        }
        Ok(script.final_path.clone().or_else(|| script.target.clone()))
    }

    async fn current_amplitude(&self) -> Result<f32, CapabilityError> {
        let mut script = self.0.lock();
        if script.amplitude_unavailable {
            return Err(CapabilityError::AmplitudeUnavailable("no meter".into()));
        }
        Ok(script.levels.pop_front().unwrap_or(script.level))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackCall {
    Load(PathBuf),
    Play(u32),
    PauseToggle(u32),
    Stop(u32),
    Seek(u32, Duration),
}

#[derive(Debug, Default)]
pub struct PlaybackScript {
    pub fail_load: bool,
    pub fail_play: bool,
    pub fail_seek: bool,
    /// Reported by `position()`; unavailable when `None`
    pub position: Option<Duration>,
    pub next_handle: u32,
    pub calls: Vec<PlaybackCall>,
}

#[derive(Clone, Default)]
pub struct FakePlayback(pub Arc<Mutex<PlaybackScript>>);

impl FakePlayback {
    pub fn calls(&self) -> Vec<PlaybackCall> {
        self.0.lock().calls.clone()
    }
}

impl PlaybackDevice for FakePlayback {
    type Handle = u32;

    async fn load(&self, path: &Path) -> Result<u32, CapabilityError> {
        let mut script = self.0.lock();
        script.calls.push(PlaybackCall::Load(path.to_path_buf()));
        if script.fail_load {
            return Err(CapabilityError::LoadFailed("unsupported file".into()));
        }
        script.next_handle += 1;
        Ok(script.next_handle)
    }

    async fn play(&self, handle: &u32) -> Result<(), CapabilityError> {
        let mut script = self.0.lock();
        script.calls.push(PlaybackCall::Play(*handle));
        if script.fail_play {
            return Err(CapabilityError::Device("output unavailable".into()));
        }
        Ok(())
    }

    async fn pause_toggle(&self, handle: &u32) -> Result<(), CapabilityError> {
        self.0.lock().calls.push(PlaybackCall::PauseToggle(*handle));
        Ok(())
    }

    async fn stop(&self, handle: &u32) -> Result<(), CapabilityError> {
        self.0.lock().calls.push(PlaybackCall::Stop(*handle));
        Ok(())
    }

    async fn seek(&self, handle: &u32, position: Duration) -> Result<(), CapabilityError> {
        let mut script = self.0.lock();
        script.calls.push(PlaybackCall::Seek(*handle, position));
        if script.fail_seek {
            return Err(CapabilityError::Device("seek unsupported".into()));
        }
        Ok(())
    }

    async fn position(&self, _handle: &u32) -> Result<Duration, CapabilityError> {
        self.0
            .lock()
            .position
            .ok_or_else(|| CapabilityError::PositionUnavailable("no position".into()))
    }
}

/// Extractor yielding a fixed sample array, or failing
#[derive(Clone)]
pub struct FakeExtractor {
    pub samples: Option<Vec<i16>>,
}

impl FakeExtractor {
    pub fn with_samples(count: usize) -> Self {
        Self {
            samples: Some((0..count).map(|i| ((i * 97) % 30_000) as i16).collect()),
        }
    }

    pub fn failing() -> Self {
        Self { samples: None }
    }
}

impl WaveformExtractor for FakeExtractor {
    fn extract(&self, _path: &Path) -> BoxStream<'static, Result<ExtractionEvent, CapabilityError>> {
        let events = match &self.samples {
            Some(samples) => vec![
                Ok(ExtractionEvent::Progress(0.5)),
                Ok(ExtractionEvent::Complete(samples.clone())),
            ],
            None => vec![
                Ok(ExtractionEvent::Progress(0.1)),
                Err(CapabilityError::ExtractionFailed("corrupt file".into())),
            ],
        };
        stream::iter(events).boxed()
    }
}

#[derive(Debug, Default)]
pub struct FilesScript {
    pub generated: u32,
    pub fail_delete: bool,
    pub deleted: Vec<PathBuf>,
}

#[derive(Clone, Default)]
pub struct FakeFiles(pub Arc<Mutex<FilesScript>>);

impl FakeFiles {
    pub fn deleted(&self) -> Vec<PathBuf> {
        self.0.lock().deleted.clone()
    }
}

impl FileStore for FakeFiles {
    fn generate_path(&self) -> PathBuf {
        let mut script = self.0.lock();
        script.generated += 1;
        PathBuf::from(format!("/memos/recording_{}.wav", script.generated))
    }

    fn waveform_artifact(&self, recording: &Path) -> Option<PathBuf> {
        Some(recording.with_extension("peaks.json"))
    }

    async fn delete(&self, path: &Path) -> Result<(), CapabilityError> {
        let mut script = self.0.lock();
        script.deleted.push(path.to_path_buf());
        if script.fail_delete {
            return Err(CapabilityError::DeleteFailed("read-only".into()));
        }
        Ok(())
    }
}
