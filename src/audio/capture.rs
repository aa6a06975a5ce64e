//! Synthetic microphone capture
//!
//! Produces a speech-like amplitude-modulated tone instead of reading real
//! hardware, so a session can run end to end anywhere. Levels are metered in
//! dBFS over the most recent 50 ms, and the captured signal is written as a
//! 16-bit WAV file when the capture stops.

use super::recorder::{pcm16_spec, write_wav};
use crate::capability::CaptureDevice;
use crate::config::CaptureSettings;
use crate::error::CapabilityError;
use crate::waveform::{calculate_peak, calculate_rms, to_dbfs};
use parking_lot::Mutex;
use std::f64::consts::TAU;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::Instant;

/// Metering window for `current_amplitude`
const METER_WINDOW: Duration = Duration::from_millis(50);

/// Current state of the capture
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Capturing,
    Paused,
}

struct CaptureInner {
    state: CaptureState,
    target: Option<PathBuf>,
    settings: CaptureSettings,
    /// Signal time captured before the last resume
    captured: Duration,
    resumed_at: Option<Instant>,
}

impl CaptureInner {
    fn elapsed(&self) -> Duration {
        self.captured + self.resumed_at.map(|t| t.elapsed()).unwrap_or_default()
    }
}

/// Tone generator standing in for a microphone
pub struct ToneCapture {
    permission: bool,
    inner: Mutex<CaptureInner>,
}

impl ToneCapture {
    pub fn new(permission: bool) -> Self {
        Self {
            permission,
            inner: Mutex::new(CaptureInner {
                state: CaptureState::Idle,
                target: None,
                settings: CaptureSettings::default(),
                captured: Duration::ZERO,
                resumed_at: None,
            }),
        }
    }

    pub fn state(&self) -> CaptureState {
        self.inner.lock().state
    }
}

impl Default for ToneCapture {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Signal value at `t` seconds: a 220 Hz voice with syllable-rate swells
fn tone_sample(t: f64) -> f32 {
    let envelope = 0.5 + 0.5 * (TAU * 1.5 * t).sin();
    let carrier = (TAU * 220.0 * t).sin() + 0.3 * (TAU * 440.0 * t).sin();
    (0.6 * envelope * envelope * carrier / 1.3) as f32
}

/// Mono signal covering `[start, start + length)`
fn render(start: Duration, length: Duration, sample_rate: u32) -> Vec<f32> {
    let rate = f64::from(sample_rate);
    let first = (start.as_secs_f64() * rate) as u64;
    let count = (length.as_secs_f64() * rate) as u64;
    (first..first + count)
        .map(|n| tone_sample(n as f64 / rate))
        .collect()
}

impl CaptureDevice for ToneCapture {
    async fn has_permission(&self) -> bool {
        self.permission
    }

    async fn start(&self, target: &Path, settings: CaptureSettings) -> Result<(), CapabilityError> {
        {
            let inner = self.inner.lock();
            if inner.state != CaptureState::Idle {
                return Err(CapabilityError::CaptureStartFailed("Capture already running".into()));
            }
        }

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                CapabilityError::CaptureStartFailed(format!("Failed to create {:?}: {}", parent, e))
            })?;
        }

        let mut inner = self.inner.lock();
        inner.state = CaptureState::Capturing;
        inner.target = Some(target.to_path_buf());
        inner.settings = settings;
        inner.captured = Duration::ZERO;
        inner.resumed_at = Some(Instant::now());
        log::debug!(
            "Tone capture started ({} Hz, {} ch, {} bps requested)",
            settings.sample_rate,
            settings.channels,
            settings.bit_rate
        );
        Ok(())
    }

    async fn pause(&self) -> Result<(), CapabilityError> {
        let mut inner = self.inner.lock();
        if inner.state != CaptureState::Capturing {
            return Err(CapabilityError::Device("Capture not running".into()));
        }
        inner.captured = inner.elapsed();
        inner.resumed_at = None;
        inner.state = CaptureState::Paused;
        Ok(())
    }

    async fn resume(&self) -> Result<(), CapabilityError> {
        let mut inner = self.inner.lock();
        if inner.state != CaptureState::Paused {
            return Err(CapabilityError::Device("Capture not paused".into()));
        }
        inner.resumed_at = Some(Instant::now());
        inner.state = CaptureState::Capturing;
        Ok(())
    }

    async fn stop(&self) -> Result<Option<PathBuf>, CapabilityError> {
        let (target, settings, elapsed) = {
            let mut inner = self.inner.lock();
            if inner.state == CaptureState::Idle {
                return Err(CapabilityError::Device("Capture not running".into()));
            }
            let elapsed = inner.elapsed();
            inner.state = CaptureState::Idle;
            inner.resumed_at = None;
            inner.captured = Duration::ZERO;
            (inner.target.take(), inner.settings, elapsed)
        };

        let Some(target) = target else {
            return Ok(None);
        };

        let path = target.clone();
        tokio::task::spawn_blocking(move || {
            let channels = usize::from(settings.channels.max(1));
            let signal = render(Duration::ZERO, elapsed, settings.sample_rate);
            log::debug!("Captured signal peaks at {:.1} dBFS", to_dbfs(calculate_peak(&signal)));
            let samples: Vec<i16> = signal
                .into_iter()
                .flat_map(|s| std::iter::repeat((s * i16::MAX as f32) as i16).take(channels))
                .collect();
            write_wav(&path, pcm16_spec(settings.sample_rate, settings.channels.max(1)), &samples)
        })
        .await
        .map_err(|e| CapabilityError::Device(format!("Capture writer panicked: {}", e)))?
        .map_err(CapabilityError::Device)?;

        log::debug!("Tone capture saved {:?} ({:?})", target, elapsed);
        Ok(Some(target))
    }

    async fn current_amplitude(&self) -> Result<f32, CapabilityError> {
        let (elapsed, sample_rate) = {
            let inner = self.inner.lock();
            if inner.state != CaptureState::Capturing {
                return Err(CapabilityError::AmplitudeUnavailable("Capture not running".into()));
            }
            (inner.elapsed(), inner.settings.sample_rate)
        };

        let start = elapsed.saturating_sub(METER_WINDOW);
        let window = render(start, elapsed - start, sample_rate);
        Ok(to_dbfs(calculate_rms(&window)))
    }
}
