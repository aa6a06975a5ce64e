//! Voice message session state machine
//!
//! Owns the authoritative [`SessionRecord`] and [`GestureState`], drives the
//! duration, amplitude and playback timers, and calls into the capture and
//! playback capabilities. Observers get read-only snapshots through
//! [`tokio::sync::watch`] channels.
//!
//! Commands are serialized by a single-flight lock, so a `stop_recording()`
//! racing a `cancel_recording()` runs one after the other. Timer ticks do not
//! take that lock; each tick re-checks the session epoch and state before
//! touching anything, which makes a tick that lost a race with a command a
//! no-op.

mod timer;

#[cfg(test)]
mod fakes;

use crate::capability::{CaptureDevice, ExtractionEvent, FileStore, PlaybackDevice, WaveformExtractor};
use crate::clock::{self, PlaybackClock};
use crate::config::{PositionSource, SessionConfig};
use crate::error::{CapabilityError, Result, SessionError};
use crate::gesture::GestureState;
use crate::models::{Capture, PlayerState, SessionPhase, SessionRecord, SessionState, Take};
use crate::waveform;
use futures::StreamExt;
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::mem;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use std::time::Duration;
use timer::{TimerHandle, Timers};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Which timer families are currently armed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveTimers {
    pub recording: bool,
    pub playback: bool,
}

struct Inner<H> {
    record: SessionRecord,
    gesture: GestureState,
    timers: Timers,
    /// The single live playback handle
    player: Option<H>,
    extraction: Option<JoinHandle<()>>,
    /// Bumped when a recording starts or the session resets
    session: u64,
    /// Bumped whenever timers are armed or cancelled
    epoch: u64,
}

impl<H> Inner<H> {
    fn next_epoch(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }
}

struct Shared<C, P, W, F>
where
    P: PlaybackDevice,
{
    config: SessionConfig,
    capture: C,
    playback: P,
    extractor: W,
    files: F,
    inner: Mutex<Inner<P::Handle>>,
    commands: tokio::sync::Mutex<()>,
    record_tx: watch::Sender<SessionRecord>,
    gesture_tx: watch::Sender<GestureState>,
}

/// Coordinates one recording-through-playback session at a time
pub struct SessionStateMachine<C, P, W, F>
where
    P: PlaybackDevice,
{
    shared: Arc<Shared<C, P, W, F>>,
}

impl<C, P, W, F> Clone for SessionStateMachine<C, P, W, F>
where
    P: PlaybackDevice,
{
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<C, P, W, F> SessionStateMachine<C, P, W, F>
where
    C: CaptureDevice,
    P: PlaybackDevice,
    W: WaveformExtractor,
    F: FileStore,
{
    pub fn new(config: SessionConfig, capture: C, playback: P, extractor: W, files: F) -> Self {
        let gesture = GestureState::with_thresholds(config.gesture);
        let (record_tx, _) = watch::channel(SessionRecord::default());
        let (gesture_tx, _) = watch::channel(gesture);

        Self {
            shared: Arc::new(Shared {
                config,
                capture,
                playback,
                extractor,
                files,
                inner: Mutex::new(Inner {
                    record: SessionRecord::default(),
                    gesture,
                    timers: Timers::default(),
                    player: None,
                    extraction: None,
                    session: 0,
                    epoch: 0,
                }),
                commands: tokio::sync::Mutex::new(()),
                record_tx,
                gesture_tx,
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    /// Receive every committed session change
    pub fn subscribe(&self) -> watch::Receiver<SessionRecord> {
        self.shared.record_tx.subscribe()
    }

    pub fn subscribe_gesture(&self) -> watch::Receiver<GestureState> {
        self.shared.gesture_tx.subscribe()
    }

    pub fn snapshot(&self) -> SessionRecord {
        self.shared.inner.lock().record.clone()
    }

    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    pub fn gesture(&self) -> GestureState {
        self.shared.inner.lock().gesture
    }

    pub fn active_timers(&self) -> ActiveTimers {
        let inner = self.shared.inner.lock();
        ActiveTimers {
            recording: inner.timers.recording_active(),
            playback: inner.timers.playback_active(),
        }
    }

    pub async fn start_recording(&self) -> Result<()> {
        let _guard = self.shared.commands.lock().await;
        self.shared.start_recording().await
    }

    pub async fn pause_recording(&self) -> Result<()> {
        let _guard = self.shared.commands.lock().await;
        self.shared.pause_recording().await
    }

    pub async fn resume_recording(&self) -> Result<()> {
        let _guard = self.shared.commands.lock().await;
        self.shared.resume_recording().await
    }

    pub async fn stop_recording(&self) -> Result<()> {
        let _guard = self.shared.commands.lock().await;
        self.shared.stop_recording().await
    }

    /// Discard the recording in progress; a no-op when already idle
    pub async fn cancel_recording(&self) -> Result<()> {
        let _guard = self.shared.commands.lock().await;
        self.shared.cancel_recording().await
    }

    pub async fn play_audio(&self) -> Result<()> {
        let _guard = self.shared.commands.lock().await;
        self.shared.play_audio().await
    }

    /// Toggle between playing and paused playback
    pub async fn pause_audio(&self) -> Result<()> {
        let _guard = self.shared.commands.lock().await;
        self.shared.pause_audio().await
    }

    pub async fn stop_audio(&self) -> Result<()> {
        let _guard = self.shared.commands.lock().await;
        self.shared.stop_audio().await
    }

    /// Move the playback cursor to `fraction` of the recording
    pub async fn seek_to(&self, fraction: f64) -> Result<()> {
        let _guard = self.shared.commands.lock().await;
        self.shared.seek_to(fraction).await
    }

    /// Remove the finished recording; a no-op when already idle
    pub async fn delete_recording(&self) -> Result<()> {
        let _guard = self.shared.commands.lock().await;
        self.shared.delete_recording().await
    }

    /// Replace the tracked gesture; acting on its signals is up to the caller
    pub fn update_gesture_data(&self, next: GestureState) {
        let mut inner = self.shared.inner.lock();
        inner.gesture = next;
        self.shared.gesture_tx.send_replace(next);
    }
}

impl<C, P, W, F> Shared<C, P, W, F>
where
    C: CaptureDevice,
    P: PlaybackDevice,
    W: WaveformExtractor,
    F: FileStore,
{
    fn state(&self) -> SessionState {
        self.inner.lock().record.state()
    }

    fn publish(&self, inner: &Inner<P::Handle>) {
        self.record_tx.send_replace(inner.record.clone());
    }

    fn require(&self, operation: &'static str, allowed: impl Fn(SessionState) -> bool) -> Result<SessionState> {
        let state = self.state();
        if allowed(state) {
            Ok(state)
        } else {
            debug!("Rejected {} while {}", operation, state);
            Err(SessionError::InvalidState { operation, state })
        }
    }

    /// Playback commands need a finished recording
    fn require_recording(&self, operation: &'static str) -> Result<SessionState> {
        match self.state() {
            SessionState::Idle => Err(SessionError::NoRecording),
            state if state.has_recording() => Ok(state),
            state => Err(SessionError::InvalidState { operation, state }),
        }
    }

    async fn start_recording(self: &Arc<Self>) -> Result<()> {
        self.require("start recording", |s| s == SessionState::Idle)?;

        if !self.capture.has_permission().await {
            warn!("Recording permission denied");
            return Err(SessionError::PermissionDenied);
        }

        let target = self.files.generate_path();
        if let Err(e) = self.capture.start(&target, self.config.capture).await {
            error!("Failed to start recording: {}", e);
            let e = match e {
                CapabilityError::CaptureStartFailed(_) => e,
                other => CapabilityError::CaptureStartFailed(other.to_string()),
            };
            return Err(e.into());
        }

        let mut inner = self.inner.lock();
        inner.session += 1;
        inner.record = SessionRecord {
            phase: SessionPhase::Recording(Capture::new(target.clone(), self.config.live_amplitude_cap)),
            player_state: PlayerState::Stopped,
        };
        self.arm_recording_timers(&mut inner);
        self.publish(&inner);
        info!("Recording started: {:?}", target);
        Ok(())
    }

    async fn pause_recording(self: &Arc<Self>) -> Result<()> {
        self.require("pause recording", |s| s == SessionState::Recording)?;

        if let Err(e) = self.capture.pause().await {
            error!("Failed to pause recording: {}", e);
            return Err(e.into());
        }

        let mut inner = self.inner.lock();
        inner.timers.cancel_recording();
        inner.next_epoch();
        inner.record.phase = match mem::take(&mut inner.record.phase) {
            SessionPhase::Recording(c) => SessionPhase::Paused(c),
            other => other,
        };
        self.publish(&inner);
        info!("Recording paused at {:?}", inner.record.duration());
        Ok(())
    }

    async fn resume_recording(self: &Arc<Self>) -> Result<()> {
        self.require("resume recording", |s| s == SessionState::Paused)?;

        if let Err(e) = self.capture.resume().await {
            error!("Failed to resume recording: {}", e);
            return Err(e.into());
        }

        let mut inner = self.inner.lock();
        inner.record.phase = match mem::take(&mut inner.record.phase) {
            SessionPhase::Paused(c) => SessionPhase::Recording(c),
            other => other,
        };
        self.arm_recording_timers(&mut inner);
        self.publish(&inner);
        info!("Recording resumed");
        Ok(())
    }

    async fn stop_recording(self: &Arc<Self>) -> Result<()> {
        let prior = self.require("stop recording", |s| s.is_capturing())?;

        {
            let mut inner = self.inner.lock();
            inner.timers.cancel_recording();
            inner.next_epoch();
        }

        let final_path = match self.capture.stop().await {
            Ok(path) => path,
            Err(e) => {
                error!("Failed to stop recording: {}", e);
                if prior == SessionState::Recording {
                    let mut inner = self.inner.lock();
                    self.arm_recording_timers(&mut inner);
                }
                return Err(e.into());
            }
        };

        let mut inner = self.inner.lock();
        let capture = match mem::take(&mut inner.record.phase) {
            SessionPhase::Recording(c) | SessionPhase::Paused(c) => c,
            other => {
                inner.record.phase = other;
                return Err(SessionError::InvalidState {
                    operation: "stop recording",
                    state: inner.record.state(),
                });
            }
        };

        let file_path = final_path.unwrap_or(capture.file_path);
        let duration = capture.duration;
        inner.record = SessionRecord {
            phase: SessionPhase::Completed(Take::new(file_path.clone(), duration, capture.live.to_vec())),
            player_state: PlayerState::Stopped,
        };
        self.publish(&inner);
        info!("Recording stopped: {:?} ({:?})", file_path, duration);

        let session = inner.session;
        let extraction = self.spawn_extraction(file_path, session);
        if let Some(previous) = inner.extraction.replace(extraction) {
            previous.abort();
        }
        Ok(())
    }

    async fn cancel_recording(self: &Arc<Self>) -> Result<()> {
        let state = self.state();
        if state == SessionState::Idle {
            debug!("Cancel requested with no recording in progress");
            return Ok(());
        }
        if !state.is_capturing() {
            return Err(SessionError::InvalidState {
                operation: "cancel recording",
                state,
            });
        }

        let target = {
            let mut inner = self.inner.lock();
            inner.timers.cancel_recording();
            inner.next_epoch();
            inner.record.file_path().map(Path::to_path_buf)
        };

        let produced = match self.capture.stop().await {
            Ok(path) => path.or(target),
            Err(e) => {
                warn!("Capture stop failed during cancel: {}", e);
                target
            }
        };

        if let Some(path) = produced {
            if let Err(e) = self.files.delete(&path).await {
                warn!("Failed to delete cancelled recording {:?}: {}", path, e);
            }
        }

        self.reset();
        info!("Recording cancelled");
        Ok(())
    }

    async fn play_audio(self: &Arc<Self>) -> Result<()> {
        self.require_recording("play audio")?;

        let (path, previous) = {
            let mut inner = self.inner.lock();
            inner.timers.cancel_playback();
            inner.next_epoch();
            let Some(take) = inner.record.take() else {
                return Err(SessionError::NoRecording);
            };
            let path = take.file_path.clone();
            (path, inner.player.take())
        };

        if let Some(handle) = previous {
            if let Err(e) = self.playback.stop(&handle).await {
                warn!("Failed to stop previous playback {:?}: {}", handle, e);
            }
        }

        {
            let mut inner = self.inner.lock();
            inner.record.player_state = PlayerState::Loading;
            self.publish(&inner);
        }

        let handle = match self.playback.load(&path).await {
            Ok(handle) => handle,
            Err(e) => {
                error!("Failed to load {:?} for playback: {}", path, e);
                self.settle_completed(false);
                let e = match e {
                    CapabilityError::LoadFailed(_) => e,
                    other => CapabilityError::LoadFailed(other.to_string()),
                };
                return Err(e.into());
            }
        };

        let resume_at = {
            let inner = self.inner.lock();
            inner
                .record
                .take()
                .map(|t| t.position())
                .filter(|pos| !pos.is_zero() && *pos < inner.record.duration())
        };
        if let Some(position) = resume_at {
            if let Err(e) = self.playback.seek(&handle, position).await {
                warn!("Failed to resume playback at {:?}: {}", position, e);
            }
        }

        if let Err(e) = self.playback.play(&handle).await {
            error!("Failed to start playback: {}", e);
            if let Err(e) = self.playback.stop(&handle).await {
                warn!("Failed to release playback handle: {}", e);
            }
            self.settle_completed(false);
            return Err(e.into());
        }

        let mut inner = self.inner.lock();
        inner.record.phase = match mem::take(&mut inner.record.phase) {
            SessionPhase::Completed(mut t) | SessionPhase::Playing(mut t) | SessionPhase::PlayingPaused(mut t) => {
                if t.position() >= t.duration {
                    t.set_position(Duration::ZERO);
                }
                SessionPhase::Playing(t)
            }
            other => other,
        };
        inner.record.player_state = PlayerState::Playing;
        inner.player = Some(handle);
        self.arm_playback_timer(&mut inner);
        self.publish(&inner);
        info!("Playback started: {:?}", path);
        Ok(())
    }

    async fn pause_audio(self: &Arc<Self>) -> Result<()> {
        let state = self.require("pause audio", |s| {
            matches!(s, SessionState::Playing | SessionState::PlayingPaused)
        })?;

        let handle = self.inner.lock().player.clone();
        let Some(handle) = handle else {
            return Err(SessionError::InvalidState {
                operation: "pause audio",
                state,
            });
        };

        if let Err(e) = self.playback.pause_toggle(&handle).await {
            error!("Failed to toggle playback pause: {}", e);
            return Err(e.into());
        }

        let mut inner = self.inner.lock();
        match mem::take(&mut inner.record.phase) {
            SessionPhase::Playing(t) => {
                inner.timers.cancel_playback();
                inner.next_epoch();
                inner.record.phase = SessionPhase::PlayingPaused(t);
                inner.record.player_state = PlayerState::Paused;
                info!("Playback paused");
            }
            SessionPhase::PlayingPaused(t) => {
                inner.record.phase = SessionPhase::Playing(t);
                inner.record.player_state = PlayerState::Playing;
                self.arm_playback_timer(&mut inner);
                info!("Playback resumed");
            }
            other => inner.record.phase = other,
        }
        self.publish(&inner);
        Ok(())
    }

    async fn stop_audio(self: &Arc<Self>) -> Result<()> {
        self.require_recording("stop audio")?;

        let handle = {
            let mut inner = self.inner.lock();
            inner.timers.cancel_playback();
            inner.next_epoch();
            inner.player.take()
        };

        // Teardown proceeds even when the device complains; the handle is gone
        if let Some(handle) = handle {
            if let Err(e) = self.playback.stop(&handle).await {
                warn!("Failed to stop playback {:?}: {}", handle, e);
            }
        }

        self.settle_completed(true);
        info!("Playback stopped");
        Ok(())
    }

    async fn seek_to(self: &Arc<Self>, fraction: f64) -> Result<()> {
        self.require_recording("seek")?;

        let (handle, position) = {
            let mut inner = self.inner.lock();
            let Some(take) = inner.record.take_mut() else {
                return Err(SessionError::NoRecording);
            };
            let position = clock::position_at(fraction, take.duration);
            take.set_position(position);
            self.publish(&inner);
            (inner.player.clone(), position)
        };
        debug!("Seek to {:?}", position);

        if let Some(handle) = handle {
            if let Err(e) = self.playback.seek(&handle, position).await {
                warn!("Device seek to {:?} failed: {}", position, e);
            }
        }
        Ok(())
    }

    async fn delete_recording(self: &Arc<Self>) -> Result<()> {
        let state = self.state();
        if state == SessionState::Idle {
            debug!("Delete requested with no recording");
            return Ok(());
        }
        if !state.has_recording() {
            return Err(SessionError::InvalidState {
                operation: "delete recording",
                state,
            });
        }

        let (path, handle, extraction) = {
            let mut inner = self.inner.lock();
            inner.timers.cancel_all();
            inner.next_epoch();
            let path = inner.record.file_path().map(Path::to_path_buf);
            (path, inner.player.take(), inner.extraction.take())
        };

        // The extractor must let go of the recording before its files are removed
        if let Some(extraction) = extraction {
            extraction.abort();
            let _ = extraction.await;
        }

        if let Some(handle) = handle {
            if let Err(e) = self.playback.stop(&handle).await {
                warn!("Failed to stop playback before delete: {}", e);
            }
        }

        if let Some(path) = path {
            if let Err(e) = self.files.delete(&path).await {
                warn!("Failed to delete recording {:?}: {}", path, e);
            }
            if let Some(artifact) = self.files.waveform_artifact(&path) {
                if let Err(e) = self.files.delete(&artifact).await {
                    debug!("No waveform artifact removed for {:?}: {}", path, e);
                }
            }
        }

        self.reset();
        info!("Recording deleted");
        Ok(())
    }

    /// Return to `completed`, optionally rewinding the cursor
    fn settle_completed(&self, rewind: bool) {
        let mut inner = self.inner.lock();
        inner.record.phase = match mem::take(&mut inner.record.phase) {
            SessionPhase::Completed(mut t) | SessionPhase::Playing(mut t) | SessionPhase::PlayingPaused(mut t) => {
                if rewind {
                    t.set_position(Duration::ZERO);
                }
                SessionPhase::Completed(t)
            }
            other => other,
        };
        inner.record.player_state = PlayerState::Stopped;
        self.publish(&inner);
    }

    /// Clear every field back to the idle defaults
    fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.timers.cancel_all();
        inner.next_epoch();
        inner.session += 1;
        inner.player = None;
        if let Some(extraction) = inner.extraction.take() {
            extraction.abort();
        }
        inner.record = SessionRecord::default();
        inner.gesture = GestureState::with_thresholds(self.config.gesture);
        self.publish(&inner);
        self.gesture_tx.send_replace(inner.gesture);
    }

    fn arm_recording_timers(self: &Arc<Self>, inner: &mut Inner<P::Handle>) {
        let epoch = inner.next_epoch();

        let weak = Arc::downgrade(self);
        let duration = TimerHandle::spawn("duration", self.config.duration_tick(), move || {
            let tick = match weak.upgrade() {
                Some(shared) => shared.on_duration_tick(epoch),
                None => ControlFlow::Break(()),
            };
            std::future::ready(tick)
        });

        let weak = Arc::downgrade(self);
        let amplitude = TimerHandle::spawn("amplitude", self.config.amplitude_interval(), move || {
            let weak = weak.clone();
            async move {
                match weak.upgrade() {
                    Some(shared) => shared.on_amplitude_tick(epoch).await,
                    None => ControlFlow::Break(()),
                }
            }
        });

        inner.timers.arm_recording(duration, amplitude);
    }

    fn arm_playback_timer(self: &Arc<Self>, inner: &mut Inner<P::Handle>) {
        let epoch = inner.next_epoch();
        let weak = Arc::downgrade(self);
        let playback = TimerHandle::spawn("playback", self.config.playback_tick(), move || {
            let weak = weak.clone();
            async move {
                match weak.upgrade() {
                    Some(shared) => shared.on_playback_tick(epoch).await,
                    None => ControlFlow::Break(()),
                }
            }
        });
        inner.timers.arm_playback(playback);
    }

    fn on_duration_tick(&self, epoch: u64) -> ControlFlow<()> {
        let mut inner = self.inner.lock();
        if inner.epoch != epoch {
            return ControlFlow::Break(());
        }
        let tick = self.config.duration_tick();
        match &mut inner.record.phase {
            SessionPhase::Recording(c) => c.duration += tick,
            _ => return ControlFlow::Break(()),
        }
        self.publish(&inner);
        ControlFlow::Continue(())
    }

    async fn on_amplitude_tick(&self, epoch: u64) -> ControlFlow<()> {
        if !self.is_current(epoch, SessionState::Recording) {
            return ControlFlow::Break(());
        }

        let reading = self.capture.current_amplitude().await;

        let mut inner = self.inner.lock();
        if inner.epoch != epoch {
            return ControlFlow::Break(());
        }
        let raw = match reading {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Amplitude poll failed: {}", e);
                return ControlFlow::Continue(());
            }
        };
        match &mut inner.record.phase {
            SessionPhase::Recording(c) => c.live.push_raw(raw),
            _ => return ControlFlow::Break(()),
        }
        self.publish(&inner);
        ControlFlow::Continue(())
    }

    async fn on_playback_tick(self: &Arc<Self>, epoch: u64) -> ControlFlow<()> {
        let handle = {
            let inner = self.inner.lock();
            if inner.epoch != epoch || inner.record.state() != SessionState::Playing {
                return ControlFlow::Break(());
            }
            inner.player.clone()
        };

        let reported = match (self.config.position_source, handle) {
            (PositionSource::Device, Some(handle)) => match self.playback.position(&handle).await {
                Ok(position) => Some(position),
                Err(e) => {
                    warn!("Position poll failed, advancing clock instead: {}", e);
                    None
                }
            },
            _ => None,
        };

        {
            let mut inner = self.inner.lock();
            if inner.epoch != epoch {
                return ControlFlow::Break(());
            }
            let advance = match &mut inner.record.phase {
                SessionPhase::Playing(take) => {
                    let mut clock = PlaybackClock::at(take.position(), take.duration);
                    let advance = match reported {
                        Some(position) => clock.sync(position),
                        None => clock.advance(self.config.playback_tick()),
                    };
                    take.set_position(advance.position);
                    advance
                }
                _ => return ControlFlow::Break(()),
            };
            self.publish(&inner);
            if !advance.reached_end {
                return ControlFlow::Continue(());
            }
            // This tick performs the stop; stop_audio must not abort it
            inner.timers.detach_playback();
        }

        self.finish_playback(epoch).await;
        ControlFlow::Break(())
    }

    async fn finish_playback(self: &Arc<Self>, epoch: u64) {
        let _guard = self.commands.lock().await;
        let current = self.inner.lock().epoch;
        if current != epoch {
            debug!("Playback end superseded by another command");
            return;
        }
        info!("Playback reached the end");
        if let Err(e) = self.stop_audio().await {
            warn!("Failed to stop playback at end of media: {}", e);
        }
    }

    fn is_current(&self, epoch: u64, state: SessionState) -> bool {
        let inner = self.inner.lock();
        inner.epoch == epoch && inner.record.state() == state
    }

    fn spawn_extraction(self: &Arc<Self>, path: PathBuf, session: u64) -> JoinHandle<()> {
        let mut events = self.extractor.extract(&path);
        let target = self.config.waveform_points;
        let weak = Arc::downgrade(self);

        tokio::spawn(async move {
            let samples = loop {
                match events.next().await {
                    Some(Ok(ExtractionEvent::Progress(fraction))) => {
                        debug!("Waveform extraction {:.0}%", fraction * 100.0);
                    }
                    Some(Ok(ExtractionEvent::Complete(samples))) => break samples,
                    Some(Err(e)) => {
                        warn!("Waveform extraction failed for {:?}: {}", path, e);
                        return;
                    }
                    None => {
                        warn!("Waveform extraction for {:?} ended without samples", path);
                        return;
                    }
                }
            };
            let points = waveform::downsample(&samples, target);
            apply_waveform(&weak, session, &path, points);
        })
    }
}

fn apply_waveform<C, P, W, F>(weak: &Weak<Shared<C, P, W, F>>, session: u64, path: &Path, points: Vec<f32>)
where
    C: CaptureDevice,
    P: PlaybackDevice,
    W: WaveformExtractor,
    F: FileStore,
{
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let mut inner = shared.inner.lock();
    if inner.session != session {
        debug!("Discarding waveform for a superseded session");
        return;
    }
    let count = points.len();
    match inner.record.take_mut() {
        Some(take) if take.file_path == path => {
            take.waveform = points;
            take.waveform_ready = true;
        }
        _ => return,
    }
    shared.publish(&inner);
    debug!("Waveform ready for {:?} ({} points)", path, count);
}
