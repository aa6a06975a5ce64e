//! WAV playback cursor
//!
//! Tracks a real-time playback position over a loaded WAV file with
//! pause/seek support. Sound output itself belongs to the platform layer.

use super::recorder::WavInfo;
use crate::capability::PlaybackDevice;
use crate::error::CapabilityError;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Default)]
struct Cursor {
    /// Position accumulated while not running
    offset: Duration,
    /// Set while playing
    started_at: Option<Instant>,
}

/// Handle to one loaded recording
#[derive(Debug, Clone)]
pub struct WavHandle {
    id: u64,
    path: PathBuf,
    length: Duration,
    cursor: Arc<Mutex<Cursor>>,
}

impl WavHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Total media length
    pub fn length(&self) -> Duration {
        self.length
    }

    fn current_time(&self) -> Duration {
        let cursor = self.cursor.lock();
        let running = cursor.started_at.map(|t| t.elapsed()).unwrap_or_default();
        (cursor.offset + running).min(self.length)
    }
}

/// Playback device over WAV files
#[derive(Debug, Default)]
pub struct WavPlayer {
    next_id: AtomicU64,
}

impl WavPlayer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlaybackDevice for WavPlayer {
    type Handle = WavHandle;

    async fn load(&self, path: &Path) -> Result<WavHandle, CapabilityError> {
        let owned = path.to_path_buf();
        let info = tokio::task::spawn_blocking(move || WavInfo::read(&owned))
            .await
            .map_err(|e| CapabilityError::LoadFailed(e.to_string()))?
            .map_err(|e| CapabilityError::LoadFailed(format!("{} (path: {:?})", e, path)))?;

        let handle = WavHandle {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            path: path.to_path_buf(),
            length: info.duration(),
            cursor: Arc::new(Mutex::new(Cursor::default())),
        };
        log::debug!("Loaded {:?} ({:?})", path, handle.length);
        Ok(handle)
    }

    async fn play(&self, handle: &WavHandle) -> Result<(), CapabilityError> {
        let mut cursor = handle.cursor.lock();
        // Restart from the top if we've finished
        if cursor.offset >= handle.length {
            cursor.offset = Duration::ZERO;
        }
        if cursor.started_at.is_none() {
            cursor.started_at = Some(Instant::now());
        }
        log::debug!("Playing handle {} ({:?}) from {:?}", handle.id(), handle.path(), cursor.offset);
        Ok(())
    }

    async fn pause_toggle(&self, handle: &WavHandle) -> Result<(), CapabilityError> {
        let mut cursor = handle.cursor.lock();
        match cursor.started_at.take() {
            Some(started) => cursor.offset = (cursor.offset + started.elapsed()).min(handle.length),
            None => cursor.started_at = Some(Instant::now()),
        }
        Ok(())
    }

    async fn stop(&self, handle: &WavHandle) -> Result<(), CapabilityError> {
        let mut cursor = handle.cursor.lock();
        cursor.offset = Duration::ZERO;
        cursor.started_at = None;
        log::debug!("Stopped handle {}", handle.id());
        Ok(())
    }

    async fn seek(&self, handle: &WavHandle, position: Duration) -> Result<(), CapabilityError> {
        let mut cursor = handle.cursor.lock();
        cursor.offset = position.min(handle.length);
        if cursor.started_at.is_some() {
            cursor.started_at = Some(Instant::now());
        }
        Ok(())
    }

    async fn position(&self, handle: &WavHandle) -> Result<Duration, CapabilityError> {
        Ok(handle.current_time())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::recorder::{pcm16_spec, write_wav};

    fn one_second_wav() -> PathBuf {
        let path = std::env::temp_dir()
            .join(format!("voxmemo-play-{}", uuid::Uuid::new_v4()))
            .join("take.wav");
        write_wav(&path, pcm16_spec(8000, 1), &vec![0i16; 8000]).unwrap();
        path
    }

    #[tokio::test(start_paused = true)]
    async fn test_position_follows_play_pause_seek() {
        let path = one_second_wav();
        let player = WavPlayer::new();
        let handle = player.load(&path).await.unwrap();
        assert_eq!(handle.length(), Duration::from_secs(1));
        assert_eq!(handle.id(), 1);

        player.play(&handle).await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(player.position(&handle).await.unwrap(), Duration::from_millis(300));

        player.pause_toggle(&handle).await.unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(player.position(&handle).await.unwrap(), Duration::from_millis(300));
        assert!(handle.cursor.lock().started_at.is_none());
        assert_eq!(handle.path(), path.as_path());

        player.seek(&handle, Duration::from_millis(100)).await.unwrap();
        player.pause_toggle(&handle).await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(player.position(&handle).await.unwrap(), Duration::from_secs(1));

        player.stop(&handle).await.unwrap();
        assert_eq!(player.position(&handle).await.unwrap(), Duration::ZERO);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let player = WavPlayer::new();
        let err = player.load(Path::new("/nonexistent/voxmemo.wav")).await.unwrap_err();
        assert!(matches!(err, CapabilityError::LoadFailed(_)));
    }
}
