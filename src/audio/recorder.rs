//! Recording files on disk
//!
//! Recordings are 16-bit PCM WAV files named after their creation time, kept
//! in `~/.local/share/voxmemo/recordings` unless another directory is given.

use crate::capability::FileStore;
use crate::error::CapabilityError;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Sidecar holding cached waveform peaks for a recording
pub fn peaks_path(recording: &Path) -> PathBuf {
    let mut name = recording.as_os_str().to_owned();
    name.push(".peaks.json");
    PathBuf::from(name)
}

/// Directory-backed file store
#[derive(Debug, Clone)]
pub struct RecordingsDir {
    dir: PathBuf,
}

impl RecordingsDir {
    pub fn new() -> Self {
        let dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("voxmemo")
            .join("recordings");
        Self { dir }
    }

    pub fn with_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Default for RecordingsDir {
    fn default() -> Self {
        Self::new()
    }
}

impl FileStore for RecordingsDir {
    fn generate_path(&self) -> PathBuf {
        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let uuid = uuid::Uuid::new_v4().simple().to_string();
        self.dir
            .join(format!("recording_{}_{}.wav", timestamp, &uuid[..8]))
    }

    fn waveform_artifact(&self, recording: &Path) -> Option<PathBuf> {
        Some(peaks_path(recording))
    }

    async fn delete(&self, path: &Path) -> Result<(), CapabilityError> {
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| CapabilityError::DeleteFailed(format!("{}: {}", path.display(), e)))?;
        log::debug!("Deleted {:?}", path);
        Ok(())
    }
}

/// PCM layout of recordings written by the capture device
pub fn pcm16_spec(sample_rate: u32, channels: u16) -> WavSpec {
    WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Write interleaved 16-bit samples to a WAV file
pub fn write_wav(path: &Path, spec: WavSpec, samples: &[i16]) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create recordings directory: {}", e))?;
    }

    let file = File::create(path).map_err(|e| format!("Failed to create file: {}", e))?;
    let mut writer = WavWriter::new(BufWriter::new(file), spec)
        .map_err(|e| format!("Failed to create WAV writer: {}", e))?;

    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| format!("Failed to write sample: {}", e))?;
    }

    writer
        .finalize()
        .map_err(|e| format!("Failed to finalize WAV file: {}", e))
}

/// Header facts of a WAV file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavInfo {
    pub spec: WavSpec,
    /// Frames (samples per channel)
    pub frames: u32,
}

impl WavInfo {
    pub fn read(path: &Path) -> Result<Self, String> {
        let reader = WavReader::open(path).map_err(|e| format!("Failed to open WAV file: {}", e))?;
        Ok(Self {
            spec: reader.spec(),
            frames: reader.duration(),
        })
    }

    pub fn duration(&self) -> Duration {
        duration_of(self.frames as usize, self.spec.sample_rate)
    }
}

/// Duration of `frames` at `sample_rate`
pub fn duration_of(frames: usize, sample_rate: u32) -> Duration {
    if sample_rate == 0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(frames as f64 / sample_rate as f64)
}
