//! Waveform extraction from WAV recordings
//!
//! Reads the file on the blocking pool in chunks, reporting progress as it
//! goes, and reduces the first channel to signed per-block peaks. The peaks
//! are cached next to the recording so a second extraction is instant.

use super::recorder::peaks_path;
use crate::capability::{ExtractionEvent, WaveformExtractor};
use crate::error::CapabilityError;
use futures::channel::mpsc;
use futures::stream::{self, BoxStream, StreamExt};
use hound::{SampleFormat, WavReader};
use std::fs;
use std::path::{Path, PathBuf};

type EventSender = mpsc::UnboundedSender<Result<ExtractionEvent, CapabilityError>>;

/// Default peaks kept per second of audio
const PEAKS_PER_SECOND: u32 = 100;

/// Frames read between progress events
const CHUNK_FRAMES: usize = 16_384;

#[derive(Debug, Clone)]
pub struct WavWaveformExtractor {
    peaks_per_second: u32,
    cache: bool,
}

impl WavWaveformExtractor {
    pub fn new() -> Self {
        Self {
            peaks_per_second: PEAKS_PER_SECOND,
            cache: true,
        }
    }

    pub fn with_peaks_per_second(mut self, rate: u32) -> Self {
        self.peaks_per_second = rate.max(1);
        self
    }

    /// Skip reading and writing the sidecar cache
    pub fn without_cache(mut self) -> Self {
        self.cache = false;
        self
    }
}

impl Default for WavWaveformExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveformExtractor for WavWaveformExtractor {
    fn extract(&self, path: &Path) -> BoxStream<'static, Result<ExtractionEvent, CapabilityError>> {
        let path = path.to_path_buf();
        let settings = self.clone();

        // Nothing is read until the stream is first polled
        stream::once(async move {
            let (tx, rx) = mpsc::unbounded();
            tokio::task::spawn_blocking(move || settings.produce(&path, &tx));
            rx
        })
        .flatten()
        .boxed()
    }
}

impl WavWaveformExtractor {
    fn produce(&self, path: &Path, tx: &EventSender) {
        let result = if self.cache {
            match read_cache(path) {
                Some(peaks) => {
                    log::debug!("Using cached peaks for {:?}", path);
                    Ok(peaks)
                }
                None => read_peaks(path, self.peaks_per_second, tx).map(|peaks| {
                    write_cache(path, &peaks, tx);
                    peaks
                }),
            }
        } else {
            read_peaks(path, self.peaks_per_second, tx)
        };

        if tx.is_closed() {
            log::debug!("Waveform extraction for {:?} abandoned", path);
            return;
        }
        let _ = tx.unbounded_send(result.map(ExtractionEvent::Complete));
    }
}

fn read_cache(path: &Path) -> Option<Vec<i16>> {
    let contents = fs::read(peaks_path(path)).ok()?;
    serde_json::from_slice(&contents).ok()
}

/// Write the sidecar unless the consumer has gone away
///
/// A consumer that drops the stream may delete the recording right after, so
/// a sidecar written while it was leaving is removed again.
fn write_cache(path: &Path, peaks: &[i16], tx: &EventSender) {
    if tx.is_closed() {
        return;
    }
    let sidecar: PathBuf = peaks_path(path);
    let result = serde_json::to_vec(peaks)
        .map_err(|e| e.to_string())
        .and_then(|bytes| fs::write(&sidecar, bytes).map_err(|e| e.to_string()));
    if let Err(e) = result {
        log::warn!("Failed to cache waveform peaks at {:?}: {}", sidecar, e);
        return;
    }
    if tx.is_closed() {
        let _ = fs::remove_file(&sidecar);
    }
}

/// Largest-magnitude sample of each block, sign preserved
fn read_peaks(path: &Path, peaks_per_second: u32, tx: &EventSender) -> Result<Vec<i16>, CapabilityError> {
    let failed = |e: String| CapabilityError::ExtractionFailed(format!("{} (path: {:?})", e, path));

    let reader = WavReader::open(path).map_err(|e| failed(format!("Failed to open WAV file: {}", e)))?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));
    let total_frames = reader.duration() as usize;
    let block = ((spec.sample_rate / peaks_per_second.max(1)) as usize).max(1);

    // Normalize every format to the 16-bit range
    let samples: Box<dyn Iterator<Item = Result<i16, hound::Error>>> = match spec.sample_format {
        SampleFormat::Float => Box::new(
            reader
                .into_samples::<f32>()
                .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)),
        ),
        SampleFormat::Int if spec.bits_per_sample <= 16 => {
            let shift = 16 - spec.bits_per_sample;
            Box::new(reader.into_samples::<i16>().map(move |s| s.map(|v| v << shift)))
        }
        SampleFormat::Int => {
            let shift = spec.bits_per_sample - 16;
            Box::new(reader.into_samples::<i32>().map(move |s| s.map(|v| (v >> shift) as i16)))
        }
    };

    let mut peaks = Vec::with_capacity(total_frames / block + 1);
    let mut peak: i16 = 0;
    let mut in_block = 0;

    for (frame, sample) in samples.step_by(channels).enumerate() {
        let sample = sample.map_err(|e| failed(format!("Failed to read samples: {}", e)))?;
        if i32::from(sample).abs() > i32::from(peak).abs() {
            peak = sample;
        }
        in_block += 1;
        if in_block == block {
            peaks.push(peak);
            peak = 0;
            in_block = 0;
        }
        if (frame + 1) % CHUNK_FRAMES == 0 && total_frames > 0 {
            if tx.is_closed() {
                return Err(failed("Extraction abandoned".into()));
            }
            let progress = (frame + 1) as f32 / total_frames as f32;
            let _ = tx.unbounded_send(Ok(ExtractionEvent::Progress(progress.min(1.0))));
        }
    }
    if in_block > 0 {
        peaks.push(peak);
    }

    let _ = tx.unbounded_send(Ok(ExtractionEvent::Progress(1.0)));
    Ok(peaks)
}
