//! Reference audio capabilities
//!
//! This module provides:
//! - A synthetic tone capture device that writes 16-bit WAV files
//! - A WAV playback cursor with pause/seek support
//! - Waveform peak extraction with a JSON sidecar cache
//! - A directory-backed store for recording files

mod capture;
mod extract;
mod playback;
mod recorder;

pub use capture::{CaptureState, ToneCapture};
pub use extract::WavWaveformExtractor;
pub use playback::{WavHandle, WavPlayer};
pub use recorder::{duration_of, pcm16_spec, peaks_path, write_wav, RecordingsDir, WavInfo};
