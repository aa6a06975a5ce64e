//! Voxmemo - records a voice message, shows its waveform and plays it back
//!
//! This is the main entry point; it runs one scripted session against the
//! file-backed audio capabilities.

mod cli;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use std::time::Duration;
use voxmemo::audio::{RecordingsDir, ToneCapture, WavPlayer, WavWaveformExtractor};
use voxmemo::{SessionConfig, SessionState, SessionStateMachine};

/// Upper bound on waiting for waveform extraction
const EXTRACTION_WAIT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments and initialize logging
    let args = cli::Args::parse();
    cli::init_logging(&args);

    ensure!(args.record_secs > 0.0, "--record-secs must be positive");
    if let Some(pause_after) = args.pause_after {
        ensure!(
            pause_after >= 0.0 && pause_after < args.record_secs,
            "--pause-after must fall inside the recording"
        );
    }

    let config_path = args.config.clone().unwrap_or_else(SessionConfig::default_path);
    let config = SessionConfig::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    let files = match &args.recordings_dir {
        Some(dir) => RecordingsDir::with_dir(dir),
        None => RecordingsDir::new(),
    };
    info!("Starting Voxmemo session (recordings in {:?})", files.dir());

    let session = SessionStateMachine::new(
        config,
        ToneCapture::default(),
        WavPlayer::new(),
        WavWaveformExtractor::new(),
        files,
    );

    // Log every state change as it is committed
    let mut changes = session.subscribe();
    tokio::spawn(async move {
        let mut last = changes.borrow().state();
        while changes.changed().await.is_ok() {
            let state = changes.borrow_and_update().state();
            if state != last {
                debug!("Session {} -> {}", last, state);
                last = state;
            }
        }
    });

    session.start_recording().await?;
    match args.pause_after {
        Some(pause_after) => {
            tokio::time::sleep(Duration::from_secs_f64(pause_after)).await;
            session.pause_recording().await?;
            tokio::time::sleep(Duration::from_secs(1)).await;
            session.resume_recording().await?;
            tokio::time::sleep(Duration::from_secs_f64(args.record_secs - pause_after)).await;
        }
        None => tokio::time::sleep(Duration::from_secs_f64(args.record_secs)).await,
    }
    session.stop_recording().await?;

    let mut rx = session.subscribe();
    let extracted = tokio::time::timeout(
        EXTRACTION_WAIT,
        rx.wait_for(|r| r.state() != SessionState::Completed || r.waveform_ready()),
    )
    .await
    .is_ok();
    if !extracted {
        warn!("Waveform extraction did not finish; keeping the live waveform");
    }

    if !args.no_playback {
        let duration = session.snapshot().duration();
        session.play_audio().await?;
        tokio::time::timeout(
            duration + Duration::from_secs(2),
            rx.wait_for(|r| r.state() == SessionState::Completed),
        )
        .await
        .context("Playback did not reach the end")?
        .context("Session closed during playback")?;
    }

    let summary = session.snapshot();
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if args.keep {
        if let Some(path) = summary.file_path() {
            info!("Kept recording at {:?}", path);
        }
    } else {
        session.delete_recording().await?;
    }

    Ok(())
}
