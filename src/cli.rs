//! Command-line interface for Voxmemo
//!
//! Handles argument parsing and logging configuration.

use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;

/// Voxmemo - record a voice message, review its waveform and play it back
#[derive(Parser, Debug)]
#[command(name = "voxmemo")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Increase logging verbosity
    /// -v = info, -vv = debug, -vvv = trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Session config file (defaults to ~/.local/share/voxmemo/config.json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Seconds of audio to record
    #[arg(long, default_value_t = 3.0)]
    pub record_secs: f64,

    /// Pause the recording for a second after this many seconds
    #[arg(long)]
    pub pause_after: Option<f64>,

    /// Where recordings are written
    #[arg(long)]
    pub recordings_dir: Option<PathBuf>,

    /// Keep the recording instead of deleting it at the end
    #[arg(long)]
    pub keep: bool,

    /// Skip playing the recording back
    #[arg(long)]
    pub no_playback: bool,
}

impl Args {
    /// Get the log level filter based on verbosity flags
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Error
        } else {
            match self.verbose {
                0 => LevelFilter::Warn,
                1 => LevelFilter::Info,
                2 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            }
        }
    }
}

/// Initialize the logging system based on CLI arguments
pub fn init_logging(args: &Args) {
    let mut builder = env_logger::Builder::new();

    // Base level for all modules - keep at warn to suppress noisy deps
    builder.filter_level(LevelFilter::Warn);

    builder.filter_module("voxmemo", args.log_level());

    builder.format_timestamp_millis().init();
}
