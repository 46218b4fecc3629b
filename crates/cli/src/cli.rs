//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Overlay Sync - keypoint overlay playback reconciliation
#[derive(Parser, Debug)]
#[command(
    name = "overlay-sync",
    author,
    version,
    about = "Keypoint overlay playback reconciliation engine",
    long_about = "Ingests keypoint sample streams and reconciles them against a video's\n\
                  presentation clock.\n\n\
                  Inspects sample files, validates overlay configuration, and replays \n\
                  a stream against a simulated video host."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "OVERLAY_SYNC_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "OVERLAY_SYNC_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Prometheus metrics port (disabled when absent)
    #[arg(long, global = true, env = "OVERLAY_SYNC_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest a sample stream and print a summary
    Inspect(InspectArgs),

    /// Validate configuration file
    Validate(ValidateArgs),

    /// Replay a sample stream against a simulated video host
    Replay(ReplayArgs),
}

/// Arguments for the `inspect` command
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Path to the keypoint CSV
    #[arg(short, long)]
    pub samples: PathBuf,

    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, env = "OVERLAY_SYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "overlay.toml", env = "OVERLAY_SYNC_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `replay` command
#[derive(Parser, Debug, Clone)]
pub struct ReplayArgs {
    /// Path to the keypoint CSV
    #[arg(short, long)]
    pub samples: PathBuf,

    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, env = "OVERLAY_SYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of video frames to present
    #[arg(long, default_value = "300")]
    pub frames: u64,

    /// Simulated video width in pixels
    #[arg(long, default_value = "640")]
    pub width: u32,

    /// Simulated video height in pixels
    #[arg(long, default_value = "480")]
    pub height: u32,

    /// Simulated video frame rate
    #[arg(long, default_value = "30")]
    pub fps: f64,

    /// Video clock drift relative to the sample clock (parts per million)
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub drift_ppm: f64,

    /// Override the configured base shift (ms)
    #[arg(long, allow_hyphen_values = true)]
    pub base_shift_ms: Option<f64>,

    /// Write every overlaid frame as PNG into this directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output the summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}
