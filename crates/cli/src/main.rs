//! # Overlay Sync CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 样本流检查
//! - 配置验证
//! - 基于模拟视频宿主的离线回放

mod cli;
mod commands;
mod replay;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_inspect, run_replay, run_validate};
use observability::ObservabilityConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging based on CLI options
    init_logging(&cli)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Overlay Sync CLI starting"
    );

    // Execute command
    let result = match &cli.command {
        Commands::Inspect(args) => run_inspect(args).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Replay(args) => run_replay(args).await,
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize logging based on CLI options
fn init_logging(cli: &Cli) -> Result<()> {
    let default_log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: cli.metrics_port,
        default_log_level: default_log_level.to_string(),
    })
}
