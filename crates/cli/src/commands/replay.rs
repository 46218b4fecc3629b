//! `replay` command implementation.

use anyhow::{Context, Result};
use tracing::info;

use super::load_config;
use crate::cli::ReplayArgs;
use crate::replay::{ReplayDriver, ReplayPlan};

/// Execute the `replay` command
pub async fn run_replay(args: &ReplayArgs) -> Result<()> {
    info!(samples = %args.samples.display(), "Loading replay");

    let mut config = load_config(args.config.as_deref())?;

    if let Some(base_shift_ms) = args.base_shift_ms {
        info!(base_shift_ms, "Overriding base shift from CLI");
        config.reconciler.base_shift_ms = base_shift_ms;
    }

    let plan = ReplayPlan {
        samples: args.samples.clone(),
        frames: args.frames,
        width: args.width,
        height: args.height,
        fps: args.fps,
        drift_ppm: args.drift_ppm,
        output: args.output.clone(),
    };

    let stats = ReplayDriver::new(plan, config).run().await?;

    if args.json {
        let json = serde_json::to_string_pretty(&stats.report())
            .context("Failed to serialize replay report")?;
        println!("{}", json);
    } else {
        stats.print_summary();
    }

    Ok(())
}
