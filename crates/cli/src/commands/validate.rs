//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::OverlayConfig;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    keypoint_count: usize,
    edge_count: usize,
    base_shift_ms: f64,
    big_jump_gain: f64,
    tracking_gain: f64,
    max_dynamic_shift_ms: f64,
    autoplay: bool,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    keypoint_count: config.topology.keypoints.len(),
                    edge_count: config.topology.edges.len(),
                    base_shift_ms: config.reconciler.base_shift_ms,
                    big_jump_gain: config.reconciler.big_jump_gain,
                    tracking_gain: config.reconciler.tracking_gain,
                    max_dynamic_shift_ms: config.reconciler.max_dynamic_shift_ms,
                    autoplay: config.readiness.autoplay,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &OverlayConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.topology.edges.is_empty() {
        warnings.push("topology has no edges - only keypoint markers will be drawn".to_string());
    }

    if config.style.opacity == 0.0 {
        warnings.push("style.opacity is 0 - the overlay is invisible".to_string());
    }

    if config.reconciler.base_shift_ms.abs() > config.reconciler.max_dynamic_shift_ms {
        warnings.push(format!(
            "reconciler.base_shift_ms ({}) exceeds max_dynamic_shift_ms ({})",
            config.reconciler.base_shift_ms, config.reconciler.max_dynamic_shift_ms
        ));
    }

    for name in &config.style.reference_keypoints {
        if !config.topology.declares(&name.to_lowercase()) {
            warnings.push(format!(
                "style.reference_keypoints entry '{name}' is not a declared keypoint"
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Keypoints: {}", summary.keypoint_count);
            println!("  Edges: {}", summary.edge_count);
            println!("  Base shift: {} ms", summary.base_shift_ms);
            println!(
                "  Gains: big jump {} / tracking {}",
                summary.big_jump_gain, summary.tracking_gain
            );
            println!("  Dynamic shift bound: ±{} ms", summary.max_dynamic_shift_ms);
            println!("  Autoplay: {}", summary.autoplay);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
