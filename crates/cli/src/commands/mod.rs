//! Command implementations.

mod inspect;
mod replay;
mod validate;

pub use inspect::run_inspect;
pub use replay::run_replay;
pub use validate::run_validate;

use anyhow::{Context, Result};
use contracts::OverlayConfig;
use std::path::Path;

/// Load the optional configuration file, defaults otherwise
pub(crate) fn load_config(path: Option<&Path>) -> Result<OverlayConfig> {
    match path {
        Some(path) => config_loader::ConfigLoader::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(OverlayConfig::default()),
    }
}
