//! CLI command implementations.

pub mod leagues;
pub mod track;

use std::path::Path;

use ladder_core::TrackerConfig;
use tracing::{info, warn};

/// Load the tracker configuration, falling back to defaults
pub fn load_config(path: &Path) -> TrackerConfig {
    match TrackerConfig::load(path) {
        Ok(config) => {
            info!("Loaded config from {}", path.display());
            config
        }
        Err(ladder_core::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            TrackerConfig::default()
        }
        Err(e) => {
            warn!("Failed to load config: {}, using defaults", e);
            TrackerConfig::default()
        }
    }
}
