use std::{fs, path::Path};

use anyhow::{Context, Result};
use trailnet_core::prelude::{SimplifyMode, TrailNetworkConfig};

/// Reads the configuration file, or the defaults when none is given
pub fn load_config(path: Option<&Path>) -> Result<TrailNetworkConfig> {
    let Some(path) = path else {
        tracing::info!("Using default configuration");
        return Ok(TrailNetworkConfig::default());
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
    let config: TrailNetworkConfig = toml::from_str(&text)
        .with_context(|| format!("Invalid configuration file {}", path.display()))?;
    tracing::info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Command-line values that take precedence over the configuration file
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub epsilon: Option<f64>,
    pub max_connect: Option<f64>,
    pub fixed_point: bool,
}

impl Overrides {
    pub fn apply(&self, config: &mut TrailNetworkConfig) {
        if let Some(epsilon) = self.epsilon {
            config.simplify.epsilon_degrees = epsilon;
        }
        if let Some(max_connect) = self.max_connect {
            config.routing.max_connect_distance_km = max_connect;
        }
        if self.fixed_point {
            config.simplify.mode = SimplifyMode::FixedPoint;
        }
    }
}
