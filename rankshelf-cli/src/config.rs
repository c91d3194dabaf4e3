/// Config file loading and creation for the rankshelf CLI.
///
/// Config lives at ~/.config/rankshelf/config.toml.
/// All fields are optional. CLI args override config values.
use anyhow::{Context, Result, bail};
use rankshelf_core::EngineConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RankshelfConfig {
    pub max_iterations: Option<usize>,
    pub tolerance: Option<f64>,
    pub prior_strength: Option<f64>,
    pub alpha: Option<f64>,
    pub max_tries: Option<usize>,
    pub seed: Option<u64>,
}

impl RankshelfConfig {
    /// Engine configuration with file values layered over the library defaults.
    pub fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default();
        if let Some(v) = self.max_iterations {
            config.fit.max_iterations = v;
        }
        if let Some(v) = self.tolerance {
            config.fit.tolerance = v;
        }
        if let Some(v) = self.prior_strength {
            config.fit.prior_strength = v;
        }
        if let Some(v) = self.alpha {
            config.prediction.alpha = v;
        }
        if let Some(v) = self.max_tries {
            config.selector.max_tries = v;
        }
        config
    }
}

const DEFAULT_CONFIG_TEMPLATE: &str = "\
# rankshelf configuration
# All values here can be overridden by CLI flags.

# Maximum Bradley-Terry (MM) iterations per fit
# max_iterations = 200

# Stop fitting once no strength moves more than this
# tolerance = 1e-6

# Virtual-tie prior between every pair of items (0 disables it)
# prior_strength = 1.0

# Prediction blend: share of the fitted strength vs. content similarity
# alpha = 0.7

# Candidate pairs sampled per next-pair suggestion
# max_tries = 200

# Fixed random seed for reproducible pair suggestions and simulations
# seed = 42
";

/// Returns the default config path: ~/.config/rankshelf/config.toml
pub fn config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("rankshelf").join("config.toml"))
}

pub fn parse_config(content: &str) -> Result<RankshelfConfig> {
    Ok(toml::from_str(content)?)
}

/// Load config from a file path. Returns default (all None) if file doesn't exist.
pub fn load_config(path: &Path) -> Result<RankshelfConfig> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_config(&content)
            .with_context(|| format!("Failed to parse config at {}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RankshelfConfig::default()),
        Err(e) => Err(e).with_context(|| format!("Failed to read config at {}", path.display())),
    }
}

/// Create the default config file. Errors if it already exists.
pub fn create_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("Config file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    std::fs::write(path, DEFAULT_CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write config to {}", path.display()))
}
