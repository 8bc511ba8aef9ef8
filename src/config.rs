//! Engine configuration.
//!
//! Configuration is loaded from multiple sources in priority order:
//! 1. Command-line flags (applied by the caller)
//! 2. Environment variables (`BF_CODE_ADDR_BITS`, `BF_TAPE_ADDR_BITS`)
//! 3. A config file (`--config <path>`, or `./bf-engine.toml`)
//! 4. Built-in defaults
//!
//! # Config File Format
//!
//! ```toml
//! # bf-engine.toml
//! code_addr_bits = 8
//! tape_addr_bits = 8
//! ```

use crate::cpu::{Geometry, GeometryError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Name of the project-local config file.
pub const LOCAL_CONFIG_FILE: &str = "bf-engine.toml";

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Program store address width.
    pub code_addr_bits: Option<u8>,

    /// Data tape address width.
    pub tape_addr_bits: Option<u8>,
}

impl Config {
    /// Load configuration from the environment and a config file.
    ///
    /// With `path`, that file must exist and parse. Without it,
    /// `./bf-engine.toml` is used if present and skipped with a warning if
    /// it cannot be read.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        match path {
            Some(path) => config.merge(Self::load_from_file(path)?),
            None => {
                let local = Path::new(LOCAL_CONFIG_FILE);
                if local.exists() {
                    match Self::load_from_file(local) {
                        Ok(file_config) => config.merge(file_config),
                        Err(e) => log::warn!("ignoring {}: {}", local.display(), e),
                    }
                }
            }
        }

        config.apply_env_overrides()?;

        Ok(config)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Merge another config into this one.
    /// Only overrides fields that are Some in the other config.
    pub fn merge(&mut self, other: Self) {
        if other.code_addr_bits.is_some() {
            self.code_addr_bits = other.code_addr_bits;
        }
        if other.tape_addr_bits.is_some() {
            self.tape_addr_bits = other.tape_addr_bits;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(bits) = env_bits("BF_CODE_ADDR_BITS")? {
            log::info!("using BF_CODE_ADDR_BITS={} from environment", bits);
            self.code_addr_bits = Some(bits);
        }
        if let Some(bits) = env_bits("BF_TAPE_ADDR_BITS")? {
            log::info!("using BF_TAPE_ADDR_BITS={} from environment", bits);
            self.tape_addr_bits = Some(bits);
        }
        Ok(())
    }

    /// Resolve to a validated geometry, filling gaps with defaults.
    pub fn geometry(&self) -> Result<Geometry, ConfigError> {
        let defaults = Geometry::default();
        Ok(Geometry::new(
            self.code_addr_bits.unwrap_or(defaults.code_addr_bits()),
            self.tape_addr_bits.unwrap_or(defaults.tape_addr_bits()),
        )?)
    }

    /// Generate a sample config file content.
    pub fn sample_config() -> String {
        r#"# bf-engine configuration
# Place this file at ./bf-engine.toml or pass --config <path>

# Program store holds 2^code_addr_bits bytes
code_addr_bits = 8

# Data tape holds 2^tape_addr_bits cells
tape_addr_bits = 8
"#
        .to_string()
    }
}

fn env_bits(name: &'static str) -> Result<Option<u8>, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { name, value }),
        Err(_) => Ok(None),
    }
}

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{name}={value:?} is not an address width")]
    InvalidEnv { name: &'static str, value: String },

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
