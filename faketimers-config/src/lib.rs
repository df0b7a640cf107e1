//! # faketimers Configuration
//!
//! Layered configuration for the timer engine and the scenario simulator.
//!
//! ## Features
//! - **Layering**: defaults, YAML files, then `FAKETIMERS_*` environment variables
//! - **Validation**: every loaded configuration is checked before use

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod engine;
mod error;
mod simulator;
mod validation;

pub use engine::EngineConfig;
pub use error::ConfigError;
pub use simulator::SimulatorConfig;

const BASE_FILE: &str = "config/faketimers.yaml";
const ENV_PREFIX: &str = "FAKETIMERS_";

/// Top‑level configuration container.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct FakeTimersConfig {
    #[validate(nested)]
    pub engine: EngineConfig,

    #[validate(nested)]
    pub simulator: SimulatorConfig,
}

impl FakeTimersConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `config/faketimers.yaml`, if present
    /// 3. `config/<FAKETIMERS_ENV>.yaml`, if present (`FAKETIMERS_ENV` defaults to `test`)
    /// 4. `FAKETIMERS_*` environment variables, `__` separating nested keys
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(FakeTimersConfig::default()));

        if Path::new(BASE_FILE).exists() {
            figment = figment.merge(Yaml::file(BASE_FILE));
        }

        let env = std::env::var("FAKETIMERS_ENV").unwrap_or_else(|_| "test".into());
        let env_file = format!("config/{}.yaml", env);
        if Path::new(&env_file).exists() {
            figment = figment.merge(Yaml::file(env_file));
        }

        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load configuration from a specific path, still honouring environment overrides.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        Self::extract(
            Figment::from(Serialized::defaults(FakeTimersConfig::default()))
                .merge(Yaml::file(path))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }
}
