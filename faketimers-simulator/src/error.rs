use faketimers_config::ConfigError;
use faketimers_core::TimerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Scenario validation failed: {0}")]
    Validation(String),

    #[error("Unknown timer '{0}' referenced by scenario step")]
    UnknownTimer(String),

    #[error("Timer operation failed: {0}")]
    Timer(#[from] TimerError),

    #[error("Fire count mismatch: {0}")]
    Invariant(String),

    #[error("Metrics error: {0}")]
    Metrics(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scenario file not found: {0}")]
    FileNotFound(String),

    #[error("Deserialization error: {0}")]
    Serde(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<validator::ValidationErrors> for SimulationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        SimulationError::Validation(errors.to_string())
    }
}
