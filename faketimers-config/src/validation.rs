//! Custom validation functions for configuration.

use std::path::PathBuf;

use validator::ValidationError;

/// Scenario files are YAML.
pub fn validate_scenario_extension(path: &PathBuf) -> Result<(), ValidationError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => Ok(()),
        _ => Err(ValidationError::new("scenario_must_be_yaml")),
    }
}
