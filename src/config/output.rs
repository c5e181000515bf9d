use super::traits::ConfigSection;
use crate::error::SgeError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where snapshots and the progress report go
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dumps_dir: PathBuf,
    pub experiment_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dumps_dir: PathBuf::from("dumps"),
            experiment_name: "sge".to_string(),
        }
    }
}

impl ConfigSection for OutputConfig {
    fn section_name() -> &'static str {
        "output"
    }

    fn validate(&self) -> Result<(), SgeError> {
        if self.experiment_name.is_empty() || self.experiment_name.contains(['/', '\\']) {
            return Err(SgeError::Configuration(
                "Experiment name must be a non-empty plain directory name".to_string(),
            ));
        }
        Ok(())
    }
}
