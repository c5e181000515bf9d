use super::traits::ConfigSection;
use crate::engines::grammar::DEFAULT_MAX_RECURSION_LEVEL;
use crate::error::SgeError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarConfig {
    pub path: PathBuf,
    /// Depth of the chain each recursive non-terminal is unrolled into
    pub max_recursion_level: usize,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("grammars/quartic.bnf"),
            max_recursion_level: DEFAULT_MAX_RECURSION_LEVEL,
        }
    }
}

impl ConfigSection for GrammarConfig {
    fn section_name() -> &'static str {
        "grammar"
    }

    fn validate(&self) -> Result<(), SgeError> {
        if self.path.as_os_str().is_empty() {
            return Err(SgeError::Configuration(
                "Grammar path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
