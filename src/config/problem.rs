use super::traits::ConfigSection;
use crate::engines::evaluation::{Evaluator, StringMatch, SymbolicRegression};
use crate::error::SgeError;
use serde::{Deserialize, Serialize};

/// Bundled evaluator used by the `sge` binary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProblemConfig {
    SymbolicRegression { target: String },
    StringMatch { target: String },
}

impl Default for ProblemConfig {
    fn default() -> Self {
        ProblemConfig::SymbolicRegression {
            target: "quartic".to_string(),
        }
    }
}

impl ProblemConfig {
    pub fn build_evaluator(&self) -> Result<Box<dyn Evaluator>, SgeError> {
        Ok(match self {
            ProblemConfig::SymbolicRegression { target } => {
                Box::new(SymbolicRegression::by_name(target)?)
            }
            ProblemConfig::StringMatch { target } => Box::new(StringMatch::new(target)),
        })
    }
}

impl ConfigSection for ProblemConfig {
    fn section_name() -> &'static str {
        "problem"
    }

    fn validate(&self) -> Result<(), SgeError> {
        self.build_evaluator().map(|_| ())
    }
}
