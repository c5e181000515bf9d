use crate::error::Result;

/// Auxiliary key/value data returned with a quality score.
///
/// A `test_error` entry is reported in the progress report but never used
/// for selection.
pub type EvaluationInfo = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Lower is better
    pub quality: f64,
    pub info: EvaluationInfo,
}

impl Evaluation {
    pub fn new(quality: f64) -> Self {
        Self {
            quality,
            info: EvaluationInfo::new(),
        }
    }

    /// Non-finite errors are stored as `f64::MAX`, since JSON has no
    /// infinity and would otherwise drop the value.
    pub fn with_test_error(mut self, test_error: f64) -> Self {
        let test_error = if test_error.is_finite() { test_error } else { f64::MAX };
        self.info
            .insert("test_error".to_string(), serde_json::json!(test_error));
        self
    }
}

/// Scores a decoded phenotype.
///
/// Implementations must be shareable across threads so a population can be
/// evaluated in parallel.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, phenotype: &str) -> Result<Evaluation>;
}

impl<F> Evaluator for F
where
    F: Fn(&str) -> Result<Evaluation> + Send + Sync,
{
    fn evaluate(&self, phenotype: &str) -> Result<Evaluation> {
        self(phenotype)
    }
}
