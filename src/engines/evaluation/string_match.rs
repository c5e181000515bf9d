use crate::engines::evaluation::{Evaluation, Evaluator};
use crate::error::Result;

/// Distance of the phenotype to a fixed target string: mismatching
/// positions plus the difference in length.
pub struct StringMatch {
    target: Vec<char>,
}

impl StringMatch {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.chars().collect(),
        }
    }
}

impl Evaluator for StringMatch {
    fn evaluate(&self, phenotype: &str) -> Result<Evaluation> {
        let candidate: Vec<char> = phenotype.chars().collect();
        let mismatches = candidate
            .iter()
            .zip(&self.target)
            .filter(|(a, b)| a != b)
            .count();
        let length_difference = candidate.len().abs_diff(self.target.len());
        Ok(Evaluation::new((mismatches + length_difference) as f64))
    }
}
