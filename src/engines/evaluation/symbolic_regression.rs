use crate::engines::evaluation::{Evaluation, Evaluator, Expression};
use crate::error::{Result, SgeError};

/// Symbolic regression over one variable: RMSE of the phenotype against a
/// target function.
///
/// The training error is the fitness; the error on held-out points is
/// reported as `test_error`. Phenotypes that do not parse, or evaluate to
/// non-finite values, score `f64::INFINITY`.
pub struct SymbolicRegression {
    training: Vec<(f64, f64)>,
    test: Vec<(f64, f64)>,
}

impl SymbolicRegression {
    pub fn new(training: Vec<(f64, f64)>, test: Vec<(f64, f64)>) -> Self {
        Self { training, test }
    }

    /// Sample `target` on `[start, end]` with the given step
    pub fn from_function<F: Fn(f64) -> f64>(target: F, start: f64, end: f64, step: f64) -> Vec<(f64, f64)> {
        let count = ((end - start) / step).round() as usize;
        (0..=count)
            .map(|i| {
                let x = start + i as f64 * step;
                (x, target(x))
            })
            .collect()
    }

    /// `x^4 + x^3 + x^2 + x`, trained on [-1, 1] and tested in between the
    /// training points
    pub fn quartic() -> Self {
        let target = |x: f64| x.powi(4) + x.powi(3) + x.powi(2) + x;
        Self::new(
            Self::from_function(target, -1.0, 1.0, 0.1),
            Self::from_function(target, -0.95, 0.95, 0.1),
        )
    }

    /// Look up a bundled target by name
    pub fn by_name(name: &str) -> Result<Self> {
        match name {
            "quartic" => Ok(Self::quartic()),
            other => Err(SgeError::Configuration(format!(
                "Unknown symbolic regression target {:?}",
                other
            ))),
        }
    }

    fn rmse(expression: &Expression, points: &[(f64, f64)]) -> f64 {
        if points.is_empty() {
            return 0.0;
        }
        let squared: f64 = points
            .iter()
            .map(|&(x, y)| (expression.eval(x) - y).powi(2))
            .sum();
        let rmse = (squared / points.len() as f64).sqrt();
        if rmse.is_finite() {
            rmse
        } else {
            f64::INFINITY
        }
    }
}

impl Evaluator for SymbolicRegression {
    fn evaluate(&self, phenotype: &str) -> Result<Evaluation> {
        let expression = match Expression::parse(phenotype) {
            Ok(expression) => expression,
            Err(e) => {
                log::debug!("Unparseable phenotype {:?}: {}", phenotype, e);
                return Ok(Evaluation::new(f64::INFINITY).with_test_error(f64::INFINITY));
            }
        };

        let training_error = Self::rmse(&expression, &self.training);
        let test_error = Self::rmse(&expression, &self.test);
        Ok(Evaluation::new(training_error).with_test_error(test_error))
    }
}
