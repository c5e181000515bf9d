use std::fmt;

/// Statistics of one evaluated generation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationStats {
    pub generation: usize,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    /// `test_error` of the best individual, when the evaluator reports one
    pub test_error: Option<f64>,
}

impl fmt::Display for GenerationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.generation, self.best_fitness, self.mean_fitness)?;
        if let Some(test_error) = self.test_error {
            write!(f, ",{}", test_error)?;
        }
        Ok(())
    }
}

/// CSV progress report, one line per generation
#[derive(Debug, Clone, Default)]
pub struct ProgressReport {
    entries: Vec<GenerationStats>,
}

impl ProgressReport {
    pub const HEADER: &'static str = "Generation,Best,Mean";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stats: GenerationStats) {
        self.entries.push(stats);
    }

    pub fn entries(&self) -> &[GenerationStats] {
        &self.entries
    }

    pub fn to_csv(&self) -> String {
        let mut csv = String::from(Self::HEADER);
        csv.push('\n');
        for entry in &self.entries {
            csv.push_str(&entry.to_string());
            csv.push('\n');
        }
        csv
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_lines() {
        let mut report = ProgressReport::new();
        report.push(GenerationStats {
            generation: 0,
            best_fitness: 1.5,
            mean_fitness: 3.25,
            test_error: None,
        });
        report.push(GenerationStats {
            generation: 1,
            best_fitness: 0.5,
            mean_fitness: 2.0,
            test_error: Some(0.75),
        });

        assert_eq!(report.to_csv(), "Generation,Best,Mean\n0,1.5,3.25\n1,0.5,2,0.75\n");
    }
}
