use crate::engines::evaluation::{EvaluationInfo, Evaluator};
use crate::engines::generation::genome::Genome;
use crate::engines::grammar::{Grammar, Mapper};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Member of the population
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    pub genotype: Genome,
    /// Lower is better; `None` until evaluated
    pub fitness: Option<f64>,
    pub phenotype: Option<String>,
    #[serde(default)]
    pub other_info: EvaluationInfo,
    /// Slots consumed per non-terminal during the last mapping
    #[serde(default)]
    pub mapping_values: Vec<usize>,
}

impl Individual {
    pub fn new(genotype: Genome) -> Self {
        let mapping_values = vec![0; genotype.len()];
        Self {
            genotype,
            fitness: None,
            phenotype: None,
            other_info: EvaluationInfo::new(),
            mapping_values,
        }
    }

    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Sort key: unevaluated and NaN fitness rank last
    pub fn fitness_key(&self) -> f64 {
        match self.fitness {
            Some(f) if !f.is_nan() => f,
            _ => f64::INFINITY,
        }
    }

    /// Forget everything derived from the genotype
    pub fn invalidate(&mut self) {
        self.fitness = None;
        self.phenotype = None;
        self.other_info.clear();
    }

    /// Map the genotype and score the phenotype.
    ///
    /// The phenotype and consumption counters are kept even when the
    /// evaluator fails.
    pub fn evaluate<E: Evaluator + ?Sized>(&mut self, grammar: &Grammar, evaluator: &E) -> Result<()> {
        let mapping = Mapper::new(grammar).map(&self.genotype)?;
        self.mapping_values = mapping.mapping_values;

        let result = evaluator.evaluate(&mapping.phenotype);
        self.phenotype = Some(mapping.phenotype);
        let evaluation = result?;
        self.fitness = Some(evaluation.quality);
        self.other_info = evaluation.info;
        Ok(())
    }

    /// `test_error` reported by the evaluator, if any
    pub fn test_error(&self) -> Option<f64> {
        self.other_info.get("test_error").and_then(|v| v.as_f64())
    }
}

/// Sort ascending by fitness, best first
pub fn sort_by_fitness(population: &mut [Individual]) {
    population.sort_by(|a, b| a.fitness_key().total_cmp(&b.fitness_key()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::evaluation::Evaluation;

    struct LengthEvaluator;

    impl Evaluator for LengthEvaluator {
        fn evaluate(&self, phenotype: &str) -> Result<Evaluation> {
            let mut info = EvaluationInfo::new();
            info.insert("test_error".to_string(), serde_json::json!(0.5));
            Ok(Evaluation {
                quality: phenotype.len() as f64,
                info,
            })
        }
    }

    #[test]
    fn test_evaluate_fills_fields() {
        let grammar = Grammar::from_source("<start> ::= <a><a>\n<a> ::= x | yy\n", 3).unwrap();
        let mut individual = Individual::new(Genome::new(vec![vec![0], vec![1, 0]]));

        individual.evaluate(&grammar, &LengthEvaluator).unwrap();

        assert_eq!(individual.phenotype.as_deref(), Some("yyx"));
        assert_eq!(individual.fitness, Some(3.0));
        assert_eq!(individual.mapping_values, vec![1, 2]);
        assert_eq!(individual.test_error(), Some(0.5));
    }

    #[test]
    fn test_sort_puts_unevaluated_last() {
        let mut population: Vec<Individual> = [Some(3.0), None, Some(f64::NAN), Some(1.0)]
            .into_iter()
            .map(|fitness| Individual {
                fitness,
                ..Individual::new(Genome::new(vec![vec![0]]))
            })
            .collect();

        sort_by_fitness(&mut population);

        assert_eq!(population[0].fitness, Some(1.0));
        assert_eq!(population[1].fitness, Some(3.0));
        assert!(population[2..].iter().all(|i| i.fitness_key().is_infinite()));
    }

    #[test]
    fn test_invalidate_clears_evaluation() {
        let mut individual = Individual::new(Genome::new(vec![vec![0]]));
        individual.fitness = Some(1.0);
        individual.phenotype = Some("x".to_string());
        individual.invalidate();
        assert!(!individual.is_evaluated());
        assert!(individual.phenotype.is_none());
    }
}
