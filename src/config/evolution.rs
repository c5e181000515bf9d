use super::traits::{check_probability, ConfigSection};
use crate::error::SgeError;
use serde::{Deserialize, Serialize};

/// Seeds indexed by run number, so run N is reproducible on its own
pub const SEED_TABLE: [u64; 30] = [
    791_002, 843_912, 171_757, 463_283, 229_541, 618_224, 996_130, 305_875, 547_361, 122_089,
    860_474, 374_018, 705_236, 58_817, 914_503, 267_390, 482_965, 639_751, 90_128, 351_606,
    778_242, 186_537, 523_071, 947_884, 402_119, 665_340, 14_993, 829_457, 296_712, 571_068,
];

/// What to do when the evaluator fails on a phenotype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationErrorPolicy {
    /// Stop the run and return the error
    #[default]
    Abort,
    /// Rank the individual last and keep going
    WorstFitness,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub iterations: usize,
    pub elitism: usize,
    pub tournament_size: usize,
    pub crossover_probability: f64,
    pub mutation_probability: f64,
    /// Generations whose population is written to disk
    pub snapshot_generations: Vec<usize>,
    /// Index into `SEED_TABLE`
    pub run: usize,
    /// Overrides the seed table when set
    pub seed: Option<u64>,
    pub parallel_evaluation: bool,
    pub evaluation_error_policy: EvaluationErrorPolicy,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 1000,
            iterations: 51,
            elitism: 100,
            tournament_size: 3,
            crossover_probability: 0.9,
            mutation_probability: 0.05,
            snapshot_generations: vec![0, 25, 50],
            run: 0,
            seed: None,
            parallel_evaluation: false,
            evaluation_error_policy: EvaluationErrorPolicy::Abort,
        }
    }
}

impl EvolutionConfig {
    /// Seed for this run: the explicit override, else the run's table entry
    pub fn resolved_seed(&self) -> Result<u64, SgeError> {
        if let Some(seed) = self.seed {
            return Ok(seed);
        }
        SEED_TABLE.get(self.run).copied().ok_or_else(|| {
            SgeError::Configuration(format!(
                "Run index {} outside seed table of {}",
                self.run,
                SEED_TABLE.len()
            ))
        })
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), SgeError> {
        if self.population_size == 0 {
            return Err(SgeError::Configuration(
                "Population size must be at least 1".to_string(),
            ));
        }
        if self.iterations == 0 {
            return Err(SgeError::Configuration(
                "At least one iteration is required".to_string(),
            ));
        }
        if self.elitism > self.population_size {
            return Err(SgeError::Configuration(
                "Elitism cannot exceed the population size".to_string(),
            ));
        }
        if self.tournament_size == 0 || self.tournament_size > self.population_size {
            return Err(SgeError::Configuration(
                "Tournament size must be between 1 and the population size".to_string(),
            ));
        }
        check_probability("Crossover probability", self.crossover_probability)?;
        check_probability("Mutation probability", self.mutation_probability)?;
        self.resolved_seed()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(EvolutionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let config = EvolutionConfig {
            elitism: 2000,
            ..EvolutionConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EvolutionConfig {
            mutation_probability: 1.5,
            ..EvolutionConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EvolutionConfig {
            tournament_size: 0,
            ..EvolutionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_seed_resolution() {
        let config = EvolutionConfig {
            run: 2,
            ..EvolutionConfig::default()
        };
        assert_eq!(config.resolved_seed().unwrap(), SEED_TABLE[2]);

        let config = EvolutionConfig {
            run: 99,
            ..EvolutionConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EvolutionConfig {
            run: 99,
            seed: Some(5),
            ..EvolutionConfig::default()
        };
        assert_eq!(config.resolved_seed().unwrap(), 5);
    }
}
