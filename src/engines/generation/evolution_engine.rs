use crate::config::{EvaluationErrorPolicy, EvolutionConfig};
use crate::config::traits::ConfigSection;
use crate::data::{CheckpointStore, GenerationStats, ProgressReport};
use crate::engines::evaluation::Evaluator;
use crate::engines::generation::{
    individual::{sort_by_fitness, Individual},
    operators::{crossover, mutate, random_genome, tournament_selection},
    progress::ProgressCallback,
};
use crate::engines::grammar::Grammar;
use crate::error::{Result, SgeError};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::sync::Arc;

/// Final state of a run
#[derive(Debug, Clone)]
pub struct EvolutionOutcome {
    pub best: Individual,
    /// Last evaluated population, best first
    pub population: Vec<Individual>,
    pub report: ProgressReport,
}

pub struct EvolutionEngine {
    config: EvolutionConfig,
    grammar: Arc<Grammar>,
    evaluator: Box<dyn Evaluator>,
    checkpoints: Option<CheckpointStore>,
    rng: StdRng,
}

impl EvolutionEngine {
    pub fn new(config: EvolutionConfig, grammar: Arc<Grammar>, evaluator: Box<dyn Evaluator>) -> Result<Self> {
        config.validate()?;
        let seed = config.resolved_seed()?;
        log::info!("Run {} seeded with {}", config.run, seed);

        Ok(Self {
            config,
            grammar,
            evaluator,
            checkpoints: None,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Write snapshots and the progress report under `store`
    pub fn with_checkpoints(mut self, store: CheckpointStore) -> Self {
        self.checkpoints = Some(store);
        self
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Generator for genomes and resumed snapshots, shared with the operators
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Run from a freshly generated population
    pub fn run<C: ProgressCallback>(&mut self, callback: C) -> Result<EvolutionOutcome> {
        let population = self.initialize_population();
        self.evolve(population, 0, callback)
    }

    /// Continue from a saved population at `start_generation`
    pub fn resume<C: ProgressCallback>(
        &mut self,
        population: Vec<Individual>,
        start_generation: usize,
        callback: C,
    ) -> Result<EvolutionOutcome> {
        if start_generation >= self.config.iterations {
            return Err(SgeError::Configuration(format!(
                "Cannot resume at generation {} of a {}-generation run",
                start_generation, self.config.iterations
            )));
        }
        for individual in &population {
            individual.genotype.validate(&self.grammar)?;
        }
        log::info!(
            "Resuming at generation {} with {} individuals",
            start_generation,
            population.len()
        );
        self.evolve(population, start_generation, callback)
    }

    fn initialize_population(&mut self) -> Vec<Individual> {
        (0..self.config.population_size)
            .map(|_| Individual::new(random_genome(&self.grammar, &mut self.rng)))
            .collect()
    }

    fn evolve<C: ProgressCallback>(
        &mut self,
        mut population: Vec<Individual>,
        start_generation: usize,
        mut callback: C,
    ) -> Result<EvolutionOutcome> {
        if population.is_empty() {
            return Err(SgeError::Configuration("Population is empty".to_string()));
        }
        if let Some(store) = &self.checkpoints {
            store.prepare()?;
        }

        let mut report = ProgressReport::new();
        let last_generation = self.config.iterations.saturating_sub(1);

        for generation in start_generation..self.config.iterations {
            callback.on_generation_start(generation);

            self.evaluate_population(&mut population, &mut callback)?;
            sort_by_fitness(&mut population);

            let stats = self.generation_stats(&population, generation);
            log::info!("{}", stats);
            callback.on_generation_complete(&stats);
            report.push(stats);

            if self.config.snapshot_generations.contains(&generation) {
                self.save_snapshot(&population, generation)?;
            }

            if generation == last_generation {
                break;
            }

            population = self.create_next_generation(&population);
        }

        if let Some(store) = &self.checkpoints {
            if !self.config.snapshot_generations.contains(&last_generation) {
                store.save_population(&population, last_generation)?;
            }
            let path = store.save_report(&report)?;
            log::info!("Progress report written to {}", path.display());
        }

        Ok(EvolutionOutcome {
            best: population[0].clone(),
            population,
            report,
        })
    }

    /// Evaluate every individual without a fitness
    fn evaluate_population<C: ProgressCallback>(
        &self,
        population: &mut [Individual],
        callback: &mut C,
    ) -> Result<()> {
        let grammar: &Grammar = &self.grammar;
        let evaluator: &dyn Evaluator = self.evaluator.as_ref();
        let policy = self.config.evaluation_error_policy;

        let evaluate = |individual: &mut Individual| -> Result<()> {
            match individual.evaluate(grammar, evaluator) {
                Err(SgeError::Evaluation(message)) if policy == EvaluationErrorPolicy::WorstFitness => {
                    log::warn!(
                        "Evaluation failed for {:?}: {}",
                        individual.phenotype.as_deref().unwrap_or_default(),
                        message
                    );
                    individual.fitness = Some(f64::INFINITY);
                    individual.other_info.clear();
                    individual
                        .other_info
                        .insert("error".to_string(), serde_json::Value::String(message));
                    Ok(())
                }
                other => other,
            }
        };

        let total = population.iter().filter(|i| !i.is_evaluated()).count();
        if self.config.parallel_evaluation {
            population
                .par_iter_mut()
                .filter(|individual| !individual.is_evaluated())
                .try_for_each(evaluate)?;
            callback.on_individual_evaluated(total, total);
        } else {
            let pending = population.iter_mut().filter(|individual| !individual.is_evaluated());
            for (i, individual) in pending.enumerate() {
                evaluate(individual)?;
                callback.on_individual_evaluated(i + 1, total);
            }
        }
        Ok(())
    }

    fn generation_stats(&self, population: &[Individual], generation: usize) -> GenerationStats {
        let best = &population[0];
        let total: f64 = population.iter().map(|i| i.fitness_key()).sum();
        GenerationStats {
            generation,
            best_fitness: best.fitness_key(),
            mean_fitness: total / population.len() as f64,
            test_error: best.test_error(),
        }
    }

    fn save_snapshot(&self, population: &[Individual], generation: usize) -> Result<()> {
        if let Some(store) = &self.checkpoints {
            store.save_population(population, generation)?;
        }
        Ok(())
    }

    /// Elites carried over unchanged, the rest bred by (crossover or
    /// selection) followed by mutation. `population` must be sorted.
    fn create_next_generation(&mut self, population: &[Individual]) -> Vec<Individual> {
        let size = self.config.population_size;
        let mut next_generation: Vec<Individual> = population
            .iter()
            .take(self.config.elitism.min(size))
            .cloned()
            .collect();

        while next_generation.len() < size {
            let mut child = if self.rng.gen::<f64>() < self.config.crossover_probability {
                let parent1 = tournament_selection(population, self.config.tournament_size, &mut self.rng);
                let parent2 = tournament_selection(population, self.config.tournament_size, &mut self.rng);
                crossover(&parent1, &parent2, &mut self.rng)
            } else {
                tournament_selection(population, self.config.tournament_size, &mut self.rng)
            };

            mutate(
                &mut child,
                &self.grammar,
                self.config.mutation_probability,
                &mut self.rng,
            );
            next_generation.push(child);
        }

        next_generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::evaluation::{Evaluation, StringMatch};
    use crate::engines::generation::progress::SilentProgressCallback;

    const GRAMMAR: &str = "<start> ::= <c><c><c>\n<c> ::= a | b | c | d\n";

    fn config() -> EvolutionConfig {
        EvolutionConfig {
            population_size: 10,
            iterations: 4,
            elitism: 2,
            tournament_size: 2,
            snapshot_generations: vec![],
            seed: Some(11),
            ..EvolutionConfig::default()
        }
    }

    fn engine(config: EvolutionConfig, evaluator: Box<dyn Evaluator>) -> EvolutionEngine {
        let grammar = Arc::new(Grammar::from_source(GRAMMAR, 3).unwrap());
        EvolutionEngine::new(config, grammar, evaluator).unwrap()
    }

    #[test]
    fn test_run_is_reproducible() {
        let a = engine(config(), Box::new(StringMatch::new("abc")))
            .run(SilentProgressCallback)
            .unwrap();
        let b = engine(config(), Box::new(StringMatch::new("abc")))
            .run(SilentProgressCallback)
            .unwrap();

        assert_eq!(a.best.phenotype, b.best.phenotype);
        assert_eq!(a.report.entries(), b.report.entries());
        assert_eq!(a.report.entries().len(), 4);
    }

    #[test]
    fn test_best_fitness_never_worsens_with_elitism() {
        let outcome = engine(config(), Box::new(StringMatch::new("dcb")))
            .run(SilentProgressCallback)
            .unwrap();

        let bests: Vec<f64> = outcome.report.entries().iter().map(|s| s.best_fitness).collect();
        assert!(bests.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(outcome.population.len(), 10);
    }

    #[test]
    fn test_parallel_evaluation_matches_sequential() {
        let sequential = engine(config(), Box::new(StringMatch::new("bad")))
            .run(SilentProgressCallback)
            .unwrap();
        let parallel = engine(
            EvolutionConfig {
                parallel_evaluation: true,
                ..config()
            },
            Box::new(StringMatch::new("bad")),
        )
        .run(SilentProgressCallback)
        .unwrap();

        assert_eq!(sequential.report.entries(), parallel.report.entries());
        assert_eq!(sequential.best.genotype, parallel.best.genotype);
    }

    #[test]
    fn test_evaluation_error_aborts_by_default() {
        let failing = |_: &str| -> Result<Evaluation> { Err(SgeError::Evaluation("boom".to_string())) };
        let result = engine(config(), Box::new(failing)).run(SilentProgressCallback);
        assert!(matches!(result, Err(SgeError::Evaluation(_))));
    }

    #[test]
    fn test_evaluation_error_worst_fitness_policy() {
        let picky = |phenotype: &str| -> Result<Evaluation> {
            if phenotype.starts_with('a') {
                Err(SgeError::Evaluation("starts with a".to_string()))
            } else {
                Ok(Evaluation::new(1.0))
            }
        };
        let outcome = engine(
            EvolutionConfig {
                evaluation_error_policy: EvaluationErrorPolicy::WorstFitness,
                ..config()
            },
            Box::new(picky),
        )
        .run(SilentProgressCallback)
        .unwrap();

        for individual in &outcome.population {
            let starts_with_a = individual.phenotype.as_deref().is_some_and(|p| p.starts_with('a'));
            if starts_with_a {
                assert_eq!(individual.fitness, Some(f64::INFINITY));
                assert!(individual.other_info.contains_key("error"));
            } else {
                assert_eq!(individual.fitness, Some(1.0));
            }
        }
    }

    #[test]
    fn test_resume_past_end_rejected() {
        let mut engine = engine(config(), Box::new(StringMatch::new("abc")));
        let population = vec![Individual::new(random_genome(engine.grammar(), &mut StdRng::seed_from_u64(0)))];
        assert!(engine.resume(population, 4, SilentProgressCallback).is_err());
    }
}
