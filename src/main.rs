use anyhow::Context;
use clap::Parser;
use sge::config::ConfigManager;
use sge::data::{iteration_from_path, load_population, CheckpointStore};
use sge::engines::generation::{ConsoleProgressCallback, EvolutionEngine};
use sge::engines::grammar::Grammar;
use std::path::PathBuf;
use std::sync::Arc;

/// Structured Grammatical Evolution runner
#[derive(Parser, Debug)]
#[command(name = "sge")]
#[command(version, about, long_about = None)]
struct Args {
    /// TOML run configuration
    config: PathBuf,

    /// Snapshot (`iteration_<g>.json`) to resume from at generation g
    resume_from: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let manager = ConfigManager::new();
    manager
        .load_from_file(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let config = manager.get()?;

    let grammar = Arc::new(Grammar::from_file(
        &config.grammar.path,
        config.grammar.max_recursion_level,
    )?);
    let evaluator = config.problem.build_evaluator()?;
    let store = CheckpointStore::new(
        &config.output.dumps_dir,
        &config.output.experiment_name,
        config.evolution.run,
    );

    let mut engine = EvolutionEngine::new(config.evolution.clone(), Arc::clone(&grammar), evaluator)?
        .with_checkpoints(store);

    let outcome = match args.resume_from {
        Some(path) => {
            let generation = iteration_from_path(&path)?;
            let population = load_population(&path, &grammar, engine.rng())?;
            engine.resume(population, generation, ConsoleProgressCallback)?
        }
        None => engine.run(ConsoleProgressCallback)?,
    };

    log::info!(
        "Best fitness {} for {:?}",
        outcome.best.fitness_key(),
        outcome.best.phenotype.as_deref().unwrap_or_default()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parses_config_and_optional_snapshot() {
        let args = Args::try_parse_from(["sge", "sge.toml"]).unwrap();
        assert_eq!(args.config, PathBuf::from("sge.toml"));
        assert!(args.resume_from.is_none());

        let args = Args::try_parse_from(["sge", "sge.toml", "dumps/q/run_0/iteration_25.json"]).unwrap();
        assert_eq!(args.resume_from, Some(PathBuf::from("dumps/q/run_0/iteration_25.json")));
    }

    #[test]
    fn test_rejects_missing_config_and_extra_arguments() {
        assert!(Args::try_parse_from(["sge"]).is_err());
        assert!(Args::try_parse_from(["sge", "a.toml", "b.json", "c"]).is_err());
    }
}
