use crate::data::report::ProgressReport;
use crate::engines::evaluation::EvaluationInfo;
use crate::engines::generation::{genome::Genome, individual::Individual, operators::random_genome};
use crate::engines::grammar::Grammar;
use crate::error::{Result, SgeError};
use rand::Rng;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const SNAPSHOT_PREFIX: &str = "iteration_";
const SNAPSHOT_EXTENSION: &str = "json";
const REPORT_FILE: &str = "progress_report.csv";

/// Snapshot entry as read back; `genotype` may be missing in snapshots
/// that only kept the evaluation results
#[derive(Debug, Deserialize)]
struct StoredIndividual {
    #[serde(default)]
    genotype: Option<Genome>,
    #[serde(default)]
    fitness: Option<f64>,
    #[serde(default)]
    phenotype: Option<String>,
    #[serde(default)]
    other_info: EvaluationInfo,
    #[serde(default)]
    mapping_values: Option<Vec<usize>>,
}

/// Output directory of one run: `<dumps_dir>/<experiment>/run_<run>/`
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    run_dir: PathBuf,
}

impl CheckpointStore {
    pub fn new<P: AsRef<Path>>(dumps_dir: P, experiment_name: &str, run: usize) -> Self {
        Self {
            run_dir: dumps_dir
                .as_ref()
                .join(experiment_name)
                .join(format!("run_{}", run)),
        }
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.run_dir).map_err(|e| SgeError::checkpoint(&self.run_dir, e))
    }

    pub fn snapshot_path(&self, generation: usize) -> PathBuf {
        self.run_dir
            .join(format!("{}{}.{}", SNAPSHOT_PREFIX, generation, SNAPSHOT_EXTENSION))
    }

    pub fn report_path(&self) -> PathBuf {
        self.run_dir.join(REPORT_FILE)
    }

    /// Write the population of `generation` as a JSON array
    pub fn save_population(&self, population: &[Individual], generation: usize) -> Result<PathBuf> {
        let path = self.snapshot_path(generation);
        let json = serde_json::to_string(population).map_err(|e| SgeError::checkpoint(&path, e))?;
        fs::write(&path, json).map_err(|e| SgeError::checkpoint(&path, e))?;
        log::info!("Saved generation {} snapshot to {}", generation, path.display());
        Ok(path)
    }

    pub fn save_report(&self, report: &ProgressReport) -> Result<PathBuf> {
        let path = self.report_path();
        fs::write(&path, report.to_csv()).map_err(|e| SgeError::checkpoint(&path, e))?;
        Ok(path)
    }
}

/// Generation index encoded in a snapshot file name (`iteration_<g>.json`)
pub fn iteration_from_path(path: &Path) -> Result<usize> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.rsplit('_').next())
        .and_then(|index| index.parse().ok())
        .ok_or_else(|| SgeError::checkpoint(path, "file name does not end in _<generation>"))
}

/// Load a snapshot for `grammar`.
///
/// Stored genotypes are validated against the grammar. Entries without one
/// get a fresh random genome and are re-evaluated.
pub fn load_population<R: Rng>(path: &Path, grammar: &Grammar, rng: &mut R) -> Result<Vec<Individual>> {
    let contents = fs::read_to_string(path).map_err(|e| SgeError::checkpoint(path, e))?;
    let stored: Vec<StoredIndividual> =
        serde_json::from_str(&contents).map_err(|e| SgeError::checkpoint(path, e))?;

    let mut regenerated = 0;
    let population = stored
        .into_iter()
        .map(|entry| match entry.genotype {
            Some(genotype) => {
                genotype.validate(grammar)?;
                let mapping_values = entry
                    .mapping_values
                    .filter(|values| values.len() == grammar.len())
                    .unwrap_or_else(|| vec![0; grammar.len()]);
                Ok(Individual {
                    genotype,
                    fitness: entry.fitness,
                    phenotype: entry.phenotype,
                    other_info: entry.other_info,
                    mapping_values,
                })
            }
            None => {
                regenerated += 1;
                Ok(Individual::new(random_genome(grammar, rng)))
            }
        })
        .collect::<Result<Vec<_>>>()?;

    if regenerated > 0 {
        log::warn!(
            "{}: {} individuals had no genotype and were regenerated",
            path.display(),
            regenerated
        );
    }
    Ok(population)
}
