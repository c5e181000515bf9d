pub mod evolution;
pub mod grammar;
pub mod manager;
pub mod output;
pub mod problem;
pub mod traits;

pub use evolution::{EvaluationErrorPolicy, EvolutionConfig, SEED_TABLE};
pub use grammar::GrammarConfig;
pub use manager::{AppConfig, ConfigManager};
pub use output::OutputConfig;
pub use problem::ProblemConfig;
