pub mod evolution_engine;
pub mod gene_consumer;
pub mod genome;
pub mod individual;
pub mod operators;
pub mod progress;

pub use evolution_engine::{EvolutionEngine, EvolutionOutcome};
pub use gene_consumer::GeneConsumer;
pub use genome::{Gene, Genome};
pub use individual::{sort_by_fitness, Individual};
pub use progress::{ConsoleProgressCallback, ProgressCallback, SilentProgressCallback};
