pub mod checkpoint;
pub mod report;

pub use checkpoint::{iteration_from_path, load_population, CheckpointStore};
pub use report::{GenerationStats, ProgressReport};
