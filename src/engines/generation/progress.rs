use crate::data::report::GenerationStats;

/// Observer of an evolution run
pub trait ProgressCallback: Send {
    fn on_generation_start(&mut self, generation: usize);
    fn on_generation_complete(&mut self, stats: &GenerationStats);
    fn on_individual_evaluated(&mut self, evaluated: usize, total: usize);
}

/// Prints the progress report line of every generation
pub struct ConsoleProgressCallback;

impl ProgressCallback for ConsoleProgressCallback {
    fn on_generation_start(&mut self, _generation: usize) {}

    fn on_generation_complete(&mut self, stats: &GenerationStats) {
        println!("{}", stats);
    }

    fn on_individual_evaluated(&mut self, evaluated: usize, total: usize) {
        if evaluated % 100 == 0 || evaluated == total {
            log::debug!("  Evaluated {}/{} individuals", evaluated, total);
        }
    }
}

/// Ignores all progress
pub struct SilentProgressCallback;

impl ProgressCallback for SilentProgressCallback {
    fn on_generation_start(&mut self, _generation: usize) {}
    fn on_generation_complete(&mut self, _stats: &GenerationStats) {}
    fn on_individual_evaluated(&mut self, _evaluated: usize, _total: usize) {}
}
