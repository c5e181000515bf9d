use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SgeError {
    #[error("Grammar format error on line {line}: {message}")]
    GrammarFormat { line: usize, message: String },

    #[error("Non-terminal {name} is referenced but never defined")]
    UndefinedNonTerminal { name: String },

    #[error("Grammar source contains no rules")]
    EmptyGrammar,

    #[error("Recursive non-terminal {name} has no non-recursive alternative")]
    NoBaseCase { name: String },

    #[error("{name} is already defined, cannot unroll {recursive} into it")]
    LevelNameCollision { name: String, recursive: String },

    #[error("Unbounded recursion through {}", cycle.join(" -> "))]
    UnboundedRecursion { cycle: Vec<String> },

    #[error("Shape mismatch at {non_terminal}: expected {expected} slots, got {actual}")]
    ShapeMismatch {
        non_terminal: String,
        expected: usize,
        actual: usize,
    },

    #[error("Gene value {value} for {non_terminal} is outside 0..{productions}")]
    GeneOutOfRange {
        non_terminal: String,
        value: u32,
        productions: usize,
    },

    #[error("Mapping exhausted all {slots} slots of {non_terminal}")]
    SlotsExhausted { non_terminal: String, slots: usize },

    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Checkpoint error at {}: {message}", path.display())]
    Checkpoint { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl SgeError {
    pub(crate) fn checkpoint(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        SgeError::Checkpoint {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SgeError>;
