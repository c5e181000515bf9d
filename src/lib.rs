//! Structured Grammatical Evolution.
//!
//! A grammar is loaded once, its direct recursion unrolled to a fixed depth
//! and every non-terminal given a fixed number of expansion slots. Genomes
//! hold one gene per non-terminal with that many production choices, and
//! the evolution engine breeds them against a pluggable [`Evaluator`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use sge::config::EvolutionConfig;
//! use sge::engines::evaluation::SymbolicRegression;
//! use sge::engines::generation::{ConsoleProgressCallback, EvolutionEngine};
//! use sge::engines::grammar::Grammar;
//!
//! let grammar = Arc::new(Grammar::from_file("grammars/quartic.bnf", 3)?);
//! let mut engine = EvolutionEngine::new(
//!     EvolutionConfig::default(),
//!     grammar,
//!     Box::new(SymbolicRegression::quartic()),
//! )?;
//! let outcome = engine.run(ConsoleProgressCallback)?;
//! println!("{:?}", outcome.best.phenotype);
//! # Ok::<(), sge::error::SgeError>(())
//! ```
//!
//! [`Evaluator`]: engines::evaluation::Evaluator

pub mod config;
pub mod data;
pub mod engines;
pub mod error;
pub mod types;

pub use error::{Result, SgeError};
