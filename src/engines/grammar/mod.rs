pub mod filter;
pub(crate) mod loader;
pub mod mapper;
pub(crate) mod recursion;
pub(crate) mod references;
pub mod rules;

pub use mapper::{Mapper, Mapping};
pub use rules::{Grammar, DEFAULT_MAX_RECURSION_LEVEL};
