use crate::error::SgeError;
use serde::{Deserialize, Serialize};

/// Trait for configuration sections
pub trait ConfigSection: Serialize + for<'de> Deserialize<'de> + Default + Clone {
    fn section_name() -> &'static str;
    fn validate(&self) -> Result<(), SgeError>;
}

pub(crate) fn check_probability(name: &str, value: f64) -> Result<(), SgeError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(SgeError::Configuration(format!(
            "{} must be between 0 and 1",
            name
        )));
    }
    Ok(())
}
