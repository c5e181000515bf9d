use super::{
    evolution::EvolutionConfig, grammar::GrammarConfig, output::OutputConfig,
    problem::ProblemConfig, traits::ConfigSection,
};
use crate::error::SgeError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub evolution: EvolutionConfig,
    pub grammar: GrammarConfig,
    pub output: OutputConfig,
    pub problem: ProblemConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), SgeError> {
        self.evolution.validate()?;
        self.grammar.validate()?;
        self.output.validate()?;
        self.problem.validate()?;
        Ok(())
    }

    pub fn from_toml(contents: &str) -> Result<Self, SgeError> {
        let config: AppConfig = toml::from_str(contents)
            .map_err(|e| SgeError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SgeError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SgeError::Configuration(format!("Failed to read config: {}", e)))?;

        let config = AppConfig::from_toml(&contents)?;
        *self.write()? = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SgeError> {
        let config = self.get()?;
        let toml_str = toml::to_string_pretty(&config)
            .map_err(|e| SgeError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)
            .map_err(|e| SgeError::Configuration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    pub fn get(&self) -> Result<AppConfig, SgeError> {
        self.config
            .read()
            .map(|config| config.clone())
            .map_err(|_| SgeError::Configuration("Config lock poisoned".to_string()))
    }

    /// Apply a change, keeping the previous config if the result is invalid
    pub fn update<F>(&self, f: F) -> Result<(), SgeError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.write()?;
        let mut updated = config.clone();
        f(&mut updated);
        updated.validate()?;
        *config = updated;
        Ok(())
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, AppConfig>, SgeError> {
        self.config
            .write()
            .map_err(|_| SgeError::Configuration("Config lock poisoned".to_string()))
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::evolution::EvaluationErrorPolicy;

    #[test]
    fn test_parse_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml(
            r#"
[evolution]
population_size = 50
elitism = 5
evaluation_error_policy = "worst_fitness"

[problem]
kind = "string_match"
target = "hello"
"#,
        )
        .unwrap();

        assert_eq!(config.evolution.population_size, 50);
        assert_eq!(config.evolution.tournament_size, 3);
        assert_eq!(config.evolution.evaluation_error_policy, EvaluationErrorPolicy::WorstFitness);
        assert_eq!(config.grammar.max_recursion_level, 3);
        assert_eq!(
            config.problem,
            ProblemConfig::StringMatch { target: "hello".to_string() }
        );
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(AppConfig::from_toml("[evolution]\npopulation_size = 0\n").is_err());
        assert!(AppConfig::from_toml("not toml at all = = =").is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sge.toml");

        let manager = ConfigManager::new();
        manager
            .update(|c| {
                c.evolution.population_size = 20;
                c.evolution.elitism = 2;
                c.evolution.snapshot_generations = vec![0, 5];
            })
            .unwrap();
        manager.save_to_file(&path).unwrap();

        let loaded = ConfigManager::new();
        loaded.load_from_file(&path).unwrap();
        let config = loaded.get().unwrap();
        assert_eq!(config.evolution.population_size, 20);
        assert_eq!(config.evolution.snapshot_generations, vec![0, 5]);
    }

    #[test]
    fn test_invalid_update_keeps_previous() {
        let manager = ConfigManager::new();
        assert!(manager.update(|c| c.evolution.population_size = 0).is_err());
        assert_eq!(manager.get().unwrap().evolution.population_size, 1000);
    }
}
