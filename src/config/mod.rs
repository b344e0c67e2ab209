mod types;

pub use types::*;

use crate::{Error, Result};
use std::{env, io::ErrorKind};
use tracing::{debug, info};

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Loads configuration from `CONFIG_PATH` (or `config.yaml`), applies
/// environment overrides and validates the result.
pub async fn load() -> Result<Config> {
    let explicit_path = env::var("CONFIG_PATH").ok();
    let mut config = load_from(explicit_path.as_deref()).await?;
    config.apply_api_key_override(env::var(API_KEY_ENV).ok());
    config.validate()?;
    Ok(config)
}

/// Reads a YAML config file. A missing default file yields built-in
/// defaults; a missing explicitly named file is an error.
pub async fn load_from(path: Option<&str>) -> Result<Config> {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);

    debug!("Loading configuration from: {}", config_path);

    match tokio::fs::read_to_string(config_path).await {
        Ok(config_str) => Ok(serde_yaml::from_str(&config_str)?),
        Err(e) if e.kind() == ErrorKind::NotFound && path.is_none() => {
            info!(
                "No configuration file at {}, using built-in defaults",
                config_path
            );
            Ok(Config::default())
        }
        Err(e) => Err(e.into()),
    }
}

impl Config {
    pub fn apply_api_key_override(&mut self, api_key: Option<String>) {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.llm.api_key = key;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.llm.api_key.trim().is_empty() {
            return Err(Error::config(format!(
                "{API_KEY_ENV} environment variable is not set. \
                 Set it in the environment or as llm.api_key in the config file."
            )));
        }
        if self.llm.timeout_secs == 0 {
            return Err(Error::config("llm.timeout_secs must be greater than 0"));
        }

        let analysis = &self.analysis;
        if !(0.0..=2.0).contains(&analysis.temperature) {
            return Err(Error::config(format!(
                "analysis.temperature must be within 0.0..=2.0, got {}",
                analysis.temperature
            )));
        }
        if !(0.0..=1.0).contains(&analysis.top_p) {
            return Err(Error::config(format!(
                "analysis.top_p must be within 0.0..=1.0, got {}",
                analysis.top_p
            )));
        }
        if !(1000..=4000).contains(&analysis.max_tokens) {
            return Err(Error::config(format!(
                "analysis.max_tokens must be within 1000..=4000, got {}",
                analysis.max_tokens
            )));
        }
        if analysis.max_input_chars == 0 {
            return Err(Error::config(
                "analysis.max_input_chars must be greater than 0",
            ));
        }

        Ok(())
    }
}
