//! Server configuration

use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

/// Server configuration, read from `PRICE_API_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory scanned for model/metadata pairs
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,

    /// Reference dataset used for feature defaults
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    /// Prediction target column in the reference dataset
    #[serde(default = "default_target_column")]
    pub target_column: String,
}

fn default_port() -> u16 {
    8000
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data/train.csv")
}

fn default_target_column() -> String {
    "SalePrice".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            models_dir: default_models_dir(),
            data_path: default_data_path(),
            target_column: default_target_column(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the environment.
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("PRICE_API"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_service() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.models_dir, PathBuf::from("models"));
        assert_eq!(config.target_column, "SalePrice");
    }
}
