//! CLI configuration

use crate::cli::OutputFormat;
use caprepo_repository::RepositoryConfig;
use serde::Deserialize;
use std::path::PathBuf;

/// CLI configuration
///
/// Read from `config/caprepo.{yaml,toml,json}` when present, then from
/// `CAPREPO_*` environment variables; nested keys use `__`, e.g.
/// `CAPREPO_REPOSITORY__NAME`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Repository configuration
    pub repository: RepositoryConfig,

    /// Default output format
    pub output: OutputFormat,

    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            repository: RepositoryConfig::default(),
            output: OutputFormat::Json,
            log_level: "caprepo=info".to_string(),
        }
    }
}

impl CliConfig {
    /// Load configuration from environment variables and config file
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if exists
        dotenvy::dotenv().ok();

        let config_result = config::Config::builder()
            .add_source(config::File::with_name("config/caprepo").required(false))
            .add_source(
                config::Environment::with_prefix("CAPREPO")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build();

        match config_result {
            Ok(cfg) => cfg
                .try_deserialize()
                .map_err(|e| anyhow::anyhow!("Failed to deserialize config: {}", e)),
            Err(e) => {
                tracing::info!("No usable configuration ({}), using defaults", e);
                Ok(Self::default())
            }
        }
    }

    /// Apply command line overrides
    pub fn with_overrides(
        mut self,
        storage_dir: Option<PathBuf>,
        maven_repository: Option<PathBuf>,
        output: Option<OutputFormat>,
    ) -> Self {
        if let Some(dir) = storage_dir {
            self.repository.storage_dir = Some(dir);
        }
        if let Some(dir) = maven_repository {
            self.repository.maven_repository = Some(dir);
        }
        if let Some(output) = output {
            self.output = output;
        }
        self
    }

    /// Maven repository root: configured, else `~/.m2/repository`
    pub fn maven_repository(&self) -> Option<PathBuf> {
        self.repository.maven_repository.clone().or_else(|| {
            std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".m2").join("repository"))
        })
    }
}
