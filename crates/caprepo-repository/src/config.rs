//! Repository configuration
//!
//! Names the repository and locates its storage directory and the local
//! Maven repository used to resolve artifacts.

use path_absolutize::Absolutize;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{RepositoryError, RepositoryResult};

/// Default repository name
pub const DEFAULT_NAME: &str = "caprepo";
/// Sub-directory of the framework storage area holding the store
pub const STORAGE_SUBDIR: &str = "repository";
/// Storage area used when none is configured
pub const DEFAULT_STORAGE_AREA: &str = "osgi-store";

/// Repository configuration
///
/// # Examples
///
/// ```rust
/// use caprepo_repository::RepositoryConfig;
///
/// let config = RepositoryConfig::default().with_storage_dir("/var/lib/caprepo");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Repository name, recorded in the store document
    pub name: String,

    /// Explicit storage directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,

    /// Framework storage area; the store goes into its `repository` sub-directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework_storage: Option<PathBuf>,

    /// Root of a local Maven layout repository
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maven_repository: Option<PathBuf>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            storage_dir: None,
            framework_storage: None,
            maven_repository: None,
        }
    }
}

impl RepositoryConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = Some(dir.into());
        self
    }

    pub fn with_framework_storage(mut self, dir: impl Into<PathBuf>) -> Self {
        self.framework_storage = Some(dir.into());
        self
    }

    pub fn with_maven_repository(mut self, dir: impl Into<PathBuf>) -> Self {
        self.maven_repository = Some(dir.into());
        self
    }

    /// Absolute storage directory
    ///
    /// The explicit `storage_dir` wins; otherwise the `repository`
    /// sub-directory of the framework storage area, which defaults to
    /// `./osgi-store`.
    pub fn resolve_storage_dir(&self) -> RepositoryResult<PathBuf> {
        let dir = match (&self.storage_dir, &self.framework_storage) {
            (Some(dir), _) => dir.clone(),
            (None, Some(area)) => area.join(STORAGE_SUBDIR),
            (None, None) => Path::new(DEFAULT_STORAGE_AREA).join(STORAGE_SUBDIR),
        };
        absolute(&dir)
    }

    /// Absolute Maven repository root, if configured
    pub fn resolve_maven_repository(&self) -> RepositoryResult<Option<PathBuf>> {
        self.maven_repository.as_deref().map(absolute).transpose()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyField {
                field: "name".to_string(),
            });
        }
        let paths = [
            ("storage_dir", &self.storage_dir),
            ("framework_storage", &self.framework_storage),
            ("maven_repository", &self.maven_repository),
        ];
        for (field, path) in paths {
            if matches!(path, Some(p) if p.as_os_str().is_empty()) {
                return Err(ConfigError::EmptyField {
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn absolute(path: &Path) -> RepositoryResult<PathBuf> {
    path.absolutize()
        .map(|p| p.to_path_buf())
        .map_err(|_| RepositoryError::InvalidPath {
            path: path.to_path_buf(),
        })
}

/// Configuration error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A field is present but empty
    EmptyField { field: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EmptyField { field } => write!(f, "{} must not be empty", field),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for RepositoryError {
    fn from(err: ConfigError) -> Self {
        RepositoryError::Config(err.to_string())
    }
}
