//! Maven artifact coordinates

use crate::error::{CoreError, Result};
use crate::types::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_PACKAGING: &str = "jar";

/// Artifact coordinates `groupId:artifactId[:type[:classifier]]:version`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MavenCoordinates {
    pub group_id: String,
    pub artifact_id: String,
    pub packaging: String,
    pub classifier: Option<String>,
    pub version: String,
}

impl MavenCoordinates {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            packaging: DEFAULT_PACKAGING.to_string(),
            classifier: None,
            version: version.into(),
        }
    }

    /// Parse coordinates; the type defaults to `jar`
    pub fn parse(text: &str) -> Result<Self> {
        let parts: Vec<&str> = text.trim().split(':').map(str::trim).collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(CoreError::InvalidCoordinates(text.to_string()));
        }

        let (packaging, classifier) = match parts.len() {
            3 => (DEFAULT_PACKAGING, None),
            4 => (parts[2], None),
            5 => (parts[2], Some(parts[3].to_string())),
            _ => return Err(CoreError::InvalidCoordinates(text.to_string())),
        };

        Ok(Self {
            group_id: parts[0].to_string(),
            artifact_id: parts[1].to_string(),
            packaging: packaging.to_string(),
            classifier,
            version: parts[parts.len() - 1].to_string(),
        })
    }

    /// File name of the artifact, e.g. `foo-1.0-sources.jar`
    pub fn file_name(&self) -> String {
        match &self.classifier {
            Some(classifier) => format!(
                "{}-{}-{}.{}",
                self.artifact_id, self.version, classifier, self.packaging
            ),
            None => format!("{}-{}.{}", self.artifact_id, self.version, self.packaging),
        }
    }

    /// Path of the artifact relative to the root of a Maven layout repository
    pub fn repository_path(&self) -> PathBuf {
        let mut path: PathBuf = self.group_id.split('.').collect();
        path.push(&self.artifact_id);
        path.push(&self.version);
        path.push(self.file_name());
        path
    }

    /// Convert the Maven version to a structured version
    ///
    /// Leading dotted numbers become the numeric segments; whatever follows
    /// becomes the qualifier, e.g. `1.0-SNAPSHOT` is `1.0.0.SNAPSHOT`.
    pub fn osgi_version(&self) -> Version {
        let mut numbers: Vec<u64> = Vec::new();
        let mut rest = self.version.as_str();

        while numbers.len() < 3 {
            let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
            if digits == 0 {
                break;
            }
            numbers.push(rest[..digits].parse().unwrap_or(u64::MAX));
            rest = &rest[digits..];

            let continues = rest.starts_with('.')
                && rest[1..].starts_with(|c: char| c.is_ascii_digit())
                && numbers.len() < 3;
            if !continues {
                break;
            }
            rest = &rest[1..];
        }

        let qualifier: String = rest
            .trim_start_matches(['.', '-'])
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        Version {
            major: numbers.first().copied().unwrap_or(0),
            minor: numbers.get(1).copied().unwrap_or(0),
            micro: numbers.get(2).copied().unwrap_or(0),
            qualifier,
        }
    }
}

impl fmt::Display for MavenCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.packaging)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{}", classifier)?;
        }
        write!(f, ":{}", self.version)
    }
}

impl FromStr for MavenCoordinates {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        MavenCoordinates::parse(s)
    }
}
