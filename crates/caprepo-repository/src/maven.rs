//! Repository answering maven identity requirements through a resolver

use async_trait::async_trait;
use caprepo_core::filter::{Filter, FilterOp};
use caprepo_core::model::namespace::{
    MAVEN_IDENTITY_ATTRIBUTE, MAVEN_IDENTITY_NAMESPACE, TYPE_BUNDLE,
};
use caprepo_core::{
    AttributeValue, CapabilityRef, Capability, MavenCoordinates, Requirement, Resource,
    ResourceBuilder,
};
use path_absolutize::Absolutize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::debug;

use crate::{
    error::RepositoryError,
    memory::collect_providers,
    traits::{ArtifactResolver, Repository},
    RepositoryResult,
};

/// Coordinates named by a maven identity requirement
///
/// Taken from the `maven.identity` attribute, else from an equality test
/// on that attribute in the filter.
pub fn requirement_coordinates(
    requirement: &Requirement,
) -> RepositoryResult<Option<MavenCoordinates>> {
    if requirement.namespace() != MAVEN_IDENTITY_NAMESPACE {
        return Ok(None);
    }
    if let Some(AttributeValue::String(text)) = requirement.attribute(MAVEN_IDENTITY_ATTRIBUTE) {
        return Ok(Some(MavenCoordinates::parse(text)?));
    }
    match requirement.parsed_filter()? {
        Some(filter) => match identity_literal(&filter) {
            Some(text) => Ok(Some(MavenCoordinates::parse(text)?)),
            None => Ok(None),
        },
        None => Ok(None),
    }
}

fn identity_literal(filter: &Filter) -> Option<&str> {
    match filter {
        Filter::Compare {
            attribute,
            op: FilterOp::Equal,
            value,
        } if attribute == MAVEN_IDENTITY_ATTRIBUTE => Some(value),
        Filter::And(filters) => filters.iter().find_map(identity_literal),
        _ => None,
    }
}

/// Repository delegating maven identity requirements to a resolver
///
/// Requirements in other namespaces have no providers here.
pub struct MavenDelegateRepository<R> {
    name: String,
    resolver: R,
}

impl<R: ArtifactResolver> MavenDelegateRepository<R> {
    pub fn new(name: impl Into<String>, resolver: R) -> Self {
        Self {
            name: name.into(),
            resolver,
        }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }
}

#[async_trait]
impl<R: ArtifactResolver> Repository for MavenDelegateRepository<R> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find_providers(
        &self,
        requirement: &Requirement,
    ) -> RepositoryResult<Vec<CapabilityRef>> {
        let Some(coordinates) = requirement_coordinates(requirement)? else {
            return Ok(Vec::new());
        };

        let resource = self.resolver.resolve(&coordinates).await.map_err(|e| match e {
            RepositoryError::Retrieval(_) => e,
            other => RepositoryError::Retrieval(format!("{}: {}", coordinates, other)),
        })?;

        match resource {
            Some(resource) => {
                debug!("{}: resolved {}", self.name, coordinates);
                collect_providers([&Arc::new(resource)], requirement)
            }
            None => {
                debug!("{}: no artifact for {}", self.name, coordinates);
                Ok(Vec::new())
            }
        }
    }
}

/// Resolver over a local directory in Maven repository layout
pub struct LocalMavenResolver {
    root: PathBuf,
}

impl LocalMavenResolver {
    pub fn new<P: AsRef<Path>>(root: P) -> RepositoryResult<Self> {
        let root = root
            .as_ref()
            .absolutize()
            .map_err(|_| RepositoryError::InvalidPath {
                path: root.as_ref().to_path_buf(),
            })?
            .to_path_buf();
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the artifact for `coordinates` is expected
    pub fn artifact_path(&self, coordinates: &MavenCoordinates) -> PathBuf {
        self.root.join(coordinates.repository_path())
    }
}

#[async_trait]
impl ArtifactResolver for LocalMavenResolver {
    async fn resolve(&self, coordinates: &MavenCoordinates) -> RepositoryResult<Option<Resource>> {
        let path = self.artifact_path(coordinates);
        let metadata = match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(RepositoryError::Retrieval(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        };

        Ok(Some(artifact_resource(coordinates, &path, metadata.len())?))
    }
}

/// Resource describing the artifact at `path`
///
/// Carries the maven identity, an identity named after the artifact and a
/// content capability pointing at the file.
pub fn artifact_resource(
    coordinates: &MavenCoordinates,
    path: &Path,
    size: u64,
) -> RepositoryResult<Resource> {
    let mut builder = ResourceBuilder::new();
    builder.add_capability(
        Capability::new(MAVEN_IDENTITY_NAMESPACE)?
            .with_attribute(MAVEN_IDENTITY_ATTRIBUTE, coordinates.to_string()),
    )?;
    builder.add_identity_capability(
        &coordinates.artifact_id,
        coordinates.osgi_version(),
        TYPE_BUNDLE,
    )?;
    builder.add_content_capability(&file_url(path), Some(size))?;
    Ok(builder.build())
}

fn file_url(path: &Path) -> String {
    let text = path.to_string_lossy().replace('\\', "/");
    if text.starts_with('/') {
        format!("file://{}", text)
    } else {
        format!("file:///{}", text)
    }
}
