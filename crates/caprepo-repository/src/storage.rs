//! File based resource store
//!
//! The store is one repository document, `repository.xml`, inside the
//! storage directory. It is read on first use and rewritten whole on every
//! addition: the new document goes to a temporary file which then replaces
//! the old one, so a failed write leaves the previous store intact.

use async_trait::async_trait;
use caprepo_codec::{read_all, write_all};
use caprepo_core::model::namespace::{MAVEN_IDENTITY_ATTRIBUTE, MAVEN_IDENTITY_NAMESPACE};
use caprepo_core::{AttributeValue, CapabilityRef, Requirement, Resource};
use path_absolutize::Absolutize;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
    error::RepositoryError, memory::collect_providers, traits::RepositoryStorage, RepositoryResult,
    StorageStats,
};

/// File name of the store document
pub const STORE_FILE: &str = "repository.xml";

const NAME_ATTRIBUTE: &str = "name";
const INCREMENT_ATTRIBUTE: &str = "increment";

/// Loaded store contents
#[derive(Debug, Default)]
struct StoreState {
    attributes: BTreeMap<String, String>,
    resources: Vec<Arc<Resource>>,
    increment: u64,
}

impl StoreState {
    /// The stored resource equivalent to `resource`, if any
    ///
    /// Resources with a maven identity are equivalent when their coordinates
    /// agree, other resources with an identity when their identity keys
    /// agree. Anything else only when structurally equal.
    fn find_equivalent(&self, resource: &Resource) -> Option<&Arc<Resource>> {
        match store_key(resource) {
            Some(key) => self
                .resources
                .iter()
                .find(|stored| store_key(stored).as_ref() == Some(&key)),
            None => self
                .resources
                .iter()
                .find(|stored| stored.as_ref() == resource),
        }
    }
}

/// Key under which a resource is deduplicated
#[derive(Debug, PartialEq, Eq)]
enum StoreKey {
    Maven(String),
    Identity(String),
}

fn store_key(resource: &Resource) -> Option<StoreKey> {
    resource
        .capabilities_in(MAVEN_IDENTITY_NAMESPACE)
        .find_map(|cap| cap.attribute(MAVEN_IDENTITY_ATTRIBUTE))
        .and_then(AttributeValue::as_str)
        .map(|coordinates| StoreKey::Maven(coordinates.to_string()))
        .or_else(|| resource.identity_key().map(StoreKey::Identity))
}

/// Resource store backed by a single file
pub struct FileStorage {
    name: String,
    directory: PathBuf,
    path: PathBuf,
    /// `None` until the store file has been read
    state: Mutex<Option<StoreState>>,
}

impl FileStorage {
    /// Create a store in `directory`
    ///
    /// Nothing is read or created until the store is first used.
    pub fn new<P: AsRef<Path>>(name: impl Into<String>, directory: P) -> RepositoryResult<Self> {
        let directory = directory
            .as_ref()
            .absolutize()
            .map_err(|_| RepositoryError::InvalidPath {
                path: directory.as_ref().to_path_buf(),
            })?
            .to_path_buf();
        let path = directory.join(STORE_FILE);

        Ok(Self {
            name: name.into(),
            directory,
            path,
            state: Mutex::new(None),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Location of the store document
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    async fn load(&self) -> RepositoryResult<StoreState> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No store at {}, starting empty", self.path.display());
                let mut attributes = BTreeMap::new();
                attributes.insert(NAME_ATTRIBUTE.to_string(), self.name.clone());
                return Ok(StoreState {
                    attributes,
                    ..StoreState::default()
                });
            }
            Err(e) => return Err(RepositoryError::storage(&self.path, e)),
        };

        let (attributes, resources) = read_all(bytes.as_slice())?;
        let increment = match attributes.get(INCREMENT_ATTRIBUTE) {
            Some(text) => text.parse().unwrap_or_else(|_| {
                warn!(
                    "Ignoring invalid increment '{}' in {}",
                    text,
                    self.path.display()
                );
                0
            }),
            None => 0,
        };
        debug!(
            "Loaded {} resources from {}",
            resources.len(),
            self.path.display()
        );

        Ok(StoreState {
            attributes,
            resources: resources.into_iter().map(Arc::new).collect(),
            increment,
        })
    }

    /// Run `f` on the loaded state, loading it first if needed
    async fn with_state<T>(&self, f: impl FnOnce(&StoreState) -> T) -> RepositoryResult<T> {
        let mut guard = self.state.lock().await;
        if guard.is_none() {
            *guard = Some(self.load().await?);
        }
        match guard.as_ref() {
            Some(state) => Ok(f(state)),
            None => Err(RepositoryError::Config("store state unavailable".to_string())),
        }
    }

    /// Replace the store file with a document holding `resources`
    async fn persist(
        &self,
        attributes: &BTreeMap<String, String>,
        resources: &[Arc<Resource>],
    ) -> RepositoryResult<()> {
        let owned: Vec<Resource> = resources.iter().map(|r| r.as_ref().clone()).collect();
        let document = write_all(Vec::new(), attributes, &owned)?;

        fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| RepositoryError::storage(&self.directory, e))?;

        let temp = self.path.with_extension("xml.tmp");
        fs::write(&temp, &document)
            .await
            .map_err(|e| RepositoryError::storage(&temp, e))?;
        fs::rename(&temp, &self.path)
            .await
            .map_err(|e| RepositoryError::storage(&self.path, e))?;
        Ok(())
    }
}

#[async_trait]
impl RepositoryStorage for FileStorage {
    async fn find_providers(
        &self,
        requirement: &Requirement,
    ) -> RepositoryResult<Vec<CapabilityRef>> {
        let resources = self.with_state(|state| state.resources.clone()).await?;
        collect_providers(resources.iter(), requirement)
    }

    async fn add_resource(&self, resource: Arc<Resource>) -> RepositoryResult<Arc<Resource>> {
        let mut guard = self.state.lock().await;
        if guard.is_none() {
            *guard = Some(self.load().await?);
        }
        let Some(state) = guard.as_mut() else {
            return Err(RepositoryError::Config("store state unavailable".to_string()));
        };

        if let Some(existing) = state.find_equivalent(&resource) {
            debug!("Resource already stored in {}", self.path.display());
            return Ok(Arc::clone(existing));
        }

        let increment = state.increment + 1;
        let mut attributes = state.attributes.clone();
        attributes.insert(INCREMENT_ATTRIBUTE.to_string(), increment.to_string());
        attributes
            .entry(NAME_ATTRIBUTE.to_string())
            .or_insert_with(|| self.name.clone());
        let mut resources = state.resources.clone();
        resources.push(Arc::clone(&resource));

        self.persist(&attributes, &resources).await?;

        state.attributes = attributes;
        state.resources = resources;
        state.increment = increment;
        debug!(
            "Stored resource {} in {} (increment {})",
            resource.identity_key().unwrap_or_default(),
            self.path.display(),
            increment
        );
        Ok(resource)
    }

    async fn resources(&self) -> RepositoryResult<Vec<Arc<Resource>>> {
        self.with_state(|state| state.resources.clone()).await
    }

    async fn repository_attributes(&self) -> RepositoryResult<BTreeMap<String, String>> {
        self.with_state(|state| state.attributes.clone()).await
    }

    async fn stats(&self) -> RepositoryResult<StorageStats> {
        let path = self.path.clone();
        self.with_state(|state| StorageStats {
            path,
            resources: state.resources.len(),
            capabilities: state
                .resources
                .iter()
                .map(|r| r.capabilities().len())
                .sum(),
            increment: state.increment,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caprepo_core::model::namespace::TYPE_BUNDLE;
    use caprepo_core::{Capability, ResourceBuilder, Version};
    use tempfile::TempDir;

    fn bundle(name: &str, version: Version) -> Arc<Resource> {
        let mut builder = ResourceBuilder::new();
        builder
            .add_identity_capability(name, version, TYPE_BUNDLE)
            .unwrap();
        Arc::new(builder.build())
    }

    #[tokio::test]
    async fn test_missing_store_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new("test", temp_dir.path().join("store")).unwrap();

        assert!(storage.resources().await.unwrap().is_empty());
        assert!(!storage.path().exists());
        assert_eq!(storage.stats().await.unwrap().increment, 0);
    }

    #[tokio::test]
    async fn test_add_resource_persists_and_bumps_increment() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new("test", temp_dir.path()).unwrap();

        storage.add_resource(bundle("a", Version::new(1, 0, 0))).await.unwrap();
        storage.add_resource(bundle("b", Version::new(1, 0, 0))).await.unwrap();

        let (attributes, resources) =
            read_all(std::fs::read(storage.path()).unwrap().as_slice()).unwrap();
        assert_eq!(resources.len(), 2);
        assert_eq!(attributes.get("increment").map(String::as_str), Some("2"));
        assert_eq!(attributes.get("name").map(String::as_str), Some("test"));
        assert!(!storage.path().with_extension("xml.tmp").exists());
    }

    #[tokio::test]
    async fn test_duplicate_identity_not_stored_twice() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new("test", temp_dir.path()).unwrap();

        let first = storage.add_resource(bundle("a", Version::new(1, 0, 0))).await.unwrap();
        let second = storage.add_resource(bundle("a", Version::new(1, 0, 0))).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        storage.add_resource(bundle("a", Version::new(2, 0, 0))).await.unwrap();
        let stats = storage.stats().await.unwrap();
        assert_eq!(stats.resources, 2);
        assert_eq!(stats.increment, 2);
    }

    #[tokio::test]
    async fn test_anonymous_resources_deduplicated_structurally() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new("test", temp_dir.path()).unwrap();

        let anonymous = || {
            let mut builder = ResourceBuilder::new();
            builder
                .add_capability(Capability::new("n").unwrap().with_attribute("a", "x"))
                .unwrap();
            Arc::new(builder.build())
        };
        storage.add_resource(anonymous()).await.unwrap();
        storage.add_resource(anonymous()).await.unwrap();
        assert_eq!(storage.resources().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_maven_coordinates_decide_equivalence() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new("test", temp_dir.path()).unwrap();

        // same identity key, different artifacts
        let artifact = |coordinates: &str| {
            let mut builder = ResourceBuilder::new();
            builder
                .add_capability(
                    Capability::new(MAVEN_IDENTITY_NAMESPACE)
                        .unwrap()
                        .with_attribute(MAVEN_IDENTITY_ATTRIBUTE, coordinates),
                )
                .unwrap();
            builder
                .add_identity_capability("core", Version::new(1, 0, 0), TYPE_BUNDLE)
                .unwrap();
            Arc::new(builder.build())
        };
        storage
            .add_resource(artifact("org.example:core:jar:1.0"))
            .await
            .unwrap();
        storage
            .add_resource(artifact("org.example:core:jar:sources:1.0"))
            .await
            .unwrap();
        storage
            .add_resource(artifact("org.example:core:jar:sources:1.0"))
            .await
            .unwrap();

        let stats = storage.stats().await.unwrap();
        assert_eq!(stats.resources, 2);
        assert_eq!(stats.increment, 2);
    }

    #[tokio::test]
    async fn test_unreadable_store_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(STORE_FILE), "<not-a-repository/>").unwrap();
        let storage = FileStorage::new("test", temp_dir.path()).unwrap();

        let err = storage
            .find_providers(&Requirement::identity("a"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Codec(_)));
    }

    #[tokio::test]
    async fn test_failed_write_keeps_state() {
        let temp_dir = TempDir::new().unwrap();
        // a directory where the temporary file should go
        std::fs::create_dir(temp_dir.path().join("repository.xml.tmp")).unwrap();
        let storage = FileStorage::new("test", temp_dir.path()).unwrap();

        let err = storage
            .add_resource(bundle("a", Version::new(1, 0, 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Storage { .. }));
        assert!(storage.resources().await.unwrap().is_empty());
    }
}
