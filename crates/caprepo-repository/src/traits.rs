//! Core trait definitions for the repository pattern
//!
//! - [`Repository`]: answers requirements with matching capabilities
//! - [`RepositoryStorage`]: durable store of resources behind a cache
//! - [`ArtifactResolver`]: turns artifact coordinates into a resource

use async_trait::async_trait;
use caprepo_core::{CapabilityRef, MavenCoordinates, Requirement, Resource};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{RepositoryResult, StorageStats};

/// A source of capabilities
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`; `find_providers` may be called
/// concurrently from independent tasks.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Name used in logs and warnings
    fn name(&self) -> &str;

    /// Every capability satisfying `requirement`
    ///
    /// Each returned capability keeps a reference to its owning resource.
    /// An empty result is not an error.
    async fn find_providers(&self, requirement: &Requirement)
        -> RepositoryResult<Vec<CapabilityRef>>;
}

#[async_trait]
impl<T: Repository + ?Sized> Repository for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn find_providers(
        &self,
        requirement: &Requirement,
    ) -> RepositoryResult<Vec<CapabilityRef>> {
        (**self).find_providers(requirement).await
    }
}

/// Durable resource store
///
/// Implementations serialize every read-modify-write cycle so concurrent
/// additions never lose an update.
#[async_trait]
pub trait RepositoryStorage: Send + Sync {
    /// Capabilities of stored resources satisfying `requirement`
    async fn find_providers(&self, requirement: &Requirement)
        -> RepositoryResult<Vec<CapabilityRef>>;

    /// Store `resource` unless an equivalent one is already present
    ///
    /// Returns the stored resource, which is the existing one for a
    /// duplicate.
    async fn add_resource(&self, resource: Arc<Resource>) -> RepositoryResult<Arc<Resource>>;

    /// Every stored resource, in storage order
    async fn resources(&self) -> RepositoryResult<Vec<Arc<Resource>>>;

    /// Repository-level attributes of the store document
    async fn repository_attributes(&self) -> RepositoryResult<BTreeMap<String, String>>;

    async fn stats(&self) -> RepositoryResult<StorageStats>;
}

/// Resolves artifact coordinates to a resource
#[async_trait]
pub trait ArtifactResolver: Send + Sync {
    /// The resource for `coordinates`, or `None` when there is no such artifact
    async fn resolve(&self, coordinates: &MavenCoordinates) -> RepositoryResult<Option<Resource>>;
}
