//! In-memory repository

use async_trait::async_trait;
use caprepo_core::{matches, CapabilityRef, Requirement, Resource};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{traits::Repository, RepositoryResult};

/// Capabilities of `resources` satisfying `requirement`, in order
///
/// A malformed filter fails the whole query instead of matching nothing.
pub(crate) fn collect_providers<'a, I>(
    resources: I,
    requirement: &Requirement,
) -> RepositoryResult<Vec<CapabilityRef>>
where
    I: IntoIterator<Item = &'a Arc<Resource>>,
{
    requirement.parsed_filter()?;
    let mut providers = Vec::new();
    for resource in resources {
        providers.extend(CapabilityRef::collect(resource, |cap| {
            matches(cap, requirement)
        }));
    }
    Ok(providers)
}

/// Repository over a list of resources held in memory
pub struct MemoryRepository {
    name: String,
    resources: RwLock<Vec<Arc<Resource>>>,
}

impl MemoryRepository {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resources: RwLock::new(Vec::new()),
        }
    }

    /// Builder-style variant of [`MemoryRepository::add_resource`]
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resources.get_mut().push(Arc::new(resource));
        self
    }

    pub async fn add_resource(&self, resource: Resource) -> Arc<Resource> {
        let resource = Arc::new(resource);
        self.resources.write().await.push(Arc::clone(&resource));
        resource
    }

    pub async fn len(&self) -> usize {
        self.resources.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.resources.read().await.is_empty()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find_providers(
        &self,
        requirement: &Requirement,
    ) -> RepositoryResult<Vec<CapabilityRef>> {
        let resources = self.resources.read().await;
        collect_providers(resources.iter(), requirement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RepositoryError;
    use caprepo_core::model::namespace::TYPE_BUNDLE;
    use caprepo_core::{ResourceBuilder, Version};

    fn bundle(name: &str) -> Resource {
        let mut builder = ResourceBuilder::new();
        builder
            .add_identity_capability(name, Version::new(1, 0, 0), TYPE_BUNDLE)
            .unwrap();
        builder.build()
    }

    #[tokio::test]
    async fn test_find_by_identity() {
        let repo = MemoryRepository::new("memory")
            .with_resource(bundle("a"))
            .with_resource(bundle("b"));

        let found = repo.find_providers(&Requirement::identity("b")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].resource().identity().unwrap().name(), Some("b"));
        assert!(repo
            .find_providers(&Requirement::identity("c"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_malformed_filter_is_an_error() {
        let repo = MemoryRepository::new("memory").with_resource(bundle("a"));
        let requirement = Requirement::identity("a").with_filter("(osgi.identity=a");
        let err = repo.find_providers(&requirement).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Filter(_)));
    }

    #[tokio::test]
    async fn test_add_resource() {
        let repo = MemoryRepository::new("memory");
        assert!(repo.is_empty().await);
        repo.add_resource(bundle("a")).await;
        assert_eq!(repo.len().await, 1);
    }
}
