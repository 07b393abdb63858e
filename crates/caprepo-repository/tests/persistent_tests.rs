//! Integration tests for PersistentRepository over FileStorage

use async_trait::async_trait;
use caprepo_core::model::namespace::{CONTENT_NAMESPACE, IDENTITY_NAMESPACE, TYPE_BUNDLE};
use caprepo_core::{
    Capability, CapabilityRef, Requirement, Resource, ResourceBuilder, Version, VersionRange,
};
use caprepo_repository::{
    FileStorage, MemoryRepository, PersistentRepository, Repository, RepositoryError,
    RepositoryResult, RepositoryStorage,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Origin that answers the first `budget` queries, then fails
struct FlakyOrigin {
    inner: MemoryRepository,
    budget: usize,
    calls: AtomicUsize,
}

impl FlakyOrigin {
    fn new(inner: MemoryRepository, budget: usize) -> Self {
        Self {
            inner,
            budget,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Repository for FlakyOrigin {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn find_providers(
        &self,
        requirement: &Requirement,
    ) -> RepositoryResult<Vec<CapabilityRef>> {
        if self.calls.fetch_add(1, Ordering::SeqCst) >= self.budget {
            return Err(RepositoryError::Retrieval("origin unreachable".to_string()));
        }
        self.inner.find_providers(requirement).await
    }
}

fn bundle(name: &str, version: Version) -> Resource {
    let mut builder = ResourceBuilder::new();
    builder
        .add_identity_capability(name, version, TYPE_BUNDLE)
        .unwrap();
    builder
        .add_content_capability(&format!("file:///repo/{}.jar", name), Some(100))
        .unwrap();
    builder.build()
}

fn origin_with(names: &[&str]) -> MemoryRepository {
    names.iter().fold(MemoryRepository::new("origin"), |repo, name| {
        repo.with_resource(bundle(name, Version::new(1, 2, 8)))
    })
}

#[tokio::test]
async fn test_second_query_served_from_storage() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileStorage::new("test", temp_dir.path()).unwrap();
    let origin = FlakyOrigin::new(origin_with(&["a"]), 1);
    let repo = PersistentRepository::new("cache", storage, origin);
    let requirement = Requirement::identity("a");

    let first = repo.find_providers(&requirement).await.unwrap();
    let second = repo.find_providers(&requirement).await.unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(first, second);

    let stats = repo.cache_stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.stored, 1);
    assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_cache_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let requirement = Requirement::identity("a");

    let first = {
        let storage = FileStorage::new("test", temp_dir.path()).unwrap();
        let repo =
            PersistentRepository::new("cache", storage, FlakyOrigin::new(origin_with(&["a"]), 1));
        repo.find_providers(&requirement).await.unwrap()
    };

    // a fresh instance whose origin is never reachable
    let storage = FileStorage::new("test", temp_dir.path()).unwrap();
    let repo = PersistentRepository::new("cache", storage, FlakyOrigin::new(origin_with(&[]), 0));
    let second = repo.find_providers(&requirement).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(repo.cache_stats().hits, 1);
}

#[tokio::test]
async fn test_equivalent_resource_not_counted_as_stored() {
    let temp_dir = TempDir::new().unwrap();
    let storage: Arc<dyn RepositoryStorage> =
        Arc::new(FileStorage::new("test", temp_dir.path()).unwrap());
    storage
        .add_resource(Arc::new(bundle("a", Version::new(1, 2, 8))))
        .await
        .unwrap();

    // the origin's copy of a 1.2.8 also offers a capability the stored one lacks
    let mut builder = ResourceBuilder::new();
    builder
        .add_identity_capability("a", Version::new(1, 2, 8), TYPE_BUNDLE)
        .unwrap();
    builder
        .add_capability(Capability::new("extra").unwrap())
        .unwrap();
    let origin = MemoryRepository::new("origin").with_resource(builder.build());

    let repo = PersistentRepository::with_shared_storage("cache", Arc::clone(&storage), origin);
    let found = repo.find_providers(&Requirement::new("extra").unwrap()).await.unwrap();

    assert_eq!(found.len(), 1);
    let stats = repo.cache_stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.stored, 0);
    assert_eq!(storage.stats().await.unwrap().increment, 1);
}

#[tokio::test]
async fn test_stored_resource_keeps_content_reference() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileStorage::new("test", temp_dir.path()).unwrap();
    let repo = PersistentRepository::new("cache", storage, origin_with(&["a"]));
    repo.find_providers(&Requirement::identity("a")).await.unwrap();

    let range = VersionRange::parse("[1.0,2.0)").unwrap();
    let found = repo
        .storage()
        .find_providers(&Requirement::identity_in_range("a", &range))
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].capability().namespace(), IDENTITY_NAMESPACE);
    let resource = found[0].resource();
    assert_eq!(resource.capabilities_in(CONTENT_NAMESPACE).count(), 1);
    assert_eq!(resource.content_url(), Some("file:///repo/a.jar"));
}

#[tokio::test]
async fn test_origin_failure_is_empty_with_warning() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileStorage::new("test", temp_dir.path()).unwrap();
    let origin = FlakyOrigin::new(origin_with(&["a"]), 0);
    let repo = PersistentRepository::new("cache", storage, origin);

    let outcome = repo.query(&Requirement::identity("a")).await.unwrap();

    assert!(outcome.capabilities.is_empty());
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].source, "flaky");
}

#[tokio::test]
async fn test_unreadable_store_fails_without_origin() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("repository.xml"), "<repository><resource>").unwrap();
    let storage = FileStorage::new("test", temp_dir.path()).unwrap();
    let origin = Arc::new(FlakyOrigin::new(origin_with(&["a"]), 1));
    let repo = PersistentRepository::new("cache", storage, Arc::clone(&origin));

    let err = repo.query(&Requirement::identity("a")).await.unwrap_err();

    assert!(matches!(err, RepositoryError::Codec(_)));
    assert_eq!(origin.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_failed_write_back_still_returns_result() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::create_dir(temp_dir.path().join("repository.xml.tmp")).unwrap();
    let storage = FileStorage::new("test", temp_dir.path()).unwrap();
    let repo = PersistentRepository::new("cache", storage, origin_with(&["a"]));

    let outcome = repo.query(&Requirement::identity("a")).await.unwrap();

    assert_eq!(outcome.capabilities.len(), 1);
    assert_eq!(outcome.warnings.len(), 1);
    assert!(matches!(
        outcome.warnings[0].error,
        RepositoryError::Storage { .. }
    ));
    assert_eq!(repo.cache_stats().write_failures, 1);
}

#[tokio::test]
async fn test_concurrent_resolutions_lose_no_update() {
    let temp_dir = TempDir::new().unwrap();
    let names: Vec<String> = (0..8).map(|i| format!("bundle.{}", i)).collect();
    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();

    let storage = FileStorage::new("test", temp_dir.path()).unwrap();
    let repo = Arc::new(PersistentRepository::new(
        "cache",
        storage,
        origin_with(&name_refs),
    ));

    let mut handles = Vec::new();
    for name in names.clone() {
        let repo = Arc::clone(&repo);
        handles.push(tokio::spawn(async move {
            repo.find_providers(&Requirement::identity(&name)).await
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap().len(), 1);
    }

    let stats = repo.storage().stats().await.unwrap();
    assert_eq!(stats.resources, 8);
    assert_eq!(stats.increment, 8);

    // every resolution is on disk
    let fresh = FileStorage::new("test", temp_dir.path()).unwrap();
    assert_eq!(fresh.resources().await.unwrap().len(), 8);
}
