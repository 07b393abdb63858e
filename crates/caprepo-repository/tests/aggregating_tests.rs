//! Integration tests for AggregatingRepository

use async_trait::async_trait;
use caprepo_core::model::namespace::TYPE_BUNDLE;
use caprepo_core::{CapabilityRef, Requirement, Resource, ResourceBuilder, Version};
use caprepo_repository::{
    AggregatingRepository, MemoryRepository, Repository, RepositoryError, RepositoryResult,
};

struct FailingRepository;

#[async_trait]
impl Repository for FailingRepository {
    fn name(&self) -> &str {
        "failing"
    }

    async fn find_providers(
        &self,
        _requirement: &Requirement,
    ) -> RepositoryResult<Vec<CapabilityRef>> {
        Err(RepositoryError::Retrieval("origin unreachable".to_string()))
    }
}

fn bundle(name: &str, version: Version) -> Resource {
    let mut builder = ResourceBuilder::new();
    builder
        .add_identity_capability(name, version, TYPE_BUNDLE)
        .unwrap();
    builder.build()
}

fn versions(found: &[CapabilityRef]) -> Vec<Version> {
    found
        .iter()
        .map(|cap| cap.resource().identity().unwrap().version())
        .collect()
}

#[tokio::test]
async fn test_union_of_disjoint_delegates() {
    let first = MemoryRepository::new("first").with_resource(bundle("a", Version::new(1, 0, 0)));
    let second =
        MemoryRepository::new("second").with_resource(bundle("a", Version::new(2, 0, 0)));
    let aggregator = AggregatingRepository::new("aggregator")
        .with_repository(first)
        .with_repository(second);

    let found = aggregator
        .find_providers(&Requirement::identity("a"))
        .await
        .unwrap();

    assert_eq!(
        versions(&found),
        vec![Version::new(1, 0, 0), Version::new(2, 0, 0)]
    );
}

#[tokio::test]
async fn test_overlapping_delegates_deduplicated() {
    let shared = bundle("a", Version::new(1, 0, 0));
    let aggregator = AggregatingRepository::new("aggregator")
        .with_repository(MemoryRepository::new("first").with_resource(shared.clone()))
        .with_repository(
            MemoryRepository::new("second")
                .with_resource(shared)
                .with_resource(bundle("a", Version::new(3, 0, 0))),
        );

    let found = aggregator
        .find_providers(&Requirement::identity("a"))
        .await
        .unwrap();

    assert_eq!(
        versions(&found),
        vec![Version::new(1, 0, 0), Version::new(3, 0, 0)]
    );
}

#[tokio::test]
async fn test_partial_failure_tolerated() {
    let aggregator = AggregatingRepository::new("aggregator")
        .with_repository(FailingRepository)
        .with_repository(
            MemoryRepository::new("memory").with_resource(bundle("a", Version::new(1, 0, 0))),
        );

    let outcome = aggregator.query(&Requirement::identity("a")).await.unwrap();

    assert_eq!(outcome.capabilities.len(), 1);
    assert!(!outcome.is_complete());
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].source, "failing");
    assert!(matches!(
        outcome.warnings[0].error,
        RepositoryError::Retrieval(_)
    ));

    // the trait method hides the warning
    let found = aggregator
        .find_providers(&Requirement::identity("a"))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn test_no_delegates() {
    let aggregator = AggregatingRepository::new("aggregator");
    assert!(aggregator.is_empty());

    let outcome = aggregator.query(&Requirement::identity("a")).await.unwrap();
    assert!(outcome.capabilities.is_empty());
    assert!(outcome.is_complete());
}

#[tokio::test]
async fn test_malformed_filter_fails_query() {
    let aggregator = AggregatingRepository::new("aggregator")
        .with_repository(MemoryRepository::new("memory"));
    let requirement = Requirement::identity("a").with_filter("(&(a=b)");

    let err = aggregator.query(&requirement).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Filter(_)));
}
