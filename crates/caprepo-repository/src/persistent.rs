//! Repository caching the answers of an origin in durable storage

use async_trait::async_trait;
use caprepo_core::{CapabilityRef, Requirement, Resource};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{
    models::{CacheStats, QueryOutcome, QueryWarning},
    traits::{Repository, RepositoryStorage},
    RepositoryResult,
};

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    stored: AtomicU64,
    write_failures: AtomicU64,
}

/// Storage-first repository with an origin fallback
///
/// A query is answered from storage when storage has any match. Otherwise
/// the origin is asked and every resource it returns is added to storage,
/// so the same query is answered from storage from then on.
///
/// Failures are graded: a storage read failure fails the query, an origin
/// failure yields an empty answer, and a failed write-back still returns
/// what the origin found. The last two are reported as warnings.
pub struct PersistentRepository {
    name: String,
    storage: Arc<dyn RepositoryStorage>,
    origin: Box<dyn Repository>,
    counters: Counters,
}

impl PersistentRepository {
    pub fn new<S, O>(name: impl Into<String>, storage: S, origin: O) -> Self
    where
        S: RepositoryStorage + 'static,
        O: Repository + 'static,
    {
        Self::with_shared_storage(name, Arc::new(storage), origin)
    }

    /// Create a repository over storage shared with other owners
    pub fn with_shared_storage<O>(
        name: impl Into<String>,
        storage: Arc<dyn RepositoryStorage>,
        origin: O,
    ) -> Self
    where
        O: Repository + 'static,
    {
        Self {
            name: name.into(),
            storage,
            origin: Box::new(origin),
            counters: Counters::default(),
        }
    }

    pub fn storage(&self) -> &Arc<dyn RepositoryStorage> {
        &self.storage
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            stored: self.counters.stored.load(Ordering::Relaxed),
            write_failures: self.counters.write_failures.load(Ordering::Relaxed),
        }
    }

    /// Answer `requirement`, keeping non-fatal failures as warnings
    pub async fn query(&self, requirement: &Requirement) -> RepositoryResult<QueryOutcome> {
        let cached = self.storage.find_providers(requirement).await?;
        if !cached.is_empty() {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            debug!("{}: cache hit, {} capabilities", self.name, cached.len());
            return Ok(QueryOutcome::new(cached));
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        debug!("{}: cache miss, asking {}", self.name, self.origin.name());

        let mut outcome = QueryOutcome::default();
        let found = match self.origin.find_providers(requirement).await {
            Ok(found) => found,
            Err(error) => {
                warn!("{}: origin {} failed: {}", self.name, self.origin.name(), error);
                outcome
                    .warnings
                    .push(QueryWarning::new(self.origin.name(), error));
                return Ok(outcome);
            }
        };

        for resource in distinct_resources(&found) {
            match self.storage.add_resource(Arc::clone(&resource)).await {
                Ok(stored) if Arc::ptr_eq(&stored, &resource) => {
                    self.counters.stored.fetch_add(1, Ordering::Relaxed);
                }
                Ok(_) => debug!("{}: resource already stored", self.name),
                Err(error) => {
                    self.counters.write_failures.fetch_add(1, Ordering::Relaxed);
                    warn!("{}: failed to store resource: {}", self.name, error);
                    outcome.warnings.push(QueryWarning::new(&self.name, error));
                }
            }
        }

        outcome.capabilities = found;
        Ok(outcome)
    }
}

/// Owning resources of `capabilities`, each once, in first-seen order
fn distinct_resources(capabilities: &[CapabilityRef]) -> Vec<Arc<Resource>> {
    let mut resources: Vec<Arc<Resource>> = Vec::new();
    for capability in capabilities {
        let resource = capability.resource();
        let seen = resources
            .iter()
            .any(|r| Arc::ptr_eq(r, resource) || r.as_ref() == resource.as_ref());
        if !seen {
            resources.push(Arc::clone(resource));
        }
    }
    resources
}

#[async_trait]
impl Repository for PersistentRepository {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find_providers(
        &self,
        requirement: &Requirement,
    ) -> RepositoryResult<Vec<CapabilityRef>> {
        Ok(self.query(requirement).await?.capabilities)
    }
}
