//! Repository combining the answers of several delegates

use async_trait::async_trait;
use caprepo_core::{CapabilityRef, Requirement};
use tracing::{debug, warn};

use crate::{
    models::{QueryOutcome, QueryWarning},
    traits::Repository,
    RepositoryResult,
};

/// Ordered list of delegate repositories queried as one
///
/// Every delegate is asked; the answer is the union of their capabilities
/// without duplicates, in delegate order. A failing delegate contributes
/// nothing and is reported as a warning.
pub struct AggregatingRepository {
    name: String,
    delegates: Vec<Box<dyn Repository>>,
}

impl AggregatingRepository {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            delegates: Vec::new(),
        }
    }

    /// Append a delegate; it is queried after those already added
    pub fn add_repository<R>(&mut self, repository: R)
    where
        R: Repository + 'static,
    {
        self.delegates.push(Box::new(repository));
    }

    /// Builder-style variant of [`AggregatingRepository::add_repository`]
    pub fn with_repository<R>(mut self, repository: R) -> Self
    where
        R: Repository + 'static,
    {
        self.add_repository(repository);
        self
    }

    pub fn len(&self) -> usize {
        self.delegates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delegates.is_empty()
    }

    /// Query every delegate, keeping their failures as warnings
    ///
    /// Fails only for a requirement whose filter cannot be parsed.
    pub async fn query(&self, requirement: &Requirement) -> RepositoryResult<QueryOutcome> {
        requirement.parsed_filter()?;

        let mut outcome = QueryOutcome::default();
        for delegate in &self.delegates {
            match delegate.find_providers(requirement).await {
                Ok(found) => {
                    debug!(
                        "{}: {} capabilities from {}",
                        self.name,
                        found.len(),
                        delegate.name()
                    );
                    for capability in found {
                        if !outcome.capabilities.contains(&capability) {
                            outcome.capabilities.push(capability);
                        }
                    }
                }
                Err(error) => {
                    warn!("{}: delegate {} failed: {}", self.name, delegate.name(), error);
                    outcome
                        .warnings
                        .push(QueryWarning::new(delegate.name(), error));
                }
            }
        }
        Ok(outcome)
    }
}

#[async_trait]
impl Repository for AggregatingRepository {
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
