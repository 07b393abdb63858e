//! Data models for the repository layer

use caprepo_core::CapabilityRef;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::RepositoryError;

/// A non-fatal failure observed while answering a query
#[derive(Debug)]
pub struct QueryWarning {
    /// Name of the repository or store that failed
    pub source: String,
    pub error: RepositoryError,
}

impl QueryWarning {
    pub fn new(source: impl Into<String>, error: RepositoryError) -> Self {
        Self {
            source: source.into(),
            error,
        }
    }
}

impl fmt::Display for QueryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.error)
    }
}

/// Result of a query that tolerates partial failure
#[derive(Debug, Default)]
pub struct QueryOutcome {
    pub capabilities: Vec<CapabilityRef>,
    pub warnings: Vec<QueryWarning>,
}

impl QueryOutcome {
    pub fn new(capabilities: Vec<CapabilityRef>) -> Self {
        Self {
            capabilities,
            warnings: Vec::new(),
        }
    }

    /// True when no part of the query failed
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Snapshot of a resource store
#[derive(Debug, Clone, Serialize)]
pub struct StorageStats {
    /// Location of the store document
    pub path: PathBuf,
    pub resources: usize,
    pub capabilities: usize,
    /// Number of writes the store has seen
    pub increment: u64,
}

/// Cache statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Queries answered from the store
    pub hits: u64,
    /// Queries forwarded to the origin
    pub misses: u64,
    /// Resources added to the store
    pub stored: u64,
    /// Failed write-backs
    pub write_failures: u64,
}

impl CacheStats {
    /// Calculate cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
