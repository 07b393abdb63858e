//! Capability repositories
//!
//! This crate answers requirements with matching capabilities from several
//! kinds of sources behind one async [`Repository`] trait.
//!
//! # Features
//!
//! - **Memory Repository**: resources held in memory
//! - **Aggregating Repository**: union of several delegates, tolerating
//!   failing ones
//! - **Maven Delegate**: resolves maven identity requirements through an
//!   [`ArtifactResolver`], e.g. a local Maven layout directory
//! - **Persistent Repository**: answers from a file store first, falls back
//!   to an origin and records what the origin found
//!
//! # Quick Start
//!
//! ```no_run
//! use caprepo_core::{MavenCoordinates, Requirement};
//! use caprepo_repository::{
//!     AggregatingRepository, FileStorage, LocalMavenResolver, MavenDelegateRepository,
//!     PersistentRepository, Repository,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let resolver = LocalMavenResolver::new("/home/me/.m2/repository")?;
//!     let origin = AggregatingRepository::new("aggregator")
//!         .with_repository(MavenDelegateRepository::new("maven", resolver));
//!     let storage = FileStorage::new("caprepo", "osgi-store/repository")?;
//!     let repo = PersistentRepository::new("caprepo", storage, origin);
//!
//!     let coordinates = MavenCoordinates::parse("org.example:core:1.2.8")?;
//!     let found = repo.find_providers(&Requirement::maven(&coordinates)).await?;
//!     println!("{} capabilities", found.len());
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │    PersistentRepository      │──── FileStorage (repository.xml)
//! └──────────────┬───────────────┘
//!                │ origin
//!                ↓
//! ┌──────────────────────────────┐
//! │    AggregatingRepository     │
//! └──────────────┬───────────────┘
//!                │ delegates
//!                ↓
//! ┌──────────────────────────────┐
//! │   MavenDelegateRepository    │──── ArtifactResolver
//! └──────────────────────────────┘
//! ```

pub mod aggregating;
pub mod config;
pub mod error;
pub mod maven;
pub mod memory;
pub mod models;
pub mod persistent;
pub mod storage;
pub mod traits;

// Re-exports - Configuration
pub use config::{ConfigError, RepositoryConfig};

// Re-exports - Error
pub use error::{RepositoryError, RepositoryResult};

// Re-exports - Repositories
pub use aggregating::AggregatingRepository;
pub use maven::{LocalMavenResolver, MavenDelegateRepository};
pub use memory::MemoryRepository;
pub use persistent::PersistentRepository;
pub use storage::FileStorage;

pub use models::*;
pub use traits::*;
