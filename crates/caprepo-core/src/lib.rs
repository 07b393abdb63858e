//! caprepo core - shared types for the capability repository
//!
//! This crate provides the types every other crate in the workspace builds on:
//! - Typed attribute values and structured versions
//! - Resource, capability and requirement records
//! - The LDAP-style filter language carried in requirement directives
//! - The matcher deciding whether a capability satisfies a requirement
//! - Error types

pub mod error;
pub mod filter;
pub mod matcher;
pub mod model;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use filter::{Filter, FilterError, FilterParser};
pub use matcher::{matches, try_matches};
pub use model::{
    Attributes, Capability, CapabilityRef, Directives, IdentityCapability, MavenCoordinates,
    Requirement, Resolution, Resource, ResourceBuilder,
};
pub use types::{AttributeList, AttributeType, AttributeValue, Version, VersionRange};
