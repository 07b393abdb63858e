//! Resource records
//!
//! A resource is an ordered bundle of capabilities (what it offers) and
//! requirements (what it needs). This module contains:
//! - Well-known namespaces and attribute names
//! - Capability and requirement records
//! - Resources, the resource builder and capability references
//! - Maven coordinates used to address artifacts

pub mod capability;
pub mod maven;
pub mod namespace;
pub mod resource;

pub use capability::{Attributes, Capability, Directives, Requirement, Resolution};
pub use maven::MavenCoordinates;
pub use resource::{CapabilityRef, IdentityCapability, Resource, ResourceBuilder};
