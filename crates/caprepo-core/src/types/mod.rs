//! Value model for capability and requirement attributes
//!
//! This module contains:
//! - Structured versions and version ranges
//! - Typed attribute values (scalars and homogeneous lists)

pub mod value;
pub mod version;

pub use value::{is_implicit_list, AttributeList, AttributeType, AttributeValue, LIST_SEPARATOR};
pub use version::{Version, VersionRange};
