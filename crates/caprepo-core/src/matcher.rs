//! Capability/requirement matching
//!
//! A capability satisfies a requirement when both live in the same namespace
//! and the requirement's filter directive, if any, accepts the capability's
//! attributes. Matching is pure: neither input is modified.

use crate::filter::FilterError;
use crate::model::{Capability, Requirement};

/// Decide whether `capability` satisfies `requirement`
///
/// Fails only when the requirement carries a malformed filter.
pub fn try_matches(
    capability: &Capability,
    requirement: &Requirement,
) -> Result<bool, FilterError> {
    if capability.namespace() != requirement.namespace() {
        return Ok(false);
    }
    match requirement.parsed_filter()? {
        Some(filter) => Ok(filter.matches(capability.attributes())),
        None => Ok(true),
    }
}

/// Like [`try_matches`], treating a malformed filter as no match
pub fn matches(capability: &Capability, requirement: &Requirement) -> bool {
    try_matches(capability, requirement).unwrap_or_else(|e| {
        log::warn!("Ignoring requirement with malformed filter: {}", e);
        false
    })
}
