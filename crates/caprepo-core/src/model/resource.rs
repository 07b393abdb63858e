//! Resources, the resource builder and capability references

use super::capability::{Attributes, Capability, Directives, Requirement};
use super::namespace::*;
use crate::error::{CoreError, Result};
use crate::types::{AttributeValue, Version};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// An ordered bundle of capabilities and requirements
///
/// Order is kept from construction (and from the wire) so output is
/// deterministic; it carries no meaning for matching.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Resource {
    capabilities: Vec<Capability>,
    requirements: Vec<Requirement>,
}

impl Resource {
    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Capabilities in the given namespace, in order
    pub fn capabilities_in<'a>(
        &'a self,
        namespace: &'a str,
    ) -> impl Iterator<Item = &'a Capability> + 'a {
        self.capabilities
            .iter()
            .filter(move |cap| cap.namespace() == namespace)
    }

    /// Requirements in the given namespace, in order
    pub fn requirements_in<'a>(
        &'a self,
        namespace: &'a str,
    ) -> impl Iterator<Item = &'a Requirement> + 'a {
        self.requirements
            .iter()
            .filter(move |req| req.namespace() == namespace)
    }

    /// The identity capability, if the resource has one
    pub fn identity(&self) -> Option<IdentityCapability<'_>> {
        self.capabilities_in(IDENTITY_NAMESPACE)
            .next()
            .map(|capability| IdentityCapability { capability })
    }

    /// Location of the resource content, if a content capability names one
    pub fn content_url(&self) -> Option<&str> {
        self.capabilities_in(CONTENT_NAMESPACE)
            .find_map(|cap| cap.attribute(CONTENT_URL_ATTRIBUTE))
            .and_then(AttributeValue::as_str)
    }

    /// Stable key `name:version:type` derived from the identity capability
    pub fn identity_key(&self) -> Option<String> {
        let identity = self.identity()?;
        Some(format!(
            "{}:{}:{}",
            identity.name()?,
            identity.version(),
            identity.resource_type()
        ))
    }
}

/// Read-only view over an identity capability
#[derive(Debug, Clone, Copy)]
pub struct IdentityCapability<'a> {
    capability: &'a Capability,
}

impl<'a> IdentityCapability<'a> {
    pub fn capability(&self) -> &'a Capability {
        self.capability
    }

    /// Symbolic name
    pub fn name(&self) -> Option<&'a str> {
        self.capability
            .attribute(IDENTITY_NAME_ATTRIBUTE)
            .and_then(AttributeValue::as_str)
    }

    /// Version, `0.0.0` when absent or unreadable
    pub fn version(&self) -> Version {
        match self.capability.attribute(VERSION_ATTRIBUTE) {
            Some(AttributeValue::Version(v)) => v.clone(),
            Some(AttributeValue::String(s)) => Version::parse(s).unwrap_or_default(),
            _ => Version::empty(),
        }
    }

    /// Resource type, `unknown` when absent
    pub fn resource_type(&self) -> &'a str {
        self.capability
            .attribute(TYPE_ATTRIBUTE)
            .and_then(AttributeValue::as_str)
            .unwrap_or(TYPE_UNKNOWN)
    }
}

/// Incremental builder for [`Resource`]
#[derive(Debug, Default)]
pub struct ResourceBuilder {
    capabilities: Vec<Capability>,
    requirements: Vec<Requirement>,
}

impl ResourceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a capability
    ///
    /// A resource carries at most one identity capability.
    pub fn add_capability(&mut self, capability: Capability) -> Result<&mut Self> {
        let is_identity = capability.namespace() == IDENTITY_NAMESPACE;
        if is_identity
            && self
                .capabilities
                .iter()
                .any(|cap| cap.namespace() == IDENTITY_NAMESPACE)
        {
            return Err(CoreError::DuplicateIdentity);
        }
        self.capabilities.push(capability);
        Ok(self)
    }

    /// Append a capability built from its parts
    pub fn add_generic_capability(
        &mut self,
        namespace: &str,
        attributes: Attributes,
        directives: Directives,
    ) -> Result<&mut Self> {
        let capability = Capability::from_parts(namespace, attributes, directives)?;
        self.add_capability(capability)
    }

    /// Append a requirement
    pub fn add_requirement(&mut self, requirement: Requirement) -> &mut Self {
        self.requirements.push(requirement);
        self
    }

    /// Append a requirement built from its parts
    pub fn add_generic_requirement(
        &mut self,
        namespace: &str,
        attributes: Attributes,
        directives: Directives,
    ) -> Result<&mut Self> {
        let requirement = Requirement::from_parts(namespace, attributes, directives)?;
        Ok(self.add_requirement(requirement))
    }

    /// Append the identity capability
    pub fn add_identity_capability(
        &mut self,
        name: &str,
        version: Version,
        resource_type: &str,
    ) -> Result<&mut Self> {
        let capability = Capability::new(IDENTITY_NAMESPACE)?
            .with_attribute(IDENTITY_NAME_ATTRIBUTE, name)
            .with_attribute(VERSION_ATTRIBUTE, version)
            .with_attribute(TYPE_ATTRIBUTE, resource_type);
        self.add_capability(capability)
    }

    /// Append a content capability pointing at `url`
    pub fn add_content_capability(&mut self, url: &str, size: Option<u64>) -> Result<&mut Self> {
        let mut capability =
            Capability::new(CONTENT_NAMESPACE)?.with_attribute(CONTENT_URL_ATTRIBUTE, url);
        if let Some(size) = size {
            capability = capability.with_attribute(
                CONTENT_SIZE_ATTRIBUTE,
                i64::try_from(size).unwrap_or(i64::MAX),
            );
        }
        self.add_capability(capability)
    }

    pub fn build(self) -> Resource {
        Resource {
            capabilities: self.capabilities,
            requirements: self.requirements,
        }
    }
}

/// A capability returned by a query, together with its owning resource
///
/// The resource is shared; the capability is addressed by its position in
/// the resource and never copied out of it.
#[derive(Debug, Clone)]
pub struct CapabilityRef {
    resource: Arc<Resource>,
    index: usize,
}

impl CapabilityRef {
    /// Reference the capability at `index`, if it exists
    pub fn new(resource: Arc<Resource>, index: usize) -> Option<Self> {
        if index < resource.capabilities.len() {
            Some(Self { resource, index })
        } else {
            None
        }
    }

    /// References to every capability of `resource` accepted by `predicate`
    pub fn collect<F>(resource: &Arc<Resource>, mut predicate: F) -> Vec<Self>
    where
        F: FnMut(&Capability) -> bool,
    {
        resource
            .capabilities
            .iter()
            .enumerate()
            .filter(|(_, cap)| predicate(cap))
            .map(|(index, _)| Self {
                resource: Arc::clone(resource),
                index,
            })
            .collect()
    }

    pub fn capability(&self) -> &Capability {
        &self.resource.capabilities[self.index]
    }

    pub fn resource(&self) -> &Arc<Resource> {
        &self.resource
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl PartialEq for CapabilityRef {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
            && (Arc::ptr_eq(&self.resource, &other.resource) || self.resource == other.resource)
    }
}

impl Serialize for CapabilityRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CapabilityRef", 2)?;
        state.serialize_field("capability", self.capability())?;
        state.serialize_field("resource", self.resource.as_ref())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_resource() -> Resource {
        let mut builder = ResourceBuilder::new();
        builder
            .add_identity_capability("org.example.core", Version::new(1, 2, 8), TYPE_BUNDLE)
            .unwrap();
        builder
            .add_content_capability("file:///tmp/core.jar", Some(1024))
            .unwrap();
        builder.add_requirement(Requirement::identity("org.example.api"));
        builder.build()
    }

    #[test]
    fn test_identity_view() {
        let resource = sample_resource();
        let identity = resource.identity().unwrap();
        assert_eq!(identity.name(), Some("org.example.core"));
        assert_eq!(identity.version(), Version::new(1, 2, 8));
        assert_eq!(identity.resource_type(), TYPE_BUNDLE);
        assert_eq!(
            resource.identity_key().as_deref(),
            Some("org.example.core:1.2.8:osgi.bundle")
        );
    }

    #[test]
    fn test_missing_identity_is_tolerated() {
        let resource = ResourceBuilder::new().build();
        assert!(resource.identity().is_none());
        assert!(resource.identity_key().is_none());
        assert!(resource.content_url().is_none());
    }

    #[test]
    fn test_duplicate_identity_rejected() {
        let mut builder = ResourceBuilder::new();
        builder
            .add_identity_capability("a", Version::empty(), TYPE_BUNDLE)
            .unwrap();
        let err = builder
            .add_identity_capability("b", Version::empty(), TYPE_BUNDLE)
            .unwrap_err();
        assert_eq!(err, CoreError::DuplicateIdentity);
    }

    #[test]
    fn test_content_url() {
        let resource = sample_resource();
        assert_eq!(resource.content_url(), Some("file:///tmp/core.jar"));
        assert_eq!(resource.capabilities_in(CONTENT_NAMESPACE).count(), 1);
        assert_eq!(resource.requirements_in(IDENTITY_NAMESPACE).count(), 1);
    }

    #[test]
    fn test_capability_ref_equality() {
        let a = Arc::new(sample_resource());
        let b = Arc::new(sample_resource());
        let ra = CapabilityRef::new(a.clone(), 0).unwrap();
        let rb = CapabilityRef::new(b, 0).unwrap();
        assert_eq!(ra, rb);
        assert_ne!(ra, CapabilityRef::new(a.clone(), 1).unwrap());
        assert!(CapabilityRef::new(a, 2).is_none());
    }

    #[test]
    fn test_capability_ref_back_reference() {
        let resource = Arc::new(sample_resource());
        let refs = CapabilityRef::collect(&resource, |cap| cap.namespace() == CONTENT_NAMESPACE);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].capability().namespace(), CONTENT_NAMESPACE);
        assert!(refs[0].resource().identity().is_some());
    }
}
