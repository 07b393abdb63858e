//! Capability and requirement records

use super::maven::MavenCoordinates;
use super::namespace::*;
use crate::error::{CoreError, Result};
use crate::filter::{escape_value, Filter, FilterError, FilterParser};
use crate::types::{AttributeValue, VersionRange};
use serde::Serialize;
use std::collections::BTreeMap;

/// Attribute map, sorted by name
pub type Attributes = BTreeMap<String, AttributeValue>;
/// Directive map, sorted by name
pub type Directives = BTreeMap<String, String>;

fn check_namespace(namespace: &str) -> Result<()> {
    if namespace.is_empty() {
        Err(CoreError::EmptyNamespace)
    } else {
        Ok(())
    }
}

/// An attributed offer made by a resource
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Capability {
    namespace: String,
    attributes: Attributes,
    directives: Directives,
}

impl Capability {
    /// Create a capability with no attributes or directives
    pub fn new(namespace: impl Into<String>) -> Result<Self> {
        Self::from_parts(namespace, Attributes::new(), Directives::new())
    }

    /// Create a capability from its parts
    pub fn from_parts(
        namespace: impl Into<String>,
        attributes: Attributes,
        directives: Directives,
    ) -> Result<Self> {
        let namespace = namespace.into();
        check_namespace(&namespace)?;
        Ok(Self {
            namespace,
            attributes,
            directives,
        })
    }

    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_directive(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.directives.insert(name.into(), value.into());
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn directives(&self) -> &Directives {
        &self.directives
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    pub fn directive(&self, name: &str) -> Option<&str> {
        self.directives.get(name).map(String::as_str)
    }
}

/// Whether a requirement must be satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    #[default]
    Mandatory,
    Optional,
}

/// A filtered need expressed by a resource
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Requirement {
    namespace: String,
    attributes: Attributes,
    directives: Directives,
}

impl Requirement {
    /// Create a requirement with no attributes or directives
    ///
    /// Without a filter directive the requirement matches every capability
    /// in its namespace.
    pub fn new(namespace: impl Into<String>) -> Result<Self> {
        Self::from_parts(namespace, Attributes::new(), Directives::new())
    }

    /// Create a requirement from its parts
    pub fn from_parts(
        namespace: impl Into<String>,
        attributes: Attributes,
        directives: Directives,
    ) -> Result<Self> {
        let namespace = namespace.into();
        check_namespace(&namespace)?;
        Ok(Self {
            namespace,
            attributes,
            directives,
        })
    }

    /// Requirement for the resource with the given symbolic name
    pub fn identity(name: &str) -> Self {
        Self::in_namespace(IDENTITY_NAMESPACE).with_filter(format!(
            "({}={})",
            IDENTITY_NAME_ATTRIBUTE,
            escape_value(name)
        ))
    }

    /// Requirement for the named resource with a version inside `range`
    pub fn identity_in_range(name: &str, range: &VersionRange) -> Self {
        Self::in_namespace(IDENTITY_NAMESPACE).with_filter(format!(
            "(&({}={}){})",
            IDENTITY_NAME_ATTRIBUTE,
            escape_value(name),
            range.to_filter(VERSION_ATTRIBUTE)
        ))
    }

    /// Requirement for the artifact at the given maven coordinates
    pub fn maven(coordinates: &MavenCoordinates) -> Self {
        let external = coordinates.to_string();
        Self::in_namespace(MAVEN_IDENTITY_NAMESPACE)
            .with_filter(format!(
                "({}={})",
                MAVEN_IDENTITY_ATTRIBUTE,
                escape_value(&external)
            ))
            .with_attribute(MAVEN_IDENTITY_ATTRIBUTE, external)
    }

    fn in_namespace(namespace: &'static str) -> Self {
        Self {
            namespace: namespace.to_string(),
            attributes: Attributes::new(),
            directives: Directives::new(),
        }
    }

    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_directive(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.directives.insert(name.into(), value.into());
        self
    }

    pub fn with_filter(self, filter: impl Into<String>) -> Self {
        self.with_directive(FILTER_DIRECTIVE, filter)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn directives(&self) -> &Directives {
        &self.directives
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    pub fn directive(&self, name: &str) -> Option<&str> {
        self.directives.get(name).map(String::as_str)
    }

    /// Raw filter directive, if any
    pub fn filter(&self) -> Option<&str> {
        self.directive(FILTER_DIRECTIVE)
    }

    /// Parse the filter directive
    pub fn parsed_filter(&self) -> std::result::Result<Option<Filter>, FilterError> {
        self.filter().map(FilterParser::parse).transpose()
    }

    pub fn resolution(&self) -> Resolution {
        match self.directive(RESOLUTION_DIRECTIVE) {
            Some(RESOLUTION_OPTIONAL) => Resolution::Optional,
            _ => Resolution::Mandatory,
        }
    }

    pub fn is_optional(&self) -> bool {
        self.resolution() == Resolution::Optional
    }
}
