//! Element and attribute names of the wire format, and attribute encoding

use crate::error::{CodecError, Result};
use caprepo_core::types::{is_implicit_list, AttributeType, AttributeValue, LIST_SEPARATOR};

pub const REPOSITORY_NAMESPACE: &str = "http://www.osgi.org/xmlns/repository/v1.0.0";

pub const REPOSITORY: &str = "repository";
pub const RESOURCE: &str = "resource";
pub const CAPABILITY: &str = "capability";
pub const REQUIREMENT: &str = "requirement";
pub const ATTRIBUTE: &str = "attribute";
pub const DIRECTIVE: &str = "directive";

pub const NAMESPACE_ATTR: &str = "namespace";
pub const NAME_ATTR: &str = "name";
pub const VALUE_ATTR: &str = "value";
pub const TYPE_ATTR: &str = "type";

/// How the `type` of an attribute element was declared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeSpec {
    pub kind: AttributeType,
    /// `List<T>`: a list regardless of separators in the value
    pub explicit_list: bool,
}

impl TypeSpec {
    /// Parse a `type` attribute; absent means `String`
    pub fn parse(tag: Option<&str>) -> Option<Self> {
        let Some(tag) = tag else {
            return Some(Self {
                kind: AttributeType::String,
                explicit_list: false,
            });
        };
        let (inner, explicit_list) = match tag
            .strip_prefix("List<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            Some(inner) => (inner, true),
            None => (tag, false),
        };
        inner
            .trim()
            .parse::<AttributeType>()
            .ok()
            .map(|kind| Self { kind, explicit_list })
    }

    /// Decode the raw `value` text
    pub fn decode(&self, raw: &str) -> caprepo_core::Result<AttributeValue> {
        if self.explicit_list {
            AttributeValue::parse_list(self.kind, raw)
        } else {
            AttributeValue::parse_implicit(self.kind, raw)
        }
    }
}

/// Encoded form of an attribute value: `value` text and optional `type` tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedValue {
    pub text: String,
    pub type_tag: Option<String>,
}

/// Encode a value so that decoding it yields the same value
///
/// Lists use the implicit comma-joined form whenever it reads back as a
/// list; shorter lists carry an explicit `List<T>` tag. Strings that would
/// be mistaken for lists cannot be encoded.
pub fn encode_value(name: &str, value: &AttributeValue) -> Result<EncodedValue> {
    let kind = value.kind();
    let text = value.to_text();

    if !value.is_list() {
        if is_implicit_list(&text) {
            return Err(CodecError::Encoding(format!(
                "attribute '{}': value '{}' contains the list separator",
                name, text
            )));
        }
        let type_tag = (kind != AttributeType::String).then(|| kind.to_string());
        return Ok(EncodedValue { text, type_tag });
    }

    let elements = value.element_texts();
    if elements.iter().any(|e| e.contains(LIST_SEPARATOR)) {
        return Err(CodecError::Encoding(format!(
            "attribute '{}': list element contains the list separator",
            name
        )));
    }

    if elements.last().is_some_and(|e| e.is_empty()) {
        return Err(CodecError::Encoding(format!(
            "attribute '{}': a list ending in an empty string cannot be encoded",
            name
        )));
    }

    if is_implicit_list(&text) {
        let type_tag = (kind != AttributeType::String).then(|| kind.to_string());
        return Ok(EncodedValue { text, type_tag });
    }

    Ok(EncodedValue {
        text,
        type_tag: Some(format!("List<{}>", kind)),
    })
}
