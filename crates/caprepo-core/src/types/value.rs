//! Typed attribute values
//!
//! An attribute value carries its declared kind explicitly. Scalars render as
//! their literal text; lists render as comma-joined literals. There is no
//! implicit coercion between kinds.

use crate::error::{CoreError, Result};
use crate::types::version::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator between list elements in the text form
pub const LIST_SEPARATOR: char = ',';

/// Declared kind of an attribute value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeType {
    String,
    Version,
    /// 64-bit signed integer
    Long,
    /// 64-bit floating point
    Double,
}

impl AttributeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::String => "String",
            AttributeType::Version => "Version",
            AttributeType::Long => "Long",
            AttributeType::Double => "Double",
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributeType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "String" => Ok(AttributeType::String),
            "Version" => Ok(AttributeType::Version),
            "Long" => Ok(AttributeType::Long),
            "Double" => Ok(AttributeType::Double),
            other => Err(CoreError::InvalidValue {
                kind: "type".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Homogeneous list of scalar values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values")]
pub enum AttributeList {
    String(Vec<String>),
    Version(Vec<Version>),
    Long(Vec<i64>),
    Double(Vec<f64>),
}

impl AttributeList {
    pub fn kind(&self) -> AttributeType {
        match self {
            AttributeList::String(_) => AttributeType::String,
            AttributeList::Version(_) => AttributeType::Version,
            AttributeList::Long(_) => AttributeType::Long,
            AttributeList::Double(_) => AttributeType::Double,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            AttributeList::String(v) => v.len(),
            AttributeList::Version(v) => v.len(),
            AttributeList::Long(v) => v.len(),
            AttributeList::Double(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate the elements as scalar values
    pub fn iter(&self) -> impl Iterator<Item = AttributeValue> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    /// Element at `index` as a scalar value
    pub fn get(&self, index: usize) -> Option<AttributeValue> {
        match self {
            AttributeList::String(v) => v.get(index).cloned().map(AttributeValue::String),
            AttributeList::Version(v) => v.get(index).cloned().map(AttributeValue::Version),
            AttributeList::Long(v) => v.get(index).copied().map(AttributeValue::Long),
            AttributeList::Double(v) => v.get(index).copied().map(AttributeValue::Double),
        }
    }

    fn element_texts(&self) -> Vec<String> {
        match self {
            AttributeList::String(v) => v.clone(),
            AttributeList::Version(v) => v.iter().map(ToString::to_string).collect(),
            AttributeList::Long(v) => v.iter().map(ToString::to_string).collect(),
            AttributeList::Double(v) => v.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Typed attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum AttributeValue {
    String(String),
    Version(Version),
    Long(i64),
    Double(f64),
    List(AttributeList),
}

impl AttributeValue {
    /// Declared kind; for lists, the element kind
    pub fn kind(&self) -> AttributeType {
        match self {
            AttributeValue::String(_) => AttributeType::String,
            AttributeValue::Version(_) => AttributeType::Version,
            AttributeValue::Long(_) => AttributeType::Long,
            AttributeValue::Double(_) => AttributeType::Double,
            AttributeValue::List(list) => list.kind(),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, AttributeValue::List(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_version(&self) -> Option<&Version> {
        match self {
            AttributeValue::Version(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            AttributeValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            AttributeValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&AttributeList> {
        match self {
            AttributeValue::List(list) => Some(list),
            _ => None,
        }
    }

    /// Canonical text form: literal for scalars, comma-joined for lists
    pub fn to_text(&self) -> String {
        match self {
            AttributeValue::String(s) => s.clone(),
            AttributeValue::Version(v) => v.to_string(),
            AttributeValue::Long(v) => v.to_string(),
            AttributeValue::Double(v) => v.to_string(),
            AttributeValue::List(list) => list.element_texts().join(","),
        }
    }

    /// Element texts of a list value, or the single text of a scalar
    pub fn element_texts(&self) -> Vec<String> {
        match self {
            AttributeValue::List(list) => list.element_texts(),
            scalar => vec![scalar.to_text()],
        }
    }

    /// Parse a scalar of the given kind
    pub fn parse_scalar(kind: AttributeType, text: &str) -> Result<Self> {
        match kind {
            AttributeType::String => Ok(AttributeValue::String(text.to_string())),
            AttributeType::Version => Version::parse(text).map(AttributeValue::Version),
            AttributeType::Long => parse_long(text).map(AttributeValue::Long),
            AttributeType::Double => parse_double(text).map(AttributeValue::Double),
        }
    }

    /// Parse a list of the given element kind from separator-joined text
    ///
    /// Trailing empty elements are dropped, so `"1,2,"` is `[1, 2]` and the
    /// empty string is the empty list.
    pub fn parse_list(kind: AttributeType, text: &str) -> Result<Self> {
        let mut parts: Vec<&str> = text.split(LIST_SEPARATOR).collect();
        while parts.last().is_some_and(|part| part.is_empty()) {
            parts.pop();
        }
        let list = match kind {
            AttributeType::String => {
                AttributeList::String(parts.iter().map(|s| s.to_string()).collect())
            }
            AttributeType::Version => AttributeList::Version(
                parts
                    .iter()
                    .map(|s| Version::parse(s))
                    .collect::<Result<_>>()?,
            ),
            AttributeType::Long => AttributeList::Long(
                parts.iter().map(|s| parse_long(s)).collect::<Result<_>>()?,
            ),
            AttributeType::Double => AttributeList::Double(
                parts.iter().map(|s| parse_double(s)).collect::<Result<_>>()?,
            ),
        };
        Ok(AttributeValue::List(list))
    }

    /// Parse text whose list-ness is implied by the separator
    ///
    /// A value is a list when it contains the separator at a position
    /// greater than zero; a value starting with the separator stays scalar.
    pub fn parse_implicit(kind: AttributeType, text: &str) -> Result<Self> {
        if is_implicit_list(text) {
            Self::parse_list(kind, text)
        } else {
            Self::parse_scalar(kind, text)
        }
    }
}

fn parse_long(text: &str) -> Result<i64> {
    text.trim().parse().map_err(|_| CoreError::InvalidValue {
        kind: AttributeType::Long.to_string(),
        value: text.to_string(),
    })
}

fn parse_double(text: &str) -> Result<f64> {
    text.trim().parse().map_err(|_| CoreError::InvalidValue {
        kind: AttributeType::Double.to_string(),
        value: text.to_string(),
    })
}

/// True when `text` reads back as a list under the implicit rule
pub fn is_implicit_list(text: &str) -> bool {
    matches!(text.find(LIST_SEPARATOR), Some(pos) if pos > 0)
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<Version> for AttributeValue {
    fn from(value: Version) -> Self {
        AttributeValue::Version(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Long(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Double(value)
    }
}

impl From<AttributeList> for AttributeValue {
    fn from(value: AttributeList) -> Self {
        AttributeValue::List(value)
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(value: Vec<String>) -> Self {
        AttributeValue::List(AttributeList::String(value))
    }
}

impl From<Vec<Version>> for AttributeValue {
    fn from(value: Vec<Version>) -> Self {
        AttributeValue::List(AttributeList::Version(value))
    }
}

impl From<Vec<i64>> for AttributeValue {
    fn from(value: Vec<i64>) -> Self {
        AttributeValue::List(AttributeList::Long(value))
    }
}

impl From<Vec<f64>> for AttributeValue {
    fn from(value: Vec<f64>) -> Self {
        AttributeValue::List(AttributeList::Double(value))
    }
}
