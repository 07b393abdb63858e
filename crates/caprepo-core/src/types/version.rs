//! Structured versions
//!
//! A version has three numeric segments and an optional qualifier:
//! `major[.minor[.micro[.qualifier]]]`. Versions are totally ordered,
//! numerically by segment and then lexically by qualifier, so `1.2.0`
//! sorts before `1.10.0`.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Structured, totally ordered version
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub micro: u64,
    pub qualifier: String,
}

impl Version {
    /// Create a version without qualifier
    pub fn new(major: u64, minor: u64, micro: u64) -> Self {
        Self {
            major,
            minor,
            micro,
            qualifier: String::new(),
        }
    }

    /// Create a version with a qualifier
    pub fn with_qualifier(
        major: u64,
        minor: u64,
        micro: u64,
        qualifier: impl Into<String>,
    ) -> Result<Self> {
        let qualifier = qualifier.into();
        validate_qualifier(&qualifier, &qualifier)?;
        Ok(Self {
            major,
            minor,
            micro,
            qualifier,
        })
    }

    /// The empty version `0.0.0`
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a version string
    ///
    /// The empty string (after trimming) parses to `0.0.0`.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Self::empty());
        }

        let mut parts = trimmed.splitn(4, '.');
        let major = parse_segment(text, parts.next())?;
        let minor = match parts.next() {
            Some(part) => parse_segment(text, Some(part))?,
            None => 0,
        };
        let micro = match parts.next() {
            Some(part) => parse_segment(text, Some(part))?,
            None => 0,
        };
        let qualifier = parts.next().unwrap_or_default().to_string();
        validate_qualifier(text, &qualifier)?;

        Ok(Self {
            major,
            minor,
            micro,
            qualifier,
        })
    }
}

fn parse_segment(text: &str, part: Option<&str>) -> Result<u64> {
    let part = part.unwrap_or_default();
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoreError::InvalidVersion {
            value: text.to_string(),
            message: format!("invalid numeric segment '{}'", part),
        });
    }
    part.parse::<u64>().map_err(|e| CoreError::InvalidVersion {
        value: text.to_string(),
        message: e.to_string(),
    })
}

fn validate_qualifier(text: &str, qualifier: &str) -> Result<()> {
    let valid = qualifier
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(CoreError::InvalidVersion {
            value: text.to_string(),
            message: format!("invalid qualifier '{}'", qualifier),
        })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.micro.cmp(&other.micro))
            .then_with(|| self.qualifier.cmp(&other.qualifier))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)?;
        if !self.qualifier.is_empty() {
            write!(f, ".{}", self.qualifier)?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Version::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Version interval such as `[1.0,2.0)`
///
/// A bare version `v` is the half-open range `[v, ∞)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    pub floor: Version,
    pub floor_inclusive: bool,
    pub ceiling: Option<Version>,
    pub ceiling_inclusive: bool,
}

impl VersionRange {
    /// Range containing every version at or above `floor`
    pub fn at_least(floor: Version) -> Self {
        Self {
            floor,
            floor_inclusive: true,
            ceiling: None,
            ceiling_inclusive: false,
        }
    }

    /// Parse interval notation or a bare version
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let invalid = |message: &str| CoreError::InvalidVersionRange {
            value: text.to_string(),
            message: message.to_string(),
        };

        let floor_inclusive = match trimmed.chars().next() {
            Some('[') => true,
            Some('(') => false,
            _ => return Ok(Self::at_least(Version::parse(trimmed)?)),
        };
        let ceiling_inclusive = match trimmed.chars().last() {
            Some(']') => true,
            Some(')') => false,
            _ => return Err(invalid("missing closing bracket")),
        };
        if trimmed.len() < 2 {
            return Err(invalid("missing closing bracket"));
        }

        let body = &trimmed[1..trimmed.len() - 1];
        let (floor, ceiling) = body
            .split_once(',')
            .ok_or_else(|| invalid("expected two comma separated versions"))?;
        if ceiling.contains(',') {
            return Err(invalid("expected two comma separated versions"));
        }

        let floor = Version::parse(floor).map_err(|e| invalid(&e.to_string()))?;
        let ceiling = Version::parse(ceiling).map_err(|e| invalid(&e.to_string()))?;

        Ok(Self {
            floor,
            floor_inclusive,
            ceiling: Some(ceiling),
            ceiling_inclusive,
        })
    }

    /// Check whether a version lies inside this range
    pub fn includes(&self, version: &Version) -> bool {
        let above_floor = if self.floor_inclusive {
            version >= &self.floor
        } else {
            version > &self.floor
        };
        let below_ceiling = match &self.ceiling {
            None => true,
            Some(ceiling) if self.ceiling_inclusive => version <= ceiling,
            Some(ceiling) => version < ceiling,
        };
        above_floor && below_ceiling
    }

    /// Render the range as a filter expression over `attribute`
    ///
    /// The filter language only has `>=` and `<=`, so exclusive bounds are
    /// expressed by negating the opposite inclusive comparison.
    pub fn to_filter(&self, attribute: &str) -> String {
        let floor = if self.floor_inclusive {
            format!("({}>={})", attribute, self.floor)
        } else {
            format!("(!({}<={}))", attribute, self.floor)
        };
        match &self.ceiling {
            None => floor,
            Some(ceiling) => {
                let ceiling = if self.ceiling_inclusive {
                    format!("({}<={})", attribute, ceiling)
                } else {
                    format!("(!({}>={}))", attribute, ceiling)
                };
                format!("(&{}{})", floor, ceiling)
            }
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ceiling {
            None => write!(f, "{}", self.floor),
            Some(ceiling) => write!(
                f,
                "{}{},{}{}",
                if self.floor_inclusive { '[' } else { '(' },
                self.floor,
                ceiling,
                if self.ceiling_inclusive { ']' } else { ')' }
            ),
        }
    }
}

impl FromStr for VersionRange {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        VersionRange::parse(s)
    }
}
