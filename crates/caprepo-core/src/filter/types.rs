//! Filter expression tree

use super::escape_value;
use std::fmt;

/// Comparison operators of the filter language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Equal (=)
    Equal,
    /// Approximately equal (~=)
    Approx,
    /// Greater than or equal (>=)
    GreaterEq,
    /// Less than or equal (<=)
    LessEq,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Equal => "=",
            FilterOp::Approx => "~=",
            FilterOp::GreaterEq => ">=",
            FilterOp::LessEq => "<=",
        }
    }
}

/// A parsed filter expression
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// All sub-filters must match
    And(Vec<Filter>),
    /// At least one sub-filter must match
    Or(Vec<Filter>),
    /// The sub-filter must not match
    Not(Box<Filter>),
    /// Attribute compared against a literal
    Compare {
        attribute: String,
        op: FilterOp,
        value: String,
    },
    /// Attribute is present
    Present { attribute: String },
    /// String attribute matches a wildcard pattern
    ///
    /// `parts` are the literal pieces between the `*` wildcards, so
    /// `ab*cd*` is `["ab", "cd", ""]`.
    Substring { attribute: String, parts: Vec<String> },
}

impl Filter {
    pub fn compare(attribute: impl Into<String>, op: FilterOp, value: impl Into<String>) -> Self {
        Filter::Compare {
            attribute: attribute.into(),
            op,
            value: value.into(),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::And(items) => {
                f.write_str("(&")?;
                for item in items {
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
            Filter::Or(items) => {
                f.write_str("(|")?;
                for item in items {
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
            Filter::Not(inner) => write!(f, "(!{})", inner),
            Filter::Compare {
                attribute,
                op,
                value,
            } => write!(f, "({}{}{})", attribute, op.as_str(), escape_value(value)),
            Filter::Present { attribute } => write!(f, "({}=*)", attribute),
            Filter::Substring { attribute, parts } => {
                let pattern: Vec<String> = parts.iter().map(|p| escape_value(p)).collect();
                write!(f, "({}={})", attribute, pattern.join("*"))
            }
        }
    }
}
