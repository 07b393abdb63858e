//! Filter expressions
//!
//! Requirements select capabilities with LDAP-style filter expressions
//! carried in their `filter` directive.
//!
//! # Syntax
//!
//! ```text
//! (osgi.identity=org.example.core)
//! (&(osgi.identity=org.example.core)(version>=1.2.0))
//! (|(type=osgi.bundle)(type=osgi.fragment))
//! (!(version>=2.0.0))
//! (url=*)                      presence
//! (osgi.identity=org.example*) substring
//! (name~=Some Name)            approximate
//! ```
//!
//! `\`, `(`, `)` and `*` are escaped with a backslash inside values.
//!
//! # Evaluation
//!
//! Comparisons use the declared kind of the capability attribute: the
//! filter text is parsed as a version, integer or real as needed, so
//! `(version>=1.10.0)` compares numerically rather than lexically. List
//! attributes match when any element matches.

mod eval;
mod parser;
mod types;

pub use parser::{FilterError, FilterParser};
pub use types::{Filter, FilterOp};

/// Escape a literal so it can be embedded in a filter value
pub fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '(' | ')' | '*') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_value() {
        assert_eq!(escape_value("plain"), "plain");
        assert_eq!(escape_value("a(b)*c\\"), "a\\(b\\)\\*c\\\\");
    }
}
