//! Filter evaluation against typed attributes

use super::types::{Filter, FilterOp};
use crate::model::capability::Attributes;
use crate::types::{AttributeValue, Version};
use std::cmp::Ordering;

impl Filter {
    /// Evaluate the filter against an attribute map
    ///
    /// A missing attribute never matches a comparison. A literal that cannot
    /// be read as the attribute's kind makes that comparison false.
    pub fn matches(&self, attributes: &Attributes) -> bool {
        match self {
            Filter::And(items) => items.iter().all(|f| f.matches(attributes)),
            Filter::Or(items) => items.iter().any(|f| f.matches(attributes)),
            Filter::Not(inner) => !inner.matches(attributes),
            Filter::Present { attribute } => attributes.contains_key(attribute),
            Filter::Compare {
                attribute,
                op,
                value,
            } => attributes
                .get(attribute)
                .is_some_and(|actual| compare(actual, *op, value)),
            Filter::Substring { attribute, parts } => attributes
                .get(attribute)
                .is_some_and(|actual| substring(actual, parts)),
        }
    }
}

fn compare(actual: &AttributeValue, op: FilterOp, literal: &str) -> bool {
    match actual {
        AttributeValue::List(list) => list.iter().any(|item| compare(&item, op, literal)),
        AttributeValue::String(s) => match op {
            FilterOp::Equal => s == literal,
            FilterOp::Approx => normalize(s) == normalize(literal),
            FilterOp::GreaterEq => s.as_str() >= literal,
            FilterOp::LessEq => s.as_str() <= literal,
        },
        AttributeValue::Version(v) => Version::parse(literal)
            .map(|expected| ordering_matches(Some(v.cmp(&expected)), op))
            .unwrap_or(false),
        AttributeValue::Long(v) => literal
            .trim()
            .parse::<i64>()
            .map(|expected| ordering_matches(Some(v.cmp(&expected)), op))
            .unwrap_or(false),
        AttributeValue::Double(v) => literal
            .trim()
            .parse::<f64>()
            .map(|expected| ordering_matches(v.partial_cmp(&expected), op))
            .unwrap_or(false),
    }
}

fn ordering_matches(ordering: Option<Ordering>, op: FilterOp) -> bool {
    match (ordering, op) {
        (None, _) => false,
        (Some(ord), FilterOp::Equal | FilterOp::Approx) => ord == Ordering::Equal,
        (Some(ord), FilterOp::GreaterEq) => ord != Ordering::Less,
        (Some(ord), FilterOp::LessEq) => ord != Ordering::Greater,
    }
}

/// Case- and whitespace-insensitive form used by `~=`
fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn substring(actual: &AttributeValue, parts: &[String]) -> bool {
    match actual {
        AttributeValue::String(s) => wildcard_match(s, parts),
        AttributeValue::List(list) => list
            .iter()
            .any(|item| matches!(&item, AttributeValue::String(s) if wildcard_match(s, parts))),
        _ => false,
    }
}

fn wildcard_match(text: &str, parts: &[String]) -> bool {
    let (first, rest) = match parts.split_first() {
        Some(split) => split,
        None => return text.is_empty(),
    };
    let Some(mut remaining) = text.strip_prefix(first.as_str()) else {
        return false;
    };
    let (last, middle) = match rest.split_last() {
        Some(split) => split,
        None => return remaining.is_empty(),
    };

    for part in middle {
        match remaining.find(part.as_str()) {
            Some(pos) => remaining = &remaining[pos + part.len()..],
            None => return false,
        }
    }
    remaining.ends_with(last.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterParser;

    fn attrs(pairs: &[(&str, AttributeValue)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn eval(filter: &str, attributes: &Attributes) -> bool {
        FilterParser::parse(filter).unwrap().matches(attributes)
    }

    #[test]
    fn test_string_equality() {
        let a = attrs(&[("a", AttributeValue::from("x"))]);
        assert!(eval("(a=x)", &a));
        assert!(!eval("(a=y)", &a));
        assert!(!eval("(b=x)", &a));
        assert!(eval("(!(b=x))", &a));

        let empty = attrs(&[("a", AttributeValue::from(""))]);
        assert!(eval("(a=)", &empty));
        assert!(!eval("(a=)", &a));
    }

    #[test]
    fn test_version_ordering_is_numeric() {
        let a = attrs(&[("version", AttributeValue::from(Version::parse("1.10.0").unwrap()))]);
        assert!(eval("(version>=1.2.0)", &a));
        assert!(!eval("(version<=1.2.0)", &a));
        assert!(eval("(version=1.10)", &a));
        assert!(!eval("(version>=not-a-version)", &a));
    }

    #[test]
    fn test_string_ordering_is_lexical() {
        let a = attrs(&[("version", AttributeValue::from("1.10.0"))]);
        assert!(!eval("(version>=1.2.0)", &a));
    }

    #[test]
    fn test_numeric_kinds() {
        let a = attrs(&[
            ("size", AttributeValue::from(1024i64)),
            ("ratio", AttributeValue::from(0.5f64)),
        ]);
        assert!(eval("(&(size>=1000)(size<=1024)(size=1024))", &a));
        assert!(!eval("(size>=2000)", &a));
        assert!(!eval("(size=abc)", &a));
        assert!(eval("(ratio<=0.75)", &a));
        assert!(eval("(ratio=0.5)", &a));
    }

    #[test]
    fn test_list_matches_any_element() {
        let a = attrs(&[(
            "tags",
            AttributeValue::from(vec!["alpha".to_string(), "beta".to_string()]),
        )]);
        assert!(eval("(tags=beta)", &a));
        assert!(eval("(tags=al*)", &a));
        assert!(!eval("(tags=gamma)", &a));
    }

    #[test]
    fn test_substring_and_presence() {
        let a = attrs(&[("name", AttributeValue::from("org.example.core"))]);
        assert!(eval("(name=org.*)", &a));
        assert!(eval("(name=*.core)", &a));
        assert!(eval("(name=org*example*core)", &a));
        assert!(!eval("(name=org*api*)", &a));
        assert!(eval("(name=*)", &a));
        assert!(!eval("(other=*)", &a));
    }

    #[test]
    fn test_approx() {
        let a = attrs(&[("name", AttributeValue::from("Hello World"))]);
        assert!(eval("(name~=helloworld)", &a));
        assert!(!eval("(name=helloworld)", &a));
    }

    #[test]
    fn test_or() {
        let a = attrs(&[("type", AttributeValue::from("osgi.fragment"))]);
        assert!(eval("(|(type=osgi.bundle)(type=osgi.fragment))", &a));
    }

    #[test]
    fn test_wildcard_overlap() {
        assert!(wildcard_match("aXa", &["a".into(), "a".into()]));
        assert!(!wildcard_match("a", &["a".into(), "a".into()]));
    }
}
