//! Filter string parser

use super::types::{Filter, FilterOp};

/// Malformed filter expression
#[derive(Debug, Clone, PartialEq)]
pub struct FilterError {
    pub message: String,
    pub filter: String,
    /// Byte offset of the offending character
    pub position: usize,
}

impl std::fmt::Display for FilterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Invalid filter '{}' at position {}: {}",
            self.filter, self.position, self.message
        )
    }
}

impl std::error::Error for FilterError {}

/// Recursive descent parser for filter expressions
pub struct FilterParser<'a> {
    text: &'a str,
    chars: Vec<(usize, char)>,
    cursor: usize,
}

impl<'a> FilterParser<'a> {
    /// Parse a complete filter expression
    pub fn parse(text: &'a str) -> Result<Filter, FilterError> {
        let mut parser = FilterParser {
            text,
            chars: text.char_indices().collect(),
            cursor: 0,
        };

        parser.skip_whitespace();
        let filter = parser.parse_filter()?;
        parser.skip_whitespace();
        if parser.peek().is_some() {
            return Err(parser.error("Unexpected characters after filter"));
        }
        Ok(filter)
    }

    fn parse_filter(&mut self) -> Result<Filter, FilterError> {
        self.expect('(')?;
        self.skip_whitespace();

        let filter = match self.peek() {
            Some('&') => {
                self.advance();
                Filter::And(self.parse_filter_list()?)
            }
            Some('|') => {
                self.advance();
                Filter::Or(self.parse_filter_list()?)
            }
            Some('!') => {
                self.advance();
                self.skip_whitespace();
                Filter::Not(Box::new(self.parse_filter()?))
            }
            Some(_) => self.parse_item()?,
            None => return Err(self.error("Unexpected end of filter")),
        };

        self.skip_whitespace();
        self.expect(')')?;
        Ok(filter)
    }

    fn parse_filter_list(&mut self) -> Result<Vec<Filter>, FilterError> {
        let mut items = Vec::new();
        self.skip_whitespace();
        while self.peek() == Some('(') {
            items.push(self.parse_filter()?);
            self.skip_whitespace();
        }
        if items.is_empty() {
            return Err(self.error("Missing filter list"));
        }
        Ok(items)
    }

    fn parse_item(&mut self) -> Result<Filter, FilterError> {
        let attribute = self.parse_attribute()?;

        let op = match (self.peek(), self.peek_at(1)) {
            (Some('='), _) => {
                self.advance();
                FilterOp::Equal
            }
            (Some('~'), Some('=')) => {
                self.cursor += 2;
                FilterOp::Approx
            }
            (Some('>'), Some('=')) => {
                self.cursor += 2;
                FilterOp::GreaterEq
            }
            (Some('<'), Some('=')) => {
                self.cursor += 2;
                FilterOp::LessEq
            }
            _ => return Err(self.error("Invalid operator")),
        };

        let parts = self.parse_value()?;

        // an empty value is only meaningful as equality with ""
        if op != FilterOp::Equal && matches!(parts.as_slice(), [only] if only.is_empty()) {
            return Err(self.error("Missing value"));
        }

        if op == FilterOp::Equal && parts.len() > 1 {
            if parts.iter().all(String::is_empty) && parts.len() == 2 {
                return Ok(Filter::Present { attribute });
            }
            return Ok(Filter::Substring { attribute, parts });
        }

        // '*' is only a wildcard for equality
        Ok(Filter::Compare {
            attribute,
            op,
            value: parts.join("*"),
        })
    }

    fn parse_attribute(&mut self) -> Result<String, FilterError> {
        let start = self.cursor;
        while let Some(c) = self.peek() {
            if matches!(c, '=' | '~' | '<' | '>' | '(' | ')') {
                break;
            }
            self.advance();
        }
        let attribute: String = self.chars[start..self.cursor].iter().map(|(_, c)| c).collect();
        let attribute = attribute.trim().to_string();
        if attribute.is_empty() {
            return Err(self.error("Missing attribute name"));
        }
        Ok(attribute)
    }

    /// Read a value up to the closing parenthesis, split on unescaped `*`
    fn parse_value(&mut self) -> Result<Vec<String>, FilterError> {
        let mut parts = Vec::new();
        let mut current = String::new();

        loop {
            match self.peek() {
                None => return Err(self.error("Unexpected end of filter")),
                Some(')') => break,
                Some('(') => return Err(self.error("Unescaped '(' in value")),
                Some('\\') => {
                    self.advance();
                    match self.peek() {
                        Some(c) => {
                            current.push(c);
                            self.advance();
                        }
                        None => return Err(self.error("Unterminated escape sequence")),
                    }
                }
                Some('*') => {
                    parts.push(std::mem::take(&mut current));
                    self.advance();
                }
                Some(c) => {
                    current.push(c);
                    self.advance();
                }
            }
        }

        parts.push(current);
        Ok(parts)
    }

    fn expect(&mut self, expected: char) -> Result<(), FilterError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.advance();
                Ok(())
            }
            Some(c) => Err(self.error(&format!("Expected '{}' but found '{}'", expected, c))),
            None => Err(self.error(&format!("Expected '{}' but found end of filter", expected))),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.cursor + offset).map(|(_, c)| *c)
    }

    fn advance(&mut self) {
        self.cursor += 1;
    }

    fn error(&self, message: &str) -> FilterError {
        let position = self
            .chars
            .get(self.cursor)
            .map(|(pos, _)| *pos)
            .unwrap_or(self.text.len());
        FilterError {
            message: message.to_string(),
            filter: self.text.to_string(),
            position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_equal() {
        let filter = FilterParser::parse("(a=x)").unwrap();
        assert_eq!(filter, Filter::compare("a", FilterOp::Equal, "x"));
    }

    #[test]
    fn test_parse_operators() {
        assert_eq!(
            FilterParser::parse("(v>=1.0)").unwrap(),
            Filter::compare("v", FilterOp::GreaterEq, "1.0")
        );
        assert_eq!(
            FilterParser::parse("(v<=1.0)").unwrap(),
            Filter::compare("v", FilterOp::LessEq, "1.0")
        );
        assert_eq!(
            FilterParser::parse("(n~=Foo Bar)").unwrap(),
            Filter::compare("n", FilterOp::Approx, "Foo Bar")
        );
    }

    #[test]
    fn test_parse_composite() {
        let filter = FilterParser::parse("(&(a=x)(|(b=y)(!(c=z))))").unwrap();
        assert_eq!(
            filter,
            Filter::And(vec![
                Filter::compare("a", FilterOp::Equal, "x"),
                Filter::Or(vec![
                    Filter::compare("b", FilterOp::Equal, "y"),
                    Filter::Not(Box::new(Filter::compare("c", FilterOp::Equal, "z"))),
                ]),
            ])
        );
    }

    #[test]
    fn test_parse_whitespace_between_items() {
        let filter = FilterParser::parse("  ( & (a=x) (b=y) )  ").unwrap();
        assert!(matches!(filter, Filter::And(ref items) if items.len() == 2));
    }

    #[test]
    fn test_parse_presence_and_substring() {
        assert_eq!(
            FilterParser::parse("(url=*)").unwrap(),
            Filter::Present {
                attribute: "url".to_string()
            }
        );
        assert_eq!(
            FilterParser::parse("(name=org.*.core*)").unwrap(),
            Filter::Substring {
                attribute: "name".to_string(),
                parts: vec!["org.".to_string(), ".core".to_string(), String::new()],
            }
        );
    }

    #[test]
    fn test_parse_empty_equality() {
        let filter = FilterParser::parse("(a=)").unwrap();
        assert_eq!(filter, Filter::compare("a", FilterOp::Equal, ""));
        assert_eq!(filter.to_string(), "(a=)");
    }

    #[test]
    fn test_parse_escapes() {
        let filter = FilterParser::parse(r"(name=a\(b\)\*c)").unwrap();
        assert_eq!(filter, Filter::compare("name", FilterOp::Equal, "a(b)*c"));
    }

    #[test]
    fn test_display_round_trip() {
        let text = r"(&(name=a\(b\))(url=*)(x=pre*post)(!(v>=2.0.0)))";
        let filter = FilterParser::parse(text).unwrap();
        assert_eq!(filter.to_string(), text);
    }

    #[test]
    fn test_parse_errors() {
        for bad in [
            "", "a=x", "(a=x", "(=x)", "(a>x)", "(&)", "(a>=)", "(a~=)", "(a=x))", "(a=x\\",
        ] {
            assert!(FilterParser::parse(bad).is_err(), "expected error for {:?}", bad);
        }
    }

    #[test]
    fn test_error_position() {
        let err = FilterParser::parse("(a>x)").unwrap_err();
        assert_eq!(err.position, 2);
        assert!(err.to_string().contains("Invalid operator"));
    }
}
