//! Streaming reader for repository documents

use crate::error::{CodecError, Result};
use crate::wire::{self, TypeSpec};
use caprepo_core::{Attributes, Directives, Resource, ResourceBuilder};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;
use std::io::BufRead;

/// Start tag with its attributes, detached from the read buffer
#[derive(Debug)]
struct Element {
    name: String,
    attributes: BTreeMap<String, String>,
    /// Self-closing, so no children and no end tag follow
    empty: bool,
    position: u64,
}

impl Element {
    fn required(&self, name: &str) -> Result<&str> {
        self.attributes.get(name).map(String::as_str).ok_or_else(|| {
            CodecError::decoding(
                self.position,
                format!("<{}> is missing the '{}' attribute", self.name, name),
            )
        })
    }
}

#[derive(Debug)]
enum Tag {
    Start(Element),
    End(String),
    Eof,
}

/// Reads a repository document one resource at a time
///
/// The root element is read on construction, so the repository attributes
/// are available before the first resource.
pub struct RepositoryReader<R: BufRead> {
    reader: Option<Reader<R>>,
    buf: Vec<u8>,
    attributes: BTreeMap<String, String>,
    exhausted: bool,
}

impl<R: BufRead> RepositoryReader<R> {
    /// Open a document and read its root element
    pub fn new(source: R) -> Result<Self> {
        let mut reader = Reader::from_reader(source);
        reader.config_mut().trim_text(true);

        let mut this = Self {
            reader: Some(reader),
            buf: Vec::new(),
            attributes: BTreeMap::new(),
            exhausted: false,
        };

        match this.next_tag()? {
            Tag::Start(root) if root.name == wire::REPOSITORY => {
                this.exhausted = root.empty;
                this.attributes = root.attributes;
                Ok(this)
            }
            Tag::Start(other) => Err(CodecError::decoding(
                other.position,
                format!("expected <{}>, found <{}>", wire::REPOSITORY, other.name),
            )),
            _ => Err(CodecError::decoding(
                0,
                format!("document has no <{}> element", wire::REPOSITORY),
            )),
        }
    }

    /// Attributes of the root element, without namespace declarations
    pub fn repository_attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Read the next resource, or `None` at the end of the repository
    pub fn next_resource(&mut self) -> Result<Option<Resource>> {
        if self.reader.is_none() {
            return Err(CodecError::InvalidState("reader is closed".to_string()));
        }
        if self.exhausted {
            return Ok(None);
        }

        match self.next_tag()? {
            Tag::Start(element) if element.name == wire::RESOURCE => {
                self.read_resource(&element).map(Some)
            }
            Tag::End(name) if name == wire::REPOSITORY => {
                self.exhausted = true;
                Ok(None)
            }
            Tag::Start(element) => Err(unexpected(&element, wire::REPOSITORY)),
            Tag::End(name) => Err(CodecError::decoding(
                self.position(),
                format!("unexpected </{}>", name),
            )),
            Tag::Eof => Err(self.truncated()),
        }
    }

    /// Release the source; closing twice is a no-op
    pub fn close(&mut self) {
        self.reader = None;
        self.exhausted = true;
    }

    fn read_resource(&mut self, element: &Element) -> Result<Resource> {
        let mut builder = ResourceBuilder::new();
        if element.empty {
            return Ok(builder.build());
        }

        loop {
            match self.next_tag()? {
                Tag::Start(child) if child.name == wire::CAPABILITY => {
                    let (namespace, attributes, directives) = self.read_entry(&child)?;
                    builder
                        .add_generic_capability(&namespace, attributes, directives)
                        .map_err(|e| CodecError::decoding(child.position, e.to_string()))?;
                }
                Tag::Start(child) if child.name == wire::REQUIREMENT => {
                    let (namespace, attributes, directives) = self.read_entry(&child)?;
                    builder
                        .add_generic_requirement(&namespace, attributes, directives)
                        .map_err(|e| CodecError::decoding(child.position, e.to_string()))?;
                }
                Tag::Start(child) => return Err(unexpected(&child, wire::RESOURCE)),
                Tag::End(_) => return Ok(builder.build()),
                Tag::Eof => return Err(self.truncated()),
            }
        }
    }

    /// Read a capability or requirement body
    fn read_entry(&mut self, element: &Element) -> Result<(String, Attributes, Directives)> {
        let namespace = element.required(wire::NAMESPACE_ATTR)?.to_string();
        let mut attributes = Attributes::new();
        let mut directives = Directives::new();
        if element.empty {
            return Ok((namespace, attributes, directives));
        }

        loop {
            match self.next_tag()? {
                Tag::Start(child) if child.name == wire::ATTRIBUTE => {
                    self.expect_leaf(&child)?;
                    let name = child.required(wire::NAME_ATTR)?;
                    let raw = child.required(wire::VALUE_ATTR)?;
                    let type_tag = child.attributes.get(wire::TYPE_ATTR).map(String::as_str);
                    let spec = TypeSpec::parse(type_tag).ok_or_else(|| {
                        CodecError::decoding(
                            child.position,
                            format!("unknown attribute type '{}'", type_tag.unwrap_or_default()),
                        )
                    })?;
                    let value = spec
                        .decode(raw)
                        .map_err(|e| CodecError::decoding(child.position, e.to_string()))?;
                    if attributes.insert(name.to_string(), value).is_some() {
                        return Err(CodecError::decoding(
                            child.position,
                            format!("duplicate attribute '{}'", name),
                        ));
                    }
                }
                Tag::Start(child) if child.name == wire::DIRECTIVE => {
                    self.expect_leaf(&child)?;
                    let name = child.required(wire::NAME_ATTR)?;
                    let value = child.required(wire::VALUE_ATTR)?;
                    if directives
                        .insert(name.to_string(), value.to_string())
                        .is_some()
                    {
                        return Err(CodecError::decoding(
                            child.position,
                            format!("duplicate directive '{}'", name),
                        ));
                    }
                }
                Tag::Start(child) => return Err(unexpected(&child, &element.name)),
                Tag::End(_) => return Ok((namespace, attributes, directives)),
                Tag::Eof => return Err(self.truncated()),
            }
        }
    }

    /// Consume the end tag of an element that must not have children
    fn expect_leaf(&mut self, element: &Element) -> Result<()> {
        if element.empty {
            return Ok(());
        }
        match self.next_tag()? {
            Tag::End(_) => Ok(()),
            Tag::Start(child) => Err(unexpected(&child, &element.name)),
            Tag::Eof => Err(self.truncated()),
        }
    }

    fn next_tag(&mut self) -> Result<Tag> {
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| CodecError::InvalidState("reader is closed".to_string()))?;

        loop {
            self.buf.clear();
            let position = reader.buffer_position() as u64;
            let event = reader
                .read_event_into(&mut self.buf)
                .map_err(|e| CodecError::decoding(reader.buffer_position() as u64, e.to_string()))?;

            match event {
                Event::Start(start) => return element(&start, false, position).map(Tag::Start),
                Event::Empty(start) => return element(&start, true, position).map(Tag::Start),
                Event::End(end) => {
                    let name = utf8(end.local_name().as_ref(), position)?;
                    return Ok(Tag::End(name));
                }
                Event::Eof => return Ok(Tag::Eof),
                Event::Text(text) if text.iter().all(u8::is_ascii_whitespace) => {}
                Event::Text(_) | Event::CData(_) => {
                    return Err(CodecError::decoding(position, "unexpected character data"));
                }
                _ => {}
            }
        }
    }

    fn position(&self) -> u64 {
        self.reader
            .as_ref()
            .map(|r| r.buffer_position() as u64)
            .unwrap_or_default()
    }

    fn truncated(&self) -> CodecError {
        CodecError::decoding(self.position(), "unexpected end of document")
    }
}

fn element(start: &BytesStart<'_>, empty: bool, position: u64) -> Result<Element> {
    let name = utf8(start.local_name().as_ref(), position)?;
    let mut attributes = BTreeMap::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| CodecError::decoding(position, e.to_string()))?;
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let key = utf8(attr.key.local_name().as_ref(), position)?;
        let value = attr
            .unescape_value()
            .map_err(|e| CodecError::decoding(position, e.to_string()))?;
        attributes.insert(key, value.into_owned());
    }
    Ok(Element {
        name,
        attributes,
        empty,
        position,
    })
}

fn utf8(bytes: &[u8], position: u64) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| CodecError::decoding(position, e.to_string()))
}

fn unexpected(element: &Element, parent: &str) -> CodecError {
    CodecError::decoding(
        element.position,
        format!("unexpected <{}> inside <{}>", element.name, parent),
    )
}

/// Read a whole document: repository attributes and every resource
pub fn read_all<R: BufRead>(source: R) -> Result<(BTreeMap<String, String>, Vec<Resource>)> {
    let mut reader = RepositoryReader::new(source)?;
    let mut resources = Vec::new();
    while let Some(resource) = reader.next_resource()? {
        resources.push(resource);
    }
    let attributes = std::mem::take(&mut reader.attributes);
    reader.close();
    Ok((attributes, resources))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(xml: &str) -> Result<(BTreeMap<String, String>, Vec<Resource>)> {
        read_all(xml.as_bytes())
    }

    #[test]
    fn test_empty_repository() {
        let (attrs, resources) = read(r#"<repository name="r" increment="3"/>"#).unwrap();
        assert_eq!(attrs.get("name").map(String::as_str), Some("r"));
        assert_eq!(attrs.get("increment").map(String::as_str), Some("3"));
        assert!(resources.is_empty());
    }

    #[test]
    fn test_namespace_declaration_not_an_attribute() {
        let (attrs, _) = read(
            r#"<repository xmlns="http://www.osgi.org/xmlns/repository/v1.0.0" name="r"></repository>"#,
        )
        .unwrap();
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn test_wrong_root() {
        let err = read("<resources/>").unwrap_err();
        assert!(matches!(err, CodecError::Decoding { .. }));
    }

    #[test]
    fn test_text_content_rejected() {
        let err = read("<repository><resource>oops</resource></repository>").unwrap_err();
        assert!(err.to_string().contains("character data"));
    }

    #[test]
    fn test_truncated_document() {
        let err = read("<repository><resource>").unwrap_err();
        assert!(matches!(err, CodecError::Decoding { .. }));
    }

    #[test]
    fn test_missing_namespace() {
        let err = read("<repository><resource><capability/></resource></repository>").unwrap_err();
        assert!(err.to_string().contains("namespace"));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut reader = RepositoryReader::new("<repository/>".as_bytes()).unwrap();
        reader.close();
        reader.close();
        assert!(matches!(
            reader.next_resource(),
            Err(CodecError::InvalidState(_))
        ));
    }
}
