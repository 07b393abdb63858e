//! Streaming writer for repository documents

use crate::error::{CodecError, Result};
use crate::wire::{self, encode_value, EncodedValue};
use caprepo_core::{Attributes, Directives, Resource};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::collections::BTreeMap;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    /// Declaration written, root element not yet
    Open,
    /// Root element written
    Started,
    Closed,
}

/// Writes a repository document one resource at a time
///
/// The repository attributes, if any, must be written before the first
/// resource. Dropping the writer closes the document; call
/// [`RepositoryWriter::close`] or [`RepositoryWriter::finish`] to observe
/// errors.
pub struct RepositoryWriter<W: Write> {
    writer: Option<Writer<W>>,
    state: WriterState,
}

impl<W: Write> RepositoryWriter<W> {
    /// Start a document on `sink`
    pub fn new(sink: W) -> Result<Self> {
        let mut writer = Writer::new_with_indent(sink, b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        Ok(Self {
            writer: Some(writer),
            state: WriterState::Open,
        })
    }

    /// Write the root element with the given attributes
    pub fn write_repository_attributes(
        &mut self,
        attributes: &BTreeMap<String, String>,
    ) -> Result<()> {
        match self.state {
            WriterState::Open => self.start_repository(attributes),
            WriterState::Started => Err(CodecError::InvalidState(
                "repository attributes must be written once, before any resource".to_string(),
            )),
            WriterState::Closed => Err(closed()),
        }
    }

    /// Append one resource
    ///
    /// Every attribute is encoded before anything is written, so a value
    /// that cannot be encoded leaves the document untouched.
    pub fn write_resource(&mut self, resource: &Resource) -> Result<()> {
        let capabilities = resource
            .capabilities()
            .iter()
            .map(|cap| encode_entry(cap.namespace(), cap.attributes(), cap.directives()))
            .collect::<Result<Vec<_>>>()?;
        let requirements = resource
            .requirements()
            .iter()
            .map(|req| encode_entry(req.namespace(), req.attributes(), req.directives()))
            .collect::<Result<Vec<_>>>()?;

        match self.state {
            WriterState::Open => self.start_repository(&BTreeMap::new())?,
            WriterState::Started => {}
            WriterState::Closed => return Err(closed()),
        }

        let writer = self.writer_mut()?;
        if capabilities.is_empty() && requirements.is_empty() {
            writer.write_event(Event::Empty(BytesStart::new(wire::RESOURCE)))?;
            return Ok(());
        }

        writer.write_event(Event::Start(BytesStart::new(wire::RESOURCE)))?;
        for entry in &capabilities {
            write_entry(writer, wire::CAPABILITY, entry)?;
        }
        for entry in &requirements {
            write_entry(writer, wire::REQUIREMENT, entry)?;
        }
        writer.write_event(Event::End(BytesEnd::new(wire::RESOURCE)))?;
        Ok(())
    }

    /// Terminate the document and flush the sink
    ///
    /// Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        match self.state {
            WriterState::Closed => return Ok(()),
            WriterState::Open => self.start_repository(&BTreeMap::new())?,
            WriterState::Started => {}
        }
        self.state = WriterState::Closed;
        let writer = self.writer_mut()?;
        writer.write_event(Event::End(BytesEnd::new(wire::REPOSITORY)))?;
        writer.get_mut().flush()?;
        Ok(())
    }

    /// Close the document and hand back the sink
    pub fn finish(mut self) -> Result<W> {
        self.close()?;
        self.writer
            .take()
            .map(Writer::into_inner)
            .ok_or_else(closed)
    }

    fn start_repository(&mut self, attributes: &BTreeMap<String, String>) -> Result<()> {
        let mut root = BytesStart::new(wire::REPOSITORY);
        root.push_attribute(("xmlns", wire::REPOSITORY_NAMESPACE));
        for (name, value) in attributes {
            root.push_attribute((name.as_str(), value.as_str()));
        }
        self.writer_mut()?.write_event(Event::Start(root))?;
        self.state = WriterState::Started;
        Ok(())
    }

    fn writer_mut(&mut self) -> Result<&mut Writer<W>> {
        self.writer.as_mut().ok_or_else(closed)
    }
}

impl<W: Write> Drop for RepositoryWriter<W> {
    fn drop(&mut self) {
        if self.writer.is_some() {
            if let Err(e) = self.close() {
                log::warn!("Failed to close repository document: {}", e);
            }
        }
    }
}

fn closed() -> CodecError {
    CodecError::InvalidState("writer is closed".to_string())
}

struct EncodedEntry<'a> {
    namespace: &'a str,
    attributes: Vec<(&'a str, EncodedValue)>,
    directives: &'a Directives,
}

fn encode_entry<'a>(
    namespace: &'a str,
    attributes: &'a Attributes,
    directives: &'a Directives,
) -> Result<EncodedEntry<'a>> {
    let attributes = attributes
        .iter()
        .map(|(name, value)| Ok((name.as_str(), encode_value(name, value)?)))
        .collect::<Result<Vec<_>>>()?;
    Ok(EncodedEntry {
        namespace,
        attributes,
        directives,
    })
}

fn write_entry<W: Write>(
    writer: &mut Writer<W>,
    element: &str,
    entry: &EncodedEntry<'_>,
) -> Result<()> {
    let mut start = BytesStart::new(element);
    start.push_attribute((wire::NAMESPACE_ATTR, entry.namespace));

    if entry.attributes.is_empty() && entry.directives.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for (name, encoded) in &entry.attributes {
        let mut attribute = BytesStart::new(wire::ATTRIBUTE);
        attribute.push_attribute((wire::NAME_ATTR, *name));
        attribute.push_attribute((wire::VALUE_ATTR, encoded.text.as_str()));
        if let Some(tag) = &encoded.type_tag {
            attribute.push_attribute((wire::TYPE_ATTR, tag.as_str()));
        }
        writer.write_event(Event::Empty(attribute))?;
    }
    for (name, value) in entry.directives {
        let mut directive = BytesStart::new(wire::DIRECTIVE);
        directive.push_attribute((wire::NAME_ATTR, name.as_str()));
        directive.push_attribute((wire::VALUE_ATTR, value.as_str()));
        writer.write_event(Event::Empty(directive))?;
    }
    writer.write_event(Event::End(BytesEnd::new(element)))?;
    Ok(())
}

/// Write a whole document to `sink`
pub fn write_all<W: Write>(
    sink: W,
    attributes: &BTreeMap<String, String>,
    resources: &[Resource],
) -> Result<W> {
    let mut writer = RepositoryWriter::new(sink)?;
    writer.write_repository_attributes(attributes)?;
    for resource in resources {
        writer.write_resource(resource)?;
    }
    writer.finish()
}
