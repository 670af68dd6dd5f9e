//! METS document reader.
//!
//! Builds an owned [`Document`] tree from XML text. It uses `quick-xml`'s
//! namespace-aware reader, so elements and attributes carry resolved
//! namespace URIs rather than prefixes, and every element records the line on
//! which its start tag ends.
//!
//! # Example
//!
//! ```rust,no_run
//! use mets_validator::reader::parse_file;
//!
//! let doc = parse_file("mets.xml").unwrap();
//! println!("root: {}", doc.root().name());
//! ```

use crate::document::{Attribute, Document, Node, XMLNS_METS};
use crate::error::{Error, Result};
use quick_xml::events::BytesStart;
use quick_xml::events::Event as XmlEvent;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use std::fs;
use std::io::BufRead;
use std::path::Path;
use std::str;

/// Tracks the current line while the reader moves forward through the input.
#[derive(Debug)]
struct LineCounter<'a> {
    input: &'a [u8],
    offset: usize,
    line: u64,
}

impl<'a> LineCounter<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            offset: 0,
            line: 1,
        }
    }

    /// Returns the 1-based line containing the byte just before `position`.
    fn line_at(&mut self, position: usize) -> u64 {
        let position = position.min(self.input.len());
        if position > self.offset {
            let newlines = self.input[self.offset..position]
                .iter()
                .filter(|&&b| b == b'\n')
                .count();
            self.line += newlines as u64;
            self.offset = position;
        }
        self.line
    }
}

/// Intermediate parsed event data (owned, to avoid borrow conflicts).
enum ParsedEvent {
    Start(Node),
    Empty(Node),
    End,
    Eof,
}

/// Builds a [`Document`] tree from a string slice.
struct DocumentReader<'a> {
    reader: NsReader<&'a [u8]>,
    lines: LineCounter<'a>,
    stack: Vec<Node>,
    root: Option<Node>,
}

impl<'a> DocumentReader<'a> {
    fn new(xml: &'a str) -> Self {
        let mut reader = NsReader::from_str(xml);
        reader.config_mut().trim_text(true);

        Self {
            reader,
            lines: LineCounter::new(xml.as_bytes()),
            stack: Vec::new(),
            root: None,
        }
    }

    /// Reads the whole input and returns the root element.
    fn read(mut self) -> Result<Node> {
        loop {
            match self.parse_next()? {
                Some(ParsedEvent::Start(node)) => self.open(node)?,
                Some(ParsedEvent::Empty(node)) => {
                    self.open(node)?;
                    self.close()?;
                }
                Some(ParsedEvent::End) => self.close()?,
                Some(ParsedEvent::Eof) => break,
                None => {}
            }
        }

        if let Some(open) = self.stack.last() {
            return Err(Error::UnexpectedElement(format!(
                "unclosed element <{}>",
                open.name()
            )));
        }
        self.root.ok_or(Error::MissingRoot)
    }

    /// Parses the next event of interest from the XML stream.
    fn parse_next(&mut self) -> Result<Option<ParsedEvent>> {
        let (resolved, event) = self.reader.read_resolved_event()?;
        // consumed right away so the reader is free again for attribute lookup
        let namespace = namespace_uri(resolved)?;

        let parsed = match event {
            XmlEvent::Start(ref e) => Some(ParsedEvent::Start(self.build_node(e, namespace)?)),
            XmlEvent::Empty(ref e) => Some(ParsedEvent::Empty(self.build_node(e, namespace)?)),
            XmlEvent::End(_) => Some(ParsedEvent::End),
            XmlEvent::Eof => Some(ParsedEvent::Eof),
            // Text, comments, processing instructions and the doctype carry
            // nothing the checks look at.
            _ => None,
        };
        Ok(parsed)
    }

    /// Converts a start tag into a childless node.
    fn build_node(&mut self, e: &BytesStart<'_>, namespace: Option<String>) -> Result<Node> {
        let local_name = e.local_name();
        let name = str::from_utf8(local_name.as_ref())?.to_string();
        let line = self.lines.line_at(self.reader.buffer_position() as usize);

        let mut node = Node::with_optional_namespace(namespace, name).with_line(line);
        for attr in e.attributes() {
            let attr = attr?;
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let (resolved, local) = self.reader.resolve_attribute(attr.key);
            let namespace = namespace_uri(resolved)?;
            let name = str::from_utf8(local.as_ref())?.to_string();
            let value = attr.unescape_value()?.into_owned();
            node.push_attribute(Attribute {
                name,
                namespace,
                value,
            });
        }
        Ok(node)
    }

    fn open(&mut self, node: Node) -> Result<()> {
        if self.stack.is_empty() && self.root.is_some() {
            return Err(Error::UnexpectedElement(format!(
                "<{}> after the root element",
                node.name()
            )));
        }
        self.stack.push(node);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let node = self
            .stack
            .pop()
            .ok_or_else(|| Error::UnexpectedElement("end tag without start tag".to_string()))?;
        match self.stack.last_mut() {
            Some(parent) => parent.push_child(node),
            None => self.root = Some(node),
        }
        Ok(())
    }
}

fn namespace_uri(resolved: ResolveResult<'_>) -> Result<Option<String>> {
    match resolved {
        ResolveResult::Bound(Namespace(uri)) => Ok(Some(str::from_utf8(uri)?.to_string())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(Error::UnknownPrefix(
            String::from_utf8_lossy(&prefix).into_owned(),
        )),
    }
}

/// Parses a METS document from a string.
///
/// The root element must be `mets:mets`. The source text is kept on the
/// returned document for grammar validation.
pub fn parse_str(xml: &str) -> Result<Document> {
    let root = DocumentReader::new(xml).read()?;
    if !root.is(XMLNS_METS, "mets") {
        return Err(Error::UnexpectedElement(format!(
            "root element <{}> is not mets:mets",
            root.name()
        )));
    }
    Ok(Document::with_source(root, xml.to_string()))
}

/// Parses a METS document from UTF-8 bytes.
pub fn parse_bytes(bytes: &[u8]) -> Result<Document> {
    parse_str(str::from_utf8(bytes)?)
}

/// Parses a METS document from any buffered reader.
///
/// The whole input is read into memory first; line numbers refer to it.
pub fn parse_reader<R: BufRead>(mut reader: R) -> Result<Document> {
    let mut xml = String::new();
    reader.read_to_string(&mut xml)?;
    parse_str(&xml)
}

/// Parses a METS document from a file.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let bytes = fs::read(path)?;
    parse_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::XMLNS_XLINK;
    use std::io::{Cursor, Write};

    const SIMPLE_METS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<mets:mets xmlns:mets="http://www.loc.gov/METS/"
           xmlns:xlink="http://www.w3.org/1999/xlink">
  <!-- inventory -->
  <mets:fileSec>
    <mets:fileGrp USE="MASTER">
      <mets:file ID="master_1" MIMETYPE="image/tiff">
        <mets:FLocat LOCTYPE="URL" xlink:href="images/0001.tif"/>
      </mets:file>
    </mets:fileGrp>
  </mets:fileSec>
  <mets:structLink>
    <mets:smLink xlink:from="log_1" xlink:to="phys_1"/>
  </mets:structLink>
</mets:mets>"#;

    #[test]
    fn test_parse_simple_mets() {
        let doc = parse_str(SIMPLE_METS).unwrap();
        let root = doc.root();

        assert!(root.is(XMLNS_METS, "mets"));
        assert_eq!(root.line(), Some(3));
        assert_eq!(root.children().len(), 2);
        assert_eq!(doc.source(), Some(SIMPLE_METS));
    }

    #[test]
    fn test_line_numbers_and_attributes() {
        let doc = parse_str(SIMPLE_METS).unwrap();
        let root = doc.root();

        let file_grp = root
            .child(XMLNS_METS, "fileSec")
            .and_then(|s| s.child(XMLNS_METS, "fileGrp"))
            .unwrap();
        assert_eq!(file_grp.line(), Some(6));
        assert_eq!(file_grp.attribute("USE"), Some("MASTER"));

        let flocat = file_grp
            .child(XMLNS_METS, "file")
            .and_then(|f| f.child(XMLNS_METS, "FLocat"))
            .unwrap();
        assert_eq!(flocat.line(), Some(8));
        assert_eq!(
            flocat.attribute_ns(Some(XMLNS_XLINK), "href"),
            Some("images/0001.tif")
        );
        // the prefixed attribute is not visible without its namespace
        assert_eq!(flocat.attribute("href"), None);
        // xmlns declarations are not attributes
        assert!(root.attributes().is_empty());
    }

    #[test]
    fn test_default_namespace() {
        let xml = r#"<mets xmlns="http://www.loc.gov/METS/"><structLink/></mets>"#;
        let doc = parse_str(xml).unwrap();
        assert!(doc.root().child(XMLNS_METS, "structLink").is_some());
    }

    #[test]
    fn test_wrong_root_is_rejected() {
        let result = parse_str(r#"<html lang="en"/>"#);
        assert!(matches!(result, Err(Error::UnexpectedElement(_))));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(parse_str(""), Err(Error::MissingRoot)));
    }

    #[test]
    fn test_unknown_prefix() {
        let result = parse_str(r#"<mets:mets xmlns:mets="http://www.loc.gov/METS/"><x:div/></mets:mets>"#);
        assert!(matches!(result, Err(Error::UnknownPrefix(p)) if p == "x"));
    }

    #[test]
    fn test_malformed_xml() {
        let result = parse_str(r#"<mets:mets xmlns:mets="http://www.loc.gov/METS/"><mets:div></mets:mets>"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_reader_and_file() {
        let doc = parse_reader(Cursor::new(SIMPLE_METS)).unwrap();
        assert_eq!(doc.root().children().len(), 2);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SIMPLE_METS.as_bytes()).unwrap();
        let from_file = parse_file(file.path()).unwrap();
        assert_eq!(from_file, doc);
    }

    #[test]
    fn test_line_counter() {
        let mut lines = LineCounter::new(b"a\nb\n\nc");
        assert_eq!(lines.line_at(1), 1);
        assert_eq!(lines.line_at(2), 2);
        assert_eq!(lines.line_at(5), 4);
        assert_eq!(lines.line_at(100), 4);
    }
}
