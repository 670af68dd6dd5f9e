//! METS writer for serializing a document tree back to XML.
//!
//! Used when a [`Document`] was assembled in code rather than parsed, so the
//! grammar check still has XML text to hand to the schema validator.
//! Namespaces are declared once on the root element; METS and XLink get their
//! customary `mets:` and `xlink:` prefixes.
//!
//! # Example
//!
//! ```rust
//! use mets_validator::document::{Document, Node, XMLNS_METS};
//! use mets_validator::writer::MetsWriter;
//!
//! let doc = Document::new(Node::new(XMLNS_METS, "mets"));
//! let xml = MetsWriter::new().write_to_string(&doc).unwrap();
//! assert!(xml.contains("<mets:mets"));
//! ```

use crate::document::{Document, Node, XMLNS_METS, XMLNS_XLINK};
use crate::error::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::io::Write;

/// Configuration options for the METS writer.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Whether to indent the output for readability
    pub indent: bool,
    /// Number of spaces per indentation level
    pub indent_width: usize,
    /// Whether to include the XML declaration
    pub xml_declaration: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            indent: true,
            indent_width: 2,
            xml_declaration: true,
        }
    }
}

impl WriterConfig {
    /// Creates a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a compact configuration (no indentation).
    pub fn compact() -> Self {
        Self {
            indent: false,
            indent_width: 0,
            xml_declaration: true,
        }
    }
}

/// Prefix assignment for every namespace used in a tree.
struct Prefixes {
    bindings: Vec<(String, String)>,
}

impl Prefixes {
    fn collect(root: &Node) -> Self {
        let mut prefixes = Self {
            bindings: Vec::new(),
        };
        let nodes = std::iter::once(root).chain(root.descendants());
        for node in nodes {
            if let Some(ns) = node.namespace() {
                prefixes.bind(ns);
            }
            for attr in node.attributes() {
                if let Some(ns) = attr.namespace.as_deref() {
                    prefixes.bind(ns);
                }
            }
        }
        prefixes
    }

    fn bind(&mut self, namespace: &str) {
        if self.bindings.iter().any(|(ns, _)| ns == namespace) {
            return;
        }
        let prefix = match namespace {
            XMLNS_METS => "mets".to_string(),
            XMLNS_XLINK => "xlink".to_string(),
            _ => format!("ns{}", self.bindings.len()),
        };
        self.bindings.push((namespace.to_string(), prefix));
    }

    fn qualify(&self, namespace: Option<&str>, name: &str) -> String {
        let prefix = namespace.and_then(|namespace| {
            self.bindings
                .iter()
                .find(|(ns, _)| ns == namespace)
                .map(|(_, prefix)| prefix)
        });
        match prefix {
            Some(prefix) => format!("{}:{}", prefix, name),
            None => name.to_string(),
        }
    }
}

/// METS XML writer.
pub struct MetsWriter {
    config: WriterConfig,
}

impl MetsWriter {
    /// Creates a new writer with default configuration.
    pub fn new() -> Self {
        Self {
            config: WriterConfig::default(),
        }
    }

    /// Creates a new writer with the specified configuration.
    pub fn with_config(config: WriterConfig) -> Self {
        Self { config }
    }

    /// Writes a document to a string.
    pub fn write_to_string(&self, doc: &Document) -> Result<String> {
        let mut buffer = Vec::new();
        self.write(doc, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Writes a document to any Write implementation.
    pub fn write<W: Write>(&self, doc: &Document, writer: W) -> Result<()> {
        let mut xml_writer = if self.config.indent {
            Writer::new_with_indent(writer, b' ', self.config.indent_width)
        } else {
            Writer::new(writer)
        };

        if self.config.xml_declaration {
            xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
            if self.config.indent {
                xml_writer.get_mut().write_all(b"\n")?;
            }
        }

        let prefixes = Prefixes::collect(doc.root());
        self.write_node(&mut xml_writer, doc.root(), &prefixes, true)
    }

    fn write_node<W: Write>(
        &self,
        writer: &mut Writer<W>,
        node: &Node,
        prefixes: &Prefixes,
        is_root: bool,
    ) -> Result<()> {
        let name = prefixes.qualify(node.namespace(), node.name());
        let mut start = BytesStart::new(name.as_str());

        if is_root {
            for (ns, prefix) in &prefixes.bindings {
                let key = format!("xmlns:{}", prefix);
                start.push_attribute((key.as_str(), ns.as_str()));
            }
        }
        for attr in node.attributes() {
            let key = prefixes.qualify(attr.namespace.as_deref(), &attr.name);
            start.push_attribute((key.as_str(), attr.value.as_str()));
        }

        if node.children().is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        for child in node.children() {
            self.write_node(writer, child, prefixes, false)?;
        }
        writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
        Ok(())
    }
}

impl Default for MetsWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to write a document to a string with default settings.
pub fn to_string(doc: &Document) -> Result<String> {
    MetsWriter::new().write_to_string(doc)
}
