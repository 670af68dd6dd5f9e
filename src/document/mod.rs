//! METS document tree.
//!
//! - [`Document`] - A parsed METS document and, when parsed from text, its source
//! - [`Node`] - An element with attributes, children and a source line
//! - [`Attribute`] - A namespaced attribute value
//!
//! Also provides the namespace URIs and the fixed vocabulary (struct map
//! types, file group uses) the checks look for.

mod common;
mod node;

use std::borrow::Cow;

pub use common::{
    ALTO_DIRECTORY, BETYPE_IDREF, DIV_PAGE, DIV_PHYS_SEQUENCE, STRUCT_MAP_LOGICAL,
    STRUCT_MAP_PHYSICAL, USE_ALTO, USE_MASTER, XMLNS_METS, XMLNS_XLINK,
};
pub use node::{Attribute, Descendants, Node};

use crate::error::Result;

/// A METS document: the `mets` root element and everything below it.
///
/// The tree is read-only for the duration of a validation run, so one
/// document can be shared across threads and validated repeatedly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Node,
    source: Option<String>,
}

impl Document {
    /// Wraps a programmatically built tree.
    pub fn new(root: Node) -> Self {
        Self { root, source: None }
    }

    pub(crate) fn with_source(root: Node, source: String) -> Self {
        Self {
            root,
            source: Some(source),
        }
    }

    /// The `mets` root element.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// The text this document was parsed from, if any.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// XML text of this document: the original source when available,
    /// otherwise a serialization of the tree.
    pub fn to_xml(&self) -> Result<Cow<'_, str>> {
        match &self.source {
            Some(source) => Ok(Cow::Borrowed(source)),
            None => crate::writer::to_string(self).map(Cow::Owned),
        }
    }
}
