//! Error types for the METS validator.
//!
//! These are infrastructure failures: the document could not be read or
//! parsed, or the grammar resource could not be used. Structural defects in
//! a well-formed document are reported as [`Diagnostic`](crate::Diagnostic)s
//! instead.

use thiserror::Error;

/// Errors that can occur while building or validating a METS document.
#[derive(Error, Debug)]
pub enum Error {
    /// XML parsing error
    #[error("XML parsing error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    /// XML attribute parsing error
    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 conversion error
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// A namespace prefix was used without being declared
    #[error("Unknown namespace prefix: {0}")]
    UnknownPrefix(String),

    /// The document has no root element
    #[error("Missing root element")]
    MissingRoot,

    /// Unexpected XML element
    #[error("Unexpected XML element: {0}")]
    UnexpectedElement(String),

    /// The document does not conform to the grammar
    #[error("Schema validation error: {0}")]
    Schema(String),

    /// The grammar itself could not be loaded
    #[error("Unable to load schema: {0}")]
    SchemaLoad(String),
}

/// Result type alias for validator operations.
pub type Result<T> = std::result::Result<T, Error>;
