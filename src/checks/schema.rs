//! Grammar conformance.
//!
//! The grammar itself is an external collaborator behind the [`Grammar`]
//! trait. With the `validation` feature, [`XsdGrammar`] validates against a
//! METS XML Schema through libxml2, which must be installed on the system.

use crate::checks::Check;
use crate::diagnostic::Diagnostic;
use crate::document::Document;
use crate::error::{Error, Result};

/// Something that can tell whether XML text conforms to a formal grammar.
pub trait Grammar: Send + Sync {
    /// Returns `Err(Error::Schema(_))` if `xml` does not conform. Any other
    /// error means the grammar could not be applied.
    fn conform(&self, xml: &str) -> Result<()>;
}

/// Wraps a [`Grammar`] as a [`Check`].
pub struct SchemaCheck<G> {
    grammar: G,
}

impl<G: Grammar> SchemaCheck<G> {
    /// Creates a check backed by the given grammar.
    pub fn new(grammar: G) -> Self {
        Self { grammar }
    }
}

impl<G: Grammar> Check for SchemaCheck<G> {
    fn name(&self) -> &'static str {
        "schema"
    }

    fn check(&self, doc: &Document) -> Result<Vec<Diagnostic>> {
        let xml = doc.to_xml()?;
        match self.grammar.conform(&xml) {
            Ok(()) => Ok(Vec::new()),
            Err(Error::Schema(reason)) => Ok(vec![Diagnostic::new(
                "Document does not conform to the METS schema.",
            )
            .with_cause(reason)]),
            Err(err) => Err(err),
        }
    }
}

#[cfg(feature = "validation")]
pub use xsd::XsdGrammar;

#[cfg(feature = "validation")]
mod xsd {
    use std::path::{Path, PathBuf};

    use libxml::parser::Parser;
    use libxml::schemas::{SchemaParserContext, SchemaValidationContext};

    use super::Grammar;
    use crate::error::{Error, Result};

    /// METS XML Schema validation through libxml2.
    #[derive(Debug, Clone)]
    pub struct XsdGrammar {
        schema_path: PathBuf,
    }

    impl XsdGrammar {
        /// Creates a grammar from an XSD file. The file is read on every
        /// validation.
        pub fn new(schema_path: impl Into<PathBuf>) -> Self {
            Self {
                schema_path: schema_path.into(),
            }
        }

        /// Location of the XSD file.
        pub fn schema_path(&self) -> &Path {
            &self.schema_path
        }
    }

    impl Grammar for XsdGrammar {
        fn conform(&self, xml: &str) -> Result<()> {
            if !self.schema_path.exists() {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("Schema file not found: {}", self.schema_path.display()),
                )));
            }

            let mut schema_parser =
                SchemaParserContext::from_file(self.schema_path.to_string_lossy().as_ref());
            let mut validation_context = SchemaValidationContext::from_parser(&mut schema_parser)
                .map_err(|errors| {
                    let msg = errors
                        .iter()
                        .map(|e| e.message.clone().unwrap_or_default())
                        .collect::<Vec<_>>()
                        .join("; ");
                    Error::SchemaLoad(msg)
                })?;

            let parser = Parser::default();
            let doc = parser
                .parse_string(xml)
                .map_err(|e| Error::Schema(format!("Failed to parse XML string: {:?}", e)))?;

            validation_context.validate_document(&doc).map_err(|errors| {
                let msg = errors
                    .iter()
                    .map(|e| e.message.clone().unwrap_or_default())
                    .map(|m| m.trim().to_string())
                    .collect::<Vec<_>>()
                    .join("; ");
                Error::Schema(msg)
            })
        }
    }
}
