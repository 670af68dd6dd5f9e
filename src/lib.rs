//! Structural validation for METS digital-archive metadata.
//!
//! A METS document describes a digitized object: its files (`fileSec`), its
//! page sequence (the physical `structMap`), its table of contents (the
//! logical `structMap`) and the links between the two (`structLink`). This
//! crate checks that these parts are internally consistent before a document
//! is accepted into an archive, and reports every defect it finds with the
//! source line of the offending element.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mets_validator::{Validator, ValidatorConfig};
//!
//! let validator = Validator::with_config(&ValidatorConfig::new().with_grammar_check(false));
//! let diagnostics = validator.validate_file("mets.xml");
//!
//! if diagnostics.is_empty() {
//!     println!("valid");
//! }
//! for d in &diagnostics {
//!     println!("{:?}: {}", d.line_number(), d);
//! }
//! ```
//!
//! # Module Structure
//!
//! - [`document`] - Owned, line-annotated document tree
//! - [`reader`] - XML parser producing a [`Document`]
//! - [`writer`] - Serializes a [`Document`] back to XML
//! - [`xref`] - Cross-reference helpers shared by the checks
//! - [`checks`] - The individual checks
//! - [`validator`] - Runs the checks and collects diagnostics
//! - [`diagnostic`], [`error`] - Result and error types
//!
//! # Optional Features
//!
//! - `serde` - Serialize diagnostics (JSON field names `message`,
//!   `lineNumber`, `cause`)
//! - `validation` - Grammar conformance against the METS XML Schema via libxml2
//! - `cli` - The `mets_validate` command-line tool

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod checks;
pub mod config;
pub mod diagnostic;
pub mod document;
pub mod error;
pub mod reader;
pub mod validator;
pub mod writer;
pub mod xref;

// Re-export commonly used types at the crate root
pub use checks::Check;
pub use config::{LogicalRules, ValidatorConfig};
pub use diagnostic::Diagnostic;
pub use document::{Document, Node};
pub use error::{Error, Result};
pub use reader::{parse_bytes, parse_file, parse_reader, parse_str};
pub use validator::Validator;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
