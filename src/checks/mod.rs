//! The structural checks run by the [`Validator`](crate::Validator).
//!
//! - [`SchemaCheck`] - Grammar conformance through a [`Grammar`] collaborator
//! - [`FileSectionCheck`] - The `MASTER` and `ALTO` file groups
//! - [`PhysicalStructureCheck`] - The page sequence
//! - [`LogicalStructureCheck`] - The table of contents
//! - [`StructLinkCheck`] - Links between logical and physical divisions
//! - [`AnnotationCheck`] - Optional; every annotation file is referenced

mod annotation;
mod file_section;
mod logical;
mod physical;
mod schema;
mod struct_link;

pub use annotation::AnnotationCheck;
pub use file_section::FileSectionCheck;
pub use logical::LogicalStructureCheck;
pub use physical::PhysicalStructureCheck;
#[cfg(feature = "validation")]
pub use schema::XsdGrammar;
pub use schema::{Grammar, SchemaCheck};
pub use struct_link::StructLinkCheck;

use crate::diagnostic::Diagnostic;
use crate::document::Document;
use crate::error::Result;

/// One independent validation step.
///
/// Structural defects are returned as diagnostics. `Err` is reserved for
/// failures that stop the check from judging the document at all; the
/// validator turns those into diagnostics too.
pub trait Check: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Checks the document and returns every defect found.
    fn check(&self, doc: &Document) -> Result<Vec<Diagnostic>>;
}
