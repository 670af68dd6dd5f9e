//! Diagnostics produced by the structural checks.
//!
//! A [`Diagnostic`] is plain data: a message, the source line of the element
//! it concerns (when one can be named), and the message of an underlying
//! failure for infrastructure problems such as an unreadable schema. Every
//! diagnostic is a hard failure of acceptance; there is no severity.

use std::fmt::Display;

use thiserror::Error;

use crate::document::Node;
use crate::error::Error;

/// A single defect found in a METS document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Diagnostic {
    message: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    line_number: Option<u64>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    cause: Option<String>,
}

/// Result of a single cross-reference lookup.
pub type CheckResult<T> = std::result::Result<T, Diagnostic>;

impl Diagnostic {
    /// Creates a diagnostic that cannot be attributed to a source line.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line_number: None,
            cause: None,
        }
    }

    /// Creates a diagnostic attributed to the line of `node`, if it has one.
    pub fn at(node: &Node, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line_number: node.line(),
            cause: None,
        }
    }

    /// Wraps an infrastructure failure.
    pub fn from_error(err: &Error) -> Self {
        Self::new(err.to_string()).with_cause(err)
    }

    /// Attaches the message of an underlying failure.
    pub fn with_cause(mut self, cause: impl Display) -> Self {
        self.cause = Some(cause.to_string());
        self
    }

    /// Human-readable description of the defect.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 1-based source line of the offending element.
    pub fn line_number(&self) -> Option<u64> {
        self.line_number
    }

    /// Message of the underlying failure, for infrastructure diagnostics.
    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }
}

impl From<Error> for Diagnostic {
    fn from(err: Error) -> Self {
        Self::from_error(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Node, XMLNS_METS};

    #[test]
    fn test_at_takes_node_line() {
        let node = Node::new(XMLNS_METS, "div").with_line(42);
        let diagnostic = Diagnostic::at(&node, "Missing @ID attribute.");

        assert_eq!(diagnostic.message(), "Missing @ID attribute.");
        assert_eq!(diagnostic.line_number(), Some(42));
        assert_eq!(diagnostic.cause(), None);
        assert_eq!(diagnostic.to_string(), "Missing @ID attribute.");
    }

    #[test]
    fn test_at_unlocated_node() {
        let node = Node::new(XMLNS_METS, "div");
        assert_eq!(Diagnostic::at(&node, "x").line_number(), None);
    }

    #[test]
    fn test_from_error_carries_cause() {
        let err = Error::Schema("element 'foo' is not expected".to_string());
        let diagnostic = Diagnostic::from(err);

        assert_eq!(diagnostic.line_number(), None);
        assert!(diagnostic.message().contains("element 'foo'"));
        assert_eq!(
            diagnostic.cause(),
            Some("Schema validation error: element 'foo' is not expected")
        );
    }

    // serde_json comes in with the cli feature.
    #[cfg(feature = "cli")]
    #[test]
    fn test_serialize_skips_absent_fields() {
        let diagnostic = Diagnostic::new("Some physical elements are not linked: [p2]");
        let value = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "message": "Some physical elements are not linked: [p2]" })
        );

        let node = Node::new(XMLNS_METS, "div").with_line(7);
        let value = serde_json::to_value(Diagnostic::at(&node, "x")).unwrap();
        assert_eq!(value["lineNumber"], 7);
    }
}
