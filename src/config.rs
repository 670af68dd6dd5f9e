//! Validator configuration.

use std::path::PathBuf;

use crate::document::USE_ALTO;

/// Default location of the METS XML Schema (relative to the working directory).
pub const DEFAULT_SCHEMA_PATH: &str = "schema/mets.xsd";

/// Rules applied to every division of the logical struct map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalRules {
    /// Report a division whose `ID` was already used in the same struct map
    pub unique_ids: bool,
    /// Require `LABEL` to be non-empty rather than merely present
    pub non_empty_labels: bool,
    /// Require an `ORDER` attribute on divisions below the top division
    pub require_order: bool,
}

impl Default for LogicalRules {
    fn default() -> Self {
        Self {
            unique_ids: true,
            non_empty_labels: true,
            require_order: false,
        }
    }
}

/// Configuration for a [`Validator`](crate::Validator).
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// XSD used by the grammar check
    pub schema_path: Option<PathBuf>,
    /// Whether to run the grammar check (needs the `validation` feature)
    pub grammar_check: bool,
    /// Logical struct map rules
    pub logical: LogicalRules,
    /// Whether to run the page-annotation cross-reference check
    pub annotation_check: bool,
    /// `USE` of the file group checked by the annotation check
    pub annotation_use: String,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            schema_path: Some(PathBuf::from(DEFAULT_SCHEMA_PATH)),
            grammar_check: true,
            logical: LogicalRules::default(),
            annotation_check: false,
            annotation_use: USE_ALTO.to_string(),
        }
    }
}

impl ValidatorConfig {
    /// Creates a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the XSD used by the grammar check.
    pub fn with_schema_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_path = Some(path.into());
        self
    }

    /// Enables or disables the grammar check.
    pub fn with_grammar_check(mut self, enabled: bool) -> Self {
        self.grammar_check = enabled;
        self
    }

    /// Sets the logical struct map rules.
    pub fn with_logical_rules(mut self, rules: LogicalRules) -> Self {
        self.logical = rules;
        self
    }

    /// Enables the annotation check for the file group with the given `USE`.
    pub fn with_annotation_check(mut self, file_use: impl Into<String>) -> Self {
        self.annotation_check = true;
        self.annotation_use = file_use.into();
        self
    }
}
