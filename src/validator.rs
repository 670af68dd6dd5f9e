//! The validator runs an ordered list of checks over one document.
//!
//! Each check is isolated: its diagnostics are appended to the result, and a
//! check that fails outright (an infrastructure error or a panic) becomes one
//! more diagnostic instead of ending the run. An empty result means the
//! document is accepted.
//!
//! # Example
//!
//! ```rust,no_run
//! use mets_validator::{Validator, ValidatorConfig};
//!
//! let config = ValidatorConfig::new().with_grammar_check(false);
//! let validator = Validator::with_config(&config);
//!
//! let diagnostics = validator.validate_file("mets.xml");
//! for d in &diagnostics {
//!     match d.line_number() {
//!         Some(line) => eprintln!("line {}: {}", line, d),
//!         None => eprintln!("{}", d),
//!     }
//! }
//! ```

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use tracing::{debug, warn};

use crate::checks::{
    AnnotationCheck, Check, FileSectionCheck, Grammar, LogicalStructureCheck,
    PhysicalStructureCheck, SchemaCheck, StructLinkCheck,
};
use crate::config::ValidatorConfig;
use crate::diagnostic::Diagnostic;
use crate::document::Document;
use crate::reader;

/// Runs checks against METS documents.
pub struct Validator {
    checks: Vec<Box<dyn Check>>,
}

impl Validator {
    /// Creates a validator with the default checks and configuration.
    pub fn new() -> Self {
        Self::with_config(&ValidatorConfig::default())
    }

    /// Creates a validator with the default checks, configured by `config`.
    ///
    /// Order: grammar (when enabled and available), file section, physical
    /// structure, logical structure, struct links, then the annotation check
    /// if requested.
    pub fn with_config(config: &ValidatorConfig) -> Self {
        let mut validator = Self::empty();
        if let Some(check) = grammar_check(config) {
            validator.checks.push(check);
        }
        validator
            .checks
            .push(Box::new(FileSectionCheck::new()));
        validator
            .checks
            .push(Box::new(PhysicalStructureCheck::new()));
        validator
            .checks
            .push(Box::new(LogicalStructureCheck::with_rules(config.logical)));
        validator.checks.push(Box::new(StructLinkCheck::new()));
        if config.annotation_check {
            validator.checks.push(Box::new(AnnotationCheck::for_file_group(
                config.annotation_use.clone(),
            )));
        }
        validator
    }

    /// Creates a validator without any checks.
    pub fn empty() -> Self {
        Self { checks: Vec::new() }
    }

    /// Appends a check to the end of the list.
    pub fn with_check(mut self, check: impl Check + 'static) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    /// Puts a grammar check in front of all other checks.
    pub fn with_grammar<G: Grammar + 'static>(mut self, grammar: G) -> Self {
        self.checks.insert(0, Box::new(SchemaCheck::new(grammar)));
        self
    }

    /// Names of the configured checks, in run order.
    pub fn check_names(&self) -> Vec<&'static str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    /// Runs every check against `doc` and returns all diagnostics.
    pub fn validate(&self, doc: &Document) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for check in &self.checks {
            diagnostics.extend(run_check(check.as_ref(), doc));
        }
        debug!(diagnostics = diagnostics.len(), "validation finished");
        diagnostics
    }

    /// Parses and validates XML text.
    ///
    /// A document that cannot be parsed yields a single diagnostic carrying
    /// the parse error as its cause.
    pub fn validate_str(&self, xml: &str) -> Vec<Diagnostic> {
        match reader::parse_str(xml) {
            Ok(doc) => self.validate(&doc),
            Err(err) => {
                warn!(error = %err, "document could not be parsed");
                vec![Diagnostic::from_error(&err)]
            }
        }
    }

    /// Parses and validates a file.
    pub fn validate_file<P: AsRef<Path>>(&self, path: P) -> Vec<Diagnostic> {
        let path = path.as_ref();
        match reader::parse_file(path) {
            Ok(doc) => self.validate(&doc),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "document could not be read");
                vec![Diagnostic::from_error(&err)]
            }
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs one check, turning errors and panics into diagnostics.
fn run_check(check: &dyn Check, doc: &Document) -> Vec<Diagnostic> {
    let name = check.name();
    debug!(check = name, "running check");

    match panic::catch_unwind(AssertUnwindSafe(|| check.check(doc))) {
        Ok(Ok(diagnostics)) => {
            debug!(check = name, diagnostics = diagnostics.len(), "check finished");
            diagnostics
        }
        Ok(Err(err)) => {
            warn!(check = name, error = %err, "check failed");
            vec![Diagnostic::new(format!("The {} check failed: {}", name, err)).with_cause(&err)]
        }
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            warn!(check = name, reason = %reason, "check panicked");
            vec![Diagnostic::new(format!("The {} check failed unexpectedly.", name))
                .with_cause(reason)]
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(feature = "validation")]
fn grammar_check(config: &ValidatorConfig) -> Option<Box<dyn Check>> {
    use crate::checks::XsdGrammar;

    if !config.grammar_check {
        return None;
    }
    let path = config.schema_path.as_ref()?;
    Some(Box::new(SchemaCheck::new(XsdGrammar::new(path.clone()))))
}

#[cfg(not(feature = "validation"))]
fn grammar_check(config: &ValidatorConfig) -> Option<Box<dyn Check>> {
    if config.grammar_check {
        debug!("grammar check requested but the validation feature is disabled");
    }
    None
}
