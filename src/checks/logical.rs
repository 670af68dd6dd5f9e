//! Logical structure check.
//!
//! Walks every division of the first logical struct map. A defect in one
//! division never stops the walk, so a single run reports all of them.

use std::collections::HashSet;

use crate::checks::Check;
use crate::config::LogicalRules;
use crate::diagnostic::{CheckResult, Diagnostic};
use crate::document::{Document, Node, BETYPE_IDREF, STRUCT_MAP_LOGICAL, XMLNS_METS};
use crate::error::Result;
use crate::xref::{
    find_struct_map, require_attribute, require_child, require_children,
    require_non_empty_attribute,
};

/// Checks the `structMap[@TYPE='LOGICAL']` of a METS document.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogicalStructureCheck {
    rules: LogicalRules,
}

impl LogicalStructureCheck {
    /// Creates the check with the default rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the check with the given rules.
    pub fn with_rules(rules: LogicalRules) -> Self {
        Self { rules }
    }
}

impl Check for LogicalStructureCheck {
    fn name(&self) -> &'static str {
        "logical-structure"
    }

    fn check(&self, doc: &Document) -> Result<Vec<Diagnostic>> {
        let mut diagnostics = Vec::new();
        if let Err(diagnostic) = self.check_logical(doc.root(), &mut diagnostics) {
            diagnostics.push(diagnostic);
        }
        Ok(diagnostics)
    }
}

impl LogicalStructureCheck {
    fn check_logical(&self, mets: &Node, diagnostics: &mut Vec<Diagnostic>) -> CheckResult<()> {
        let struct_map = find_struct_map(mets, STRUCT_MAP_LOGICAL).ok_or_else(|| {
            Diagnostic::at(mets, "Missing <mets:structMap[@TYPE='LOGICAL']> element.")
        })?;
        let top = require_child(struct_map, "div")?;

        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut stack = vec![(top, true)];
        while let Some((div, is_top)) = stack.pop() {
            stack.extend(
                div.children_named(XMLNS_METS, "div")
                    .collect::<Vec<_>>()
                    .into_iter()
                    .rev()
                    .map(|child| (child, false)),
            );

            let id = if is_top {
                div.attribute("ID")
            } else {
                collect(require_attribute(div, "ID"), diagnostics)
            };
            if let Some(id) = id {
                if self.rules.unique_ids && !seen.insert(id) && reported.insert(id) {
                    diagnostics.push(Diagnostic::at(
                        div,
                        format!(
                            "Duplicate @ID {}. ID's have to be unique in logical structmap.",
                            id
                        ),
                    ));
                }
            }
            self.check_division(div, is_top, diagnostics);
        }
        Ok(())
    }

    fn check_division(&self, div: &Node, is_top: bool, diagnostics: &mut Vec<Diagnostic>) {
        collect(require_attribute(div, "TYPE"), diagnostics);
        if is_top || self.rules.non_empty_labels {
            collect(require_non_empty_attribute(div, "LABEL", None), diagnostics);
        } else {
            collect(require_attribute(div, "LABEL"), diagnostics);
        }
        if self.rules.require_order && !is_top {
            collect(require_attribute(div, "ORDER"), diagnostics);
        }

        if let Some(fptr) = div.child(XMLNS_METS, "fptr") {
            if let Err(diagnostic) = check_areas(fptr, diagnostics) {
                diagnostics.push(diagnostic);
            }
        }
    }
}

/// Every `area` of a logical file pointer references a file by `ID`.
fn check_areas(fptr: &Node, diagnostics: &mut Vec<Diagnostic>) -> CheckResult<()> {
    let seq = require_child(fptr, "seq")?;
    for area in require_children(seq, "area")? {
        for name in ["FILEID", "BEGIN", "END"] {
            collect(require_attribute(area, name), diagnostics);
        }
        if area.attribute("BETYPE") != Some(BETYPE_IDREF) {
            diagnostics.push(Diagnostic::at(
                area,
                "@BETYPE attribute required. Should be @BETYPE='IDREF'",
            ));
        }
    }
    Ok(())
}

fn collect<T>(result: CheckResult<T>, diagnostics: &mut Vec<Diagnostic>) -> Option<T> {
    result.map_err(|diagnostic| diagnostics.push(diagnostic)).ok()
}
