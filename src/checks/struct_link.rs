//! Struct-link cross-reference check.
//!
//! Two directions are checked independently:
//!
//! - coverage: every logical division is the source of a link, or has a
//!   linked division somewhere below it; every page is the target of a link.
//! - existence: every link source is a logical division and every link
//!   target is a physical division.
//!
//! Each direction yields at most one diagnostic per struct map, listing all
//! offending `ID`s in document order.

use std::collections::HashSet;

use crate::checks::Check;
use crate::diagnostic::{CheckResult, Diagnostic};
use crate::document::{Document, Node, STRUCT_MAP_LOGICAL, STRUCT_MAP_PHYSICAL, XMLNS_METS};
use crate::error::Result;
use crate::xref::{division_ids, extract_links, find_struct_map, has_indirect_coverage, require_child};

/// Checks the `structLink` section against both struct maps.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructLinkCheck;

impl StructLinkCheck {
    /// Creates the check.
    pub fn new() -> Self {
        Self
    }
}

impl Check for StructLinkCheck {
    fn name(&self) -> &'static str {
        "struct-link"
    }

    fn check(&self, doc: &Document) -> Result<Vec<Diagnostic>> {
        let mut diagnostics = Vec::new();
        if let Err(diagnostic) = check_struct_link(doc.root(), &mut diagnostics) {
            diagnostics.push(diagnostic);
        }
        Ok(diagnostics)
    }
}

fn check_struct_link(mets: &Node, diagnostics: &mut Vec<Diagnostic>) -> CheckResult<()> {
    let struct_link = require_child(mets, "structLink")?;

    let logical_ids = unique(
        find_struct_map(mets, STRUCT_MAP_LOGICAL)
            .map(division_ids)
            .unwrap_or_default(),
    );
    let physical_ids = unique(
        find_struct_map(mets, STRUCT_MAP_PHYSICAL)
            .and_then(|sm| sm.child(XMLNS_METS, "div"))
            .map(division_ids)
            .unwrap_or_default(),
    );
    let links = extract_links(struct_link, diagnostics);

    let missing_logical: Vec<&str> = logical_ids
        .iter()
        .copied()
        .filter(|id| !links.is_source(id))
        .filter(|id| !has_indirect_coverage(mets, id, &links))
        .collect();
    report(struct_link, "Some logical elements are not linked", &missing_logical, diagnostics);

    let missing_physical: Vec<&str> = physical_ids
        .iter()
        .copied()
        .filter(|id| !links.is_target(id))
        .collect();
    report(struct_link, "Some physical elements are not linked", &missing_physical, diagnostics);

    let logical_set: HashSet<&str> = logical_ids.iter().copied().collect();
    let unknown_sources: Vec<&str> = links
        .sources()
        .into_iter()
        .filter(|id| !logical_set.contains(id))
        .collect();
    report(
        struct_link,
        "Some linked logical elements do not exist",
        &unknown_sources,
        diagnostics,
    );

    let physical_set: HashSet<&str> = physical_ids.iter().copied().collect();
    let unknown_targets: Vec<&str> = links
        .targets()
        .into_iter()
        .filter(|id| !physical_set.contains(id))
        .collect();
    report(
        struct_link,
        "Some linked physical elements do not exist",
        &unknown_targets,
        diagnostics,
    );
    Ok(())
}

/// Drops repeated IDs, keeping the first occurrence.
fn unique(ids: Vec<&str>) -> Vec<&str> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

fn report(struct_link: &Node, what: &str, ids: &[&str], diagnostics: &mut Vec<Diagnostic>) {
    if ids.is_empty() {
        return;
    }
    diagnostics.push(Diagnostic::at(
        struct_link,
        format!("{}: [{}]", what, ids.join(", ")),
    ));
}
