//! Physical structure check.
//!
//! The physical struct map holds a single `physSequence` division whose
//! children are the pages. Each page needs an `ID`, an `ORDER` and at least
//! one file pointer with a `FILEID`.

use crate::checks::Check;
use crate::diagnostic::{CheckResult, Diagnostic};
use crate::document::{Document, Node, DIV_PAGE, DIV_PHYS_SEQUENCE, STRUCT_MAP_PHYSICAL, XMLNS_METS};
use crate::error::Result;
use crate::xref::find_struct_map;

/// Checks the `structMap[@TYPE='PHYSICAL']` of a METS document.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhysicalStructureCheck;

impl PhysicalStructureCheck {
    /// Creates the check.
    pub fn new() -> Self {
        Self
    }
}

impl Check for PhysicalStructureCheck {
    fn name(&self) -> &'static str {
        "physical-structure"
    }

    fn check(&self, doc: &Document) -> Result<Vec<Diagnostic>> {
        let mut diagnostics = Vec::new();
        if let Err(diagnostic) = check_physical(doc.root(), &mut diagnostics) {
            diagnostics.push(diagnostic);
        }
        Ok(diagnostics)
    }
}

fn check_physical(mets: &Node, diagnostics: &mut Vec<Diagnostic>) -> CheckResult<()> {
    let struct_map = find_struct_map(mets, STRUCT_MAP_PHYSICAL).ok_or_else(|| {
        Diagnostic::at(mets, "Missing mets:structMap TYPE='PHYSICAL' element.")
    })?;

    for extra in mets
        .children_named(XMLNS_METS, "structMap")
        .filter(|sm| sm.attribute("TYPE") == Some(STRUCT_MAP_PHYSICAL))
        .skip(1)
    {
        diagnostics.push(Diagnostic::at(
            extra,
            "Only one mets:structMap TYPE='PHYSICAL' element is allowed.",
        ));
    }

    let sequence = struct_map.child(XMLNS_METS, "div").ok_or_else(|| {
        Diagnostic::at(
            struct_map,
            "Physical struct map should contain surrounding mets:div TYPE='physSequence' element.",
        )
    })?;
    if sequence.attribute("TYPE") != Some(DIV_PHYS_SEQUENCE) {
        diagnostics.push(Diagnostic::at(
            sequence,
            "Missing or invalid @TYPE attribute. Should be @TYPE='physSequence'.",
        ));
    }

    let mut pages = sequence.children_named(XMLNS_METS, "div").peekable();
    if pages.peek().is_none() {
        return Err(Diagnostic::at(
            sequence,
            "mets:div TYPE='physSequence' should have at least one page.",
        ));
    }
    for page in pages {
        check_page(page, diagnostics);
    }
    Ok(())
}

fn check_page(page: &Node, diagnostics: &mut Vec<Diagnostic>) {
    if page.attribute("TYPE") != Some(DIV_PAGE) {
        diagnostics.push(Diagnostic::at(
            page,
            "Invalid @TYPE attribute. Should be @TYPE='page'.",
        ));
    }
    if page.attribute("ID").is_none() {
        diagnostics.push(Diagnostic::at(page, "div requires @ID attribute."));
    }
    if page.attribute("ORDER").is_none() {
        diagnostics.push(Diagnostic::at(page, "div requires @ORDER attribute."));
    }

    let mut fptrs = page.children_named(XMLNS_METS, "fptr").peekable();
    if fptrs.peek().is_none() {
        diagnostics.push(Diagnostic::at(
            page,
            "div should contain at least one mets:fptr @FILEID element.",
        ));
    }
    for fptr in fptrs {
        if fptr.attribute("FILEID").is_none() {
            diagnostics.push(Diagnostic::at(fptr, "fptr requires @FILEID attribute."));
        }
    }
}
