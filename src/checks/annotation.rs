//! Page-annotation cross-reference check.
//!
//! Not part of the default check list. Requires the annotation file group
//! (`ALTO` unless configured otherwise) and every file in it to be referenced
//! by an `area` of a logical file pointer.

use std::collections::HashSet;

use crate::checks::Check;
use crate::diagnostic::{CheckResult, Diagnostic};
use crate::document::{Document, Node, STRUCT_MAP_LOGICAL, USE_ALTO, XMLNS_METS};
use crate::error::Result;
use crate::xref::{find_struct_map, require_child, require_children, require_non_empty_attribute};

/// Checks that every annotation file is used by the logical structure.
#[derive(Debug, Clone)]
pub struct AnnotationCheck {
    file_use: String,
}

impl AnnotationCheck {
    /// Creates the check for the `ALTO` file group.
    pub fn new() -> Self {
        Self::for_file_group(USE_ALTO)
    }

    /// Creates the check for the file group with the given `USE`.
    pub fn for_file_group(file_use: impl Into<String>) -> Self {
        Self {
            file_use: file_use.into(),
        }
    }
}

impl Default for AnnotationCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for AnnotationCheck {
    fn name(&self) -> &'static str {
        "annotation"
    }

    fn check(&self, doc: &Document) -> Result<Vec<Diagnostic>> {
        let mut diagnostics = Vec::new();
        if let Err(diagnostic) = self.check_annotations(doc.root(), &mut diagnostics) {
            diagnostics.push(diagnostic);
        }
        Ok(diagnostics)
    }
}

impl AnnotationCheck {
    fn check_annotations(&self, mets: &Node, diagnostics: &mut Vec<Diagnostic>) -> CheckResult<()> {
        let file_sec = require_child(mets, "fileSec")?;
        let group = file_sec
            .children_named(XMLNS_METS, "fileGrp")
            .find(|grp| grp.attribute("USE") == Some(self.file_use.as_str()))
            .ok_or_else(|| {
                Diagnostic::at(
                    file_sec,
                    format!("Missing mets:fileGrp[@USE='{}'] element.", self.file_use),
                )
            })?;
        let files = require_children(group, "file")?;

        let referenced = find_struct_map(mets, STRUCT_MAP_LOGICAL)
            .map(referenced_file_ids)
            .unwrap_or_default();

        for file in files {
            let id = match require_non_empty_attribute(file, "ID", None) {
                Ok(id) => id,
                Err(diagnostic) => {
                    diagnostics.push(diagnostic);
                    continue;
                }
            };
            if !referenced.contains(id) {
                diagnostics.push(Diagnostic::at(
                    file,
                    format!(
                        "Unable to find the {} id '{}' in the logical struct map.",
                        self.file_use.to_lowercase(),
                        id
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// `FILEID`s of every `div/fptr/seq/area` in a logical struct map.
fn referenced_file_ids(struct_map: &Node) -> HashSet<&str> {
    struct_map
        .descendants_named(XMLNS_METS, "div")
        .flat_map(|div| div.children_named(XMLNS_METS, "fptr"))
        .flat_map(|fptr| fptr.children_named(XMLNS_METS, "seq"))
        .flat_map(|seq| seq.children_named(XMLNS_METS, "area"))
        .filter_map(|area| area.attribute("FILEID"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::parse_str;

    fn mets(alto_files: &str, areas: &str) -> Document {
        let xml = format!(
            r#"<mets:mets xmlns:mets="http://www.loc.gov/METS/" xmlns:xlink="http://www.w3.org/1999/xlink">
<mets:fileSec>
  <mets:fileGrp USE="ALTO">{}</mets:fileGrp>
</mets:fileSec>
<mets:structMap TYPE="LOGICAL">
  <mets:div ID="log_0" TYPE="monograph" LABEL="T">
    <mets:div ID="log_1" TYPE="chapter" LABEL="1">
      <mets:fptr><mets:seq>{}</mets:seq></mets:fptr>
    </mets:div>
  </mets:div>
</mets:structMap>
</mets:mets>"#,
            alto_files, areas
        );
        parse_str(&xml).unwrap()
    }

    fn messages(check: &AnnotationCheck, doc: &Document) -> Vec<String> {
        check
            .check(doc)
            .unwrap()
            .into_iter()
            .map(|d| d.message().to_string())
            .collect()
    }

    #[test]
    fn test_all_files_referenced() {
        let doc = mets(
            r#"<mets:file ID="alto_1"/><mets:file ID="alto_2"/>"#,
            r#"<mets:area FILEID="alto_1" BEGIN="a" END="b" BETYPE="IDREF"/>
               <mets:area FILEID="alto_2" BEGIN="c" END="d" BETYPE="IDREF"/>"#,
        );
        assert!(messages(&AnnotationCheck::new(), &doc).is_empty());
    }

    #[test]
    fn test_every_unreferenced_file_reported() {
        let doc = mets(
            r#"<mets:file ID="alto_1"/><mets:file ID="alto_2"/><mets:file ID="alto_3"/>"#,
            r#"<mets:area FILEID="alto_2" BEGIN="a" END="b" BETYPE="IDREF"/>"#,
        );
        assert_eq!(
            messages(&AnnotationCheck::new(), &doc),
            vec![
                "Unable to find the alto id 'alto_1' in the logical struct map.",
                "Unable to find the alto id 'alto_3' in the logical struct map.",
            ]
        );
    }

    #[test]
    fn test_missing_group() {
        let doc = mets(r#"<mets:file ID="alto_1"/>"#, "");
        let check = AnnotationCheck::for_file_group("TEI");
        assert_eq!(
            messages(&check, &doc),
            vec!["Missing mets:fileGrp[@USE='TEI'] element."]
        );
    }

    #[test]
    fn test_empty_group() {
        let doc = mets("", "");
        assert_eq!(
            messages(&AnnotationCheck::new(), &doc),
            vec!["fileGrp should contain at least one 'file' element."]
        );
    }
}
