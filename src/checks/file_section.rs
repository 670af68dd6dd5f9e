//! File inventory check.
//!
//! The `MASTER` file group must list at least one page image; an `ALTO`
//! group is optional but, when present, must list XML files stored under
//! `alto/`. Every file location must be a relative URI.

use iri_string::types::IriReferenceStr;

use crate::checks::Check;
use crate::diagnostic::{CheckResult, Diagnostic};
use crate::document::{Document, Node, ALTO_DIRECTORY, USE_ALTO, USE_MASTER, XMLNS_METS, XMLNS_XLINK};
use crate::error::Result;
use crate::xref::require_non_empty_attribute;

/// Media types a file group may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MediaType {
    Image,
    Xml,
}

impl MediaType {
    fn accepts(self, mime_type: &str) -> bool {
        match self {
            MediaType::Image => mime_type.starts_with("image/"),
            MediaType::Xml => mime_type.ends_with("/xml") || mime_type.ends_with("+xml"),
        }
    }

    fn expectation(self) -> &'static str {
        match self {
            MediaType::Image => "start with 'image/'",
            MediaType::Xml => "be an XML media type",
        }
    }
}

/// What the files of one group must look like.
#[derive(Debug, Clone, Copy)]
struct GroupRules {
    file_use: &'static str,
    media_type: MediaType,
    directory: Option<&'static str>,
}

const MASTER_RULES: GroupRules = GroupRules {
    file_use: USE_MASTER,
    media_type: MediaType::Image,
    directory: None,
};

const ALTO_RULES: GroupRules = GroupRules {
    file_use: USE_ALTO,
    media_type: MediaType::Xml,
    directory: Some(ALTO_DIRECTORY),
};

/// Checks the `fileSec` of a METS document.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSectionCheck;

impl FileSectionCheck {
    /// Creates the check.
    pub fn new() -> Self {
        Self
    }
}

impl Check for FileSectionCheck {
    fn name(&self) -> &'static str {
        "file-section"
    }

    fn check(&self, doc: &Document) -> Result<Vec<Diagnostic>> {
        let mut diagnostics = Vec::new();
        if let Err(diagnostic) = check_file_section(doc.root(), &mut diagnostics) {
            diagnostics.push(diagnostic);
        }
        Ok(diagnostics)
    }
}

fn check_file_section(mets: &Node, diagnostics: &mut Vec<Diagnostic>) -> CheckResult<()> {
    let file_sec = mets
        .child(XMLNS_METS, "fileSec")
        .ok_or_else(|| Diagnostic::at(mets, "No mets:fileSec element."))?;

    let master = file_group(file_sec, USE_MASTER)
        .ok_or_else(|| Diagnostic::at(file_sec, "No fileGrp with @USE='MASTER'."))?;
    check_group(master, MASTER_RULES, diagnostics);

    if let Some(alto) = file_group(file_sec, USE_ALTO) {
        check_group(alto, ALTO_RULES, diagnostics);
    }
    Ok(())
}

fn file_group<'a>(file_sec: &'a Node, file_use: &str) -> Option<&'a Node> {
    file_sec
        .children_named(XMLNS_METS, "fileGrp")
        .find(|grp| grp.attribute("USE") == Some(file_use))
}

fn check_group(group: &Node, rules: GroupRules, diagnostics: &mut Vec<Diagnostic>) {
    let mut files = group.children_named(XMLNS_METS, "file").peekable();
    if files.peek().is_none() {
        diagnostics.push(Diagnostic::at(
            group,
            format!(
                "FileGrp[@USE='{}'] does not contain any 'mets:file' elements.",
                rules.file_use
            ),
        ));
        return;
    }

    for file in files {
        if file.attribute("ID").is_none() {
            diagnostics.push(Diagnostic::at(file, "mets:file has no @ID."));
        }
        if let Err(diagnostic) = check_mime_type(file, rules.media_type) {
            diagnostics.push(diagnostic);
        }
        match check_location(file) {
            Ok(href) => {
                if let Some(directory) = rules.directory {
                    if !href.starts_with(directory) {
                        diagnostics.push(Diagnostic::at(
                            file,
                            format!(
                                "{} file is not placed in '{}' directory.",
                                rules.file_use.to_lowercase(),
                                directory
                            ),
                        ));
                    }
                }
            }
            Err(diagnostic) => diagnostics.push(diagnostic),
        }
    }
}

fn check_mime_type(file: &Node, media_type: MediaType) -> CheckResult<()> {
    let mime_type = file
        .attribute("MIMETYPE")
        .ok_or_else(|| Diagnostic::at(file, "mets:file has no @MIMETYPE."))?;
    if !media_type.accepts(mime_type) {
        return Err(Diagnostic::at(
            file,
            format!(
                "mets:file has an invalid mimetype. Should {} but is '{}'",
                media_type.expectation(),
                mime_type
            ),
        ));
    }
    Ok(())
}

/// Returns the `xlink:href` of the file's `FLocat` once it is known to be a
/// valid relative URI.
fn check_location(file: &Node) -> CheckResult<&str> {
    let flocat = file
        .child(XMLNS_METS, "FLocat")
        .ok_or_else(|| Diagnostic::at(file, "mets:file has no mets:FLocat element."))?;
    let href = require_non_empty_attribute(flocat, "href", Some(XMLNS_XLINK))?;

    // Non-ASCII letters are allowed as in an IRI; anything outside RFC 3987 is not.
    match IriReferenceStr::new(href) {
        Ok(reference) if reference.to_iri().is_ok() => Err(Diagnostic::at(
            flocat,
            "mets:FLocat should be a relative uri.",
        )),
        Ok(_) => Ok(href),
        Err(_) => Err(Diagnostic::at(flocat, "invalid @xlink:href uri.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::parse_str;

    fn mets(file_sec: &str) -> Document {
        let xml = format!(
            r#"<mets:mets xmlns:mets="http://www.loc.gov/METS/" xmlns:xlink="http://www.w3.org/1999/xlink">
{}
</mets:mets>"#,
            file_sec
        );
        parse_str(&xml).unwrap()
    }

    fn messages(doc: &Document) -> Vec<String> {
        FileSectionCheck::new()
            .check(doc)
            .unwrap()
            .into_iter()
            .map(|d| d.message().to_string())
            .collect()
    }

    #[test]
    fn test_valid_master_and_alto() {
        let doc = mets(
            r#"<mets:fileSec>
  <mets:fileGrp USE="MASTER">
    <mets:file ID="m1" MIMETYPE="image/tiff"><mets:FLocat xlink:href="0001.tif"/></mets:file>
    <mets:file ID="m2" MIMETYPE="image/jpeg"><mets:FLocat xlink:href="images/0002%20a.jpg"/></mets:file>
  </mets:fileGrp>
  <mets:fileGrp USE="ALTO">
    <mets:file ID="a1" MIMETYPE="text/xml"><mets:FLocat xlink:href="alto/0001.xml"/></mets:file>
    <mets:file ID="a2" MIMETYPE="application/alto+xml"><mets:FLocat xlink:href="alto/0002.xml"/></mets:file>
  </mets:fileGrp>
</mets:fileSec>"#,
        );
        assert!(messages(&doc).is_empty());
    }

    #[test]
    fn test_missing_file_sec() {
        let doc = mets("");
        assert_eq!(messages(&doc), vec!["No mets:fileSec element."]);
    }

    #[test]
    fn test_missing_master_group() {
        let doc = mets(r#"<mets:fileSec><mets:fileGrp USE="ALTO"/></mets:fileSec>"#);
        assert_eq!(messages(&doc), vec!["No fileGrp with @USE='MASTER'."]);
    }

    #[test]
    fn test_empty_master_group() {
        let doc = mets(r#"<mets:fileSec><mets:fileGrp USE="MASTER"/></mets:fileSec>"#);
        assert_eq!(
            messages(&doc),
            vec!["FileGrp[@USE='MASTER'] does not contain any 'mets:file' elements."]
        );
    }

    #[test]
    fn test_absolute_location_always_reported() {
        let doc = mets(
            r#"<mets:fileSec>
  <mets:fileGrp USE="MASTER">
    <mets:file ID="m1" MIMETYPE="image/tiff">
      <mets:FLocat xlink:href="http://example.org/0001.tif"/>
    </mets:file>
    <mets:file ID="m2" MIMETYPE="text/plain">
      <mets:FLocat xlink:href="file:///data/0002.tif"/>
    </mets:file>
  </mets:fileGrp>
</mets:fileSec>"#,
        );
        let diagnostics = FileSectionCheck::new().check(&doc).unwrap();
        let messages: Vec<_> = diagnostics.iter().map(|d| d.message()).collect();

        assert_eq!(
            messages,
            vec![
                "mets:FLocat should be a relative uri.",
                "mets:file has an invalid mimetype. Should start with 'image/' but is 'text/plain'",
                "mets:FLocat should be a relative uri.",
            ]
        );
        assert_eq!(diagnostics[0].line_number(), Some(5));
        assert_eq!(diagnostics[1].line_number(), Some(7));
    }

    #[test]
    fn test_per_file_defects() {
        let doc = mets(
            r#"<mets:fileSec>
  <mets:fileGrp USE="MASTER">
    <mets:file><mets:FLocat xlink:href="a b.tif"/></mets:file>
    <mets:file ID="m2" MIMETYPE="image/png"/>
    <mets:file ID="m3" MIMETYPE="image/png"><mets:FLocat/></mets:file>
    <mets:file ID="m4" MIMETYPE="image/png"><mets:FLocat xlink:href="bad%zz.png"/></mets:file>
  </mets:fileGrp>
</mets:fileSec>"#,
        );
        assert_eq!(
            messages(&doc),
            vec![
                "mets:file has no @ID.",
                "mets:file has no @MIMETYPE.",
                "invalid @xlink:href uri.",
                "mets:file has no mets:FLocat element.",
                "Missing or empty @href attribute.",
                "invalid @xlink:href uri.",
            ]
        );
    }

    #[test]
    fn test_alto_group_rules() {
        let doc = mets(
            r#"<mets:fileSec>
  <mets:fileGrp USE="MASTER">
    <mets:file ID="m1" MIMETYPE="image/tiff"><mets:FLocat xlink:href="0001.tif"/></mets:file>
  </mets:fileGrp>
  <mets:fileGrp USE="ALTO">
    <mets:file ID="a1" MIMETYPE="image/tiff"><mets:FLocat xlink:href="alto/0001.xml"/></mets:file>
    <mets:file ID="a2" MIMETYPE="text/xml"><mets:FLocat xlink:href="ocr/0002.xml"/></mets:file>
  </mets:fileGrp>
</mets:fileSec>"#,
        );
        assert_eq!(
            messages(&doc),
            vec![
                "mets:file has an invalid mimetype. Should be an XML media type but is 'image/tiff'",
                "alto file is not placed in 'alto/' directory.",
            ]
        );
    }

    #[test]
    fn test_location_must_be_a_valid_reference() {
        let hrefs = [
            "bilder/Übersicht.tif",
            "images/Seite%201.tif#page=1",
            "1abc:foo",
            "a#b#c",
            "x[1].tif",
            "back\\slash.tif",
            "bad%2",
        ];
        let files: String = hrefs
            .iter()
            .enumerate()
            .map(|(i, href)| {
                format!(
                    r#"<mets:file ID="m{}" MIMETYPE="image/tiff"><mets:FLocat xlink:href="{}"/></mets:file>"#,
                    i, href
                )
            })
            .collect();
        let doc = mets(&format!(
            r#"<mets:fileSec><mets:fileGrp USE="MASTER">{}</mets:fileGrp></mets:fileSec>"#,
            files
        ));
        assert_eq!(messages(&doc), vec!["invalid @xlink:href uri."; 5]);
    }
}
