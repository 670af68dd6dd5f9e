//! Cross-reference utilities shared by the checks.
//!
//! Each lookup either returns what it was asked for or a [`Diagnostic`]
//! attributed to the element it was looking at, so checks can use `?` for
//! facts they cannot continue without and collect everything else.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use crate::diagnostic::{CheckResult, Diagnostic};
use crate::document::{Node, STRUCT_MAP_LOGICAL, XMLNS_METS, XMLNS_XLINK};

/// Returns the value of an unprefixed attribute, which may be empty.
pub fn require_attribute<'a>(node: &'a Node, name: &str) -> CheckResult<&'a str> {
    node.attribute(name)
        .ok_or_else(|| Diagnostic::at(node, format!("Missing @{} attribute.", name)))
}

/// Returns the value of an attribute that must be present and non-empty.
///
/// `namespace` is `None` for unprefixed attributes.
pub fn require_non_empty_attribute<'a>(
    node: &'a Node,
    name: &str,
    namespace: Option<&str>,
) -> CheckResult<&'a str> {
    match node.attribute_ns(namespace, name) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(Diagnostic::at(
            node,
            format!("Missing or empty @{} attribute.", name),
        )),
    }
}

/// Returns the first METS child element with the given name.
pub fn require_child<'a>(node: &'a Node, name: &str) -> CheckResult<&'a Node> {
    node.child(XMLNS_METS, name)
        .ok_or_else(|| Diagnostic::at(node, format!("Missing '{}' element.", name)))
}

/// Returns all METS child elements with the given name; there must be one.
pub fn require_children<'a>(node: &'a Node, name: &str) -> CheckResult<Vec<&'a Node>> {
    let children: Vec<_> = node.children_named(XMLNS_METS, name).collect();
    if children.is_empty() {
        return Err(Diagnostic::at(
            node,
            format!(
                "{} should contain at least one '{}' element.",
                node.name(),
                name
            ),
        ));
    }
    Ok(children)
}

/// Finds the first `structMap` child of `root` whose `TYPE` is `struct_type`.
pub fn find_struct_map<'a>(root: &'a Node, struct_type: &str) -> Option<&'a Node> {
    root.children_named(XMLNS_METS, "structMap")
        .find(|sm| sm.attribute("TYPE") == Some(struct_type))
}

/// Non-empty `ID`s of every division below `node`, in document order.
pub fn division_ids(node: &Node) -> Vec<&str> {
    node.descendants_named(XMLNS_METS, "div")
        .filter_map(|div| div.attribute("ID"))
        .filter(|id| !id.is_empty())
        .collect()
}

/// Finds the first division below `scope` with the given `ID`.
pub fn find_division<'a>(scope: &'a Node, id: &str) -> Option<&'a Node> {
    scope
        .descendants_named(XMLNS_METS, "div")
        .find(|div| div.attribute("ID") == Some(id))
}

/// A directed link from a logical division to a physical division.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Logical division `ID`
    pub from: String,
    /// Physical division `ID`
    pub to: String,
}

/// The `smLink` records of a `structLink` section.
///
/// Keeps the distinct links in document order together with an index from
/// each source to its targets. Repeating a link has no effect.
#[derive(Debug, Clone, Default)]
pub struct LinkTable {
    links: Vec<Link>,
    by_source: BTreeMap<String, BTreeSet<String>>,
    targets: BTreeSet<String>,
}

impl LinkTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a link. Returns false if it was already present.
    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>) -> bool {
        let from = from.into();
        let to = to.into();
        let targets = self.by_source.entry(from.clone()).or_default();
        if !targets.insert(to.clone()) {
            return false;
        }
        self.targets.insert(to.clone());
        self.links.push(Link { from, to });
        true
    }

    /// Returns true if some link starts at `id`.
    pub fn is_source(&self, id: &str) -> bool {
        self.by_source.contains_key(id)
    }

    /// Returns true if some link ends at `id`.
    pub fn is_target(&self, id: &str) -> bool {
        self.targets.contains(id)
    }

    /// Targets linked from `from`, in sorted order.
    pub fn targets_of<'a>(&'a self, from: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.by_source
            .get(from)
            .into_iter()
            .flat_map(|targets| targets.iter().map(String::as_str))
    }

    /// Distinct sources in order of first appearance.
    pub fn sources(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.links
            .iter()
            .map(|link| link.from.as_str())
            .filter(|from| seen.insert(*from))
            .collect()
    }

    /// Distinct targets in order of first appearance.
    pub fn targets(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.links
            .iter()
            .map(|link| link.to.as_str())
            .filter(|to| seen.insert(*to))
            .collect()
    }

    /// All distinct links in document order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Number of distinct links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns true if there are no links.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Reads the `smLink` records of a `structLink` element.
///
/// A malformed record adds a diagnostic to `diagnostics` and is skipped; the
/// remaining records are still read.
pub fn extract_links(struct_link: &Node, diagnostics: &mut Vec<Diagnostic>) -> LinkTable {
    let mut table = LinkTable::new();
    let sm_links = match require_children(struct_link, "smLink") {
        Ok(sm_links) => sm_links,
        Err(diagnostic) => {
            diagnostics.push(diagnostic);
            return table;
        }
    };

    for sm_link in sm_links {
        let from = require_non_empty_attribute(sm_link, "from", Some(XMLNS_XLINK));
        let to = require_non_empty_attribute(sm_link, "to", Some(XMLNS_XLINK));
        match (from, to) {
            (Ok(from), Ok(to)) => {
                table.insert(from, to);
            }
            (from, to) => diagnostics.extend(from.err().into_iter().chain(to.err())),
        }
    }
    table
}

/// Returns true if some division below the logical division `division_id`
/// is the source of a link.
///
/// The division is looked up in the first logical struct map of `root`.
/// Children are examined before grandchildren, so a linked direct child is
/// found without descending further.
pub fn has_indirect_coverage(root: &Node, division_id: &str, links: &LinkTable) -> bool {
    find_struct_map(root, STRUCT_MAP_LOGICAL)
        .and_then(|struct_map| find_division(struct_map, division_id))
        .is_some_and(|division| has_linked_descendant(division, links))
}

/// Breadth-first search for a linked division below `division`.
pub(crate) fn has_linked_descendant(division: &Node, links: &LinkTable) -> bool {
    let mut queue: VecDeque<&Node> = division.children_named(XMLNS_METS, "div").collect();
    while let Some(div) = queue.pop_front() {
        if div.attribute("ID").is_some_and(|id| links.is_source(id)) {
            return true;
        }
        queue.extend(div.children_named(XMLNS_METS, "div"));
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn div(id: &str) -> Node {
        Node::new(XMLNS_METS, "div").with_attribute("ID", id)
    }

    fn sm_link(from: &str, to: &str) -> Node {
        Node::new(XMLNS_METS, "smLink")
            .with_ns_attribute(XMLNS_XLINK, "from", from)
            .with_ns_attribute(XMLNS_XLINK, "to", to)
    }

    fn logical(top: Node) -> Node {
        Node::new(XMLNS_METS, "mets")
            .with_child(Node::new(XMLNS_METS, "structMap").with_attribute("TYPE", "PHYSICAL"))
            .with_child(
                Node::new(XMLNS_METS, "structMap")
                    .with_attribute("TYPE", "LOGICAL")
                    .with_child(top),
            )
    }

    #[test]
    fn test_require_attribute() {
        let node = Node::new(XMLNS_METS, "div")
            .with_attribute("ID", "")
            .with_line(3);

        assert_eq!(require_attribute(&node, "ID"), Ok(""));
        let err = require_attribute(&node, "TYPE").unwrap_err();
        assert_eq!(err.message(), "Missing @TYPE attribute.");
        assert_eq!(err.line_number(), Some(3));
    }

    #[test]
    fn test_require_non_empty_attribute() {
        let node = Node::new(XMLNS_METS, "div")
            .with_attribute("LABEL", "")
            .with_attribute("TYPE", "chapter");

        assert_eq!(require_non_empty_attribute(&node, "TYPE", None), Ok("chapter"));
        let err = require_non_empty_attribute(&node, "LABEL", None).unwrap_err();
        assert_eq!(err.message(), "Missing or empty @LABEL attribute.");
        assert!(require_non_empty_attribute(&node, "TYPE", Some(XMLNS_XLINK)).is_err());
    }

    #[test]
    fn test_require_children() {
        let seq = Node::new(XMLNS_METS, "seq").with_line(9);
        let err = require_children(&seq, "area").unwrap_err();
        assert_eq!(err.message(), "seq should contain at least one 'area' element.");
        assert_eq!(err.line_number(), Some(9));

        let seq = seq
            .with_child(Node::new(XMLNS_METS, "area"))
            .with_child(Node::new(XMLNS_METS, "area"));
        assert_eq!(require_children(&seq, "area").unwrap().len(), 2);
        assert_eq!(
            require_child(&seq, "fptr").unwrap_err().message(),
            "Missing 'fptr' element."
        );
    }

    #[test]
    fn test_find_struct_map_first_match() {
        let root = Node::new(XMLNS_METS, "mets")
            .with_child(
                Node::new(XMLNS_METS, "structMap")
                    .with_attribute("TYPE", "LOGICAL")
                    .with_attribute("ID", "first"),
            )
            .with_child(
                Node::new(XMLNS_METS, "structMap")
                    .with_attribute("TYPE", "LOGICAL")
                    .with_attribute("ID", "second"),
            );

        let found = find_struct_map(&root, "LOGICAL").unwrap();
        assert_eq!(found.attribute("ID"), Some("first"));
        assert!(find_struct_map(&root, "PHYSICAL").is_none());
    }

    #[test]
    fn test_link_table_idempotent() {
        let mut table = LinkTable::new();
        assert!(table.insert("log_1", "phys_1"));
        assert!(table.insert("log_1", "phys_2"));
        assert!(!table.insert("log_1", "phys_1"));
        assert!(table.insert("log_2", "phys_1"));

        assert_eq!(table.len(), 3);
        assert_eq!(table.sources(), vec!["log_1", "log_2"]);
        assert_eq!(table.targets(), vec!["phys_1", "phys_2"]);
        assert_eq!(
            table.targets_of("log_1").collect::<Vec<_>>(),
            vec!["phys_1", "phys_2"]
        );
        assert!(table.is_target("phys_2"));
        assert!(!table.is_source("phys_1"));
    }

    #[test]
    fn test_extract_links_skips_malformed_records() {
        let struct_link = Node::new(XMLNS_METS, "structLink")
            .with_child(sm_link("log_1", "phys_1"))
            .with_child(
                Node::new(XMLNS_METS, "smLink")
                    .with_ns_attribute(XMLNS_XLINK, "from", "")
                    .with_line(12),
            )
            .with_child(sm_link("log_2", "phys_2"));

        let mut diagnostics = Vec::new();
        let table = extract_links(&struct_link, &mut diagnostics);

        assert_eq!(table.len(), 2);
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.line_number() == Some(12)));
        assert_eq!(diagnostics[0].message(), "Missing or empty @from attribute.");
        assert_eq!(diagnostics[1].message(), "Missing or empty @to attribute.");
    }

    #[test]
    fn test_extract_links_requires_records() {
        let mut diagnostics = Vec::new();
        let table = extract_links(&Node::new(XMLNS_METS, "structLink"), &mut diagnostics);
        assert!(table.is_empty());
        assert_eq!(
            diagnostics[0].message(),
            "structLink should contain at least one 'smLink' element."
        );
    }

    #[test]
    fn test_indirect_coverage_through_grandchild() {
        let root = logical(
            div("book")
                .with_child(div("part").with_child(div("chapter")))
                .with_child(div("preface")),
        );
        let mut links = LinkTable::new();
        links.insert("chapter", "phys_1");

        assert!(has_indirect_coverage(&root, "book", &links));
        assert!(has_indirect_coverage(&root, "part", &links));
        assert!(!has_indirect_coverage(&root, "preface", &links));
        assert!(!has_indirect_coverage(&root, "chapter", &links));
        assert!(!has_indirect_coverage(&root, "unknown", &links));
    }

    #[test]
    fn test_division_ids_skip_empty() {
        let top = div("a")
            .with_child(div(""))
            .with_child(Node::new(XMLNS_METS, "div"))
            .with_child(div("b"));
        let scope = Node::new(XMLNS_METS, "structMap").with_child(top);
        assert_eq!(division_ids(&scope), vec!["a", "b"]);
    }
}
