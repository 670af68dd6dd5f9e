//! Owned element tree with source line positions.

use std::mem;

/// An attribute of an element, with its resolved namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Local name, without prefix
    pub name: String,
    /// Namespace URI, `None` for unprefixed attributes
    pub namespace: Option<String>,
    /// Unescaped value
    pub value: String,
}

impl Attribute {
    /// Creates an attribute without a namespace.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            value: value.into(),
        }
    }

    /// Creates a namespaced attribute.
    pub fn with_namespace(
        namespace: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
            value: value.into(),
        }
    }

    fn matches(&self, namespace: Option<&str>, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == namespace
    }
}

/// An element of a parsed document.
///
/// Nodes are assembled bottom-up with the `with_*` builders and never
/// change once attached to a [`Document`](super::Document).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: String,
    namespace: Option<String>,
    attributes: Vec<Attribute>,
    children: Vec<Node>,
    line: Option<u64>,
}

impl Node {
    /// Creates an element in the given namespace.
    pub fn new(namespace: &str, name: impl Into<String>) -> Self {
        Self::with_optional_namespace(Some(namespace.to_string()), name)
    }

    /// Creates an element whose namespace may be absent.
    pub fn with_optional_namespace(namespace: Option<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace,
            attributes: Vec::new(),
            children: Vec::new(),
            line: None,
        }
    }

    /// Adds an unprefixed attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    /// Adds a namespaced attribute.
    pub fn with_ns_attribute(
        mut self,
        namespace: &str,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.attributes
            .push(Attribute::with_namespace(namespace, name, value));
        self
    }

    /// Appends a child element.
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Sets the source line.
    pub fn with_line(mut self, line: u64) -> Self {
        self.line = Some(line);
        self
    }

    pub(crate) fn push_attribute(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    pub(crate) fn push_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Local name of the element.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace URI of the element.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns true if this element has the given namespace and local name.
    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == Some(namespace)
    }

    /// 1-based line on which the start tag of this element ends.
    pub fn line(&self) -> Option<u64> {
        self.line
    }

    /// All attributes in document order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Value of an unprefixed attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attribute_ns(None, name)
    }

    /// Value of an attribute in the given namespace (`None` for unprefixed).
    pub fn attribute_ns(&self, namespace: Option<&str>, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.matches(namespace, name))
            .map(|a| a.value.as_str())
    }

    /// All element children in document order.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// First child with the given namespace and local name.
    pub fn child(&self, namespace: &str, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.is(namespace, name))
    }

    /// Children with the given namespace and local name.
    pub fn children_named<'a, 'n>(
        &'a self,
        namespace: &'n str,
        name: &'n str,
    ) -> impl Iterator<Item = &'a Node> + 'n
    where
        'a: 'n,
    {
        self.children.iter().filter(move |c| c.is(namespace, name))
    }

    /// All elements below this one in document order, excluding itself.
    pub fn descendants(&self) -> Descendants<'_> {
        let mut stack = Vec::with_capacity(self.children.len());
        stack.extend(self.children.iter().rev());
        Descendants { stack }
    }

    /// Descendants with the given namespace and local name.
    pub fn descendants_named<'a, 'n>(
        &'a self,
        namespace: &'n str,
        name: &'n str,
    ) -> impl Iterator<Item = &'a Node> + 'n
    where
        'a: 'n,
    {
        self.descendants().filter(move |d| d.is(namespace, name))
    }
}

// Dropping the derived way recurses once per nesting level.
impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Pre-order iterator over the descendants of a [`Node`].
#[derive(Debug, Clone)]
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
