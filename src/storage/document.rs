//! In-memory XML document tree.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Each node records
//! its parent index so that it can be detached or replaced in O(children)
//! without back-pointers. Detached nodes remain in the arena but are no
//! longer reachable from the document node.
//!
//! Queries that feed a mutation (e.g. [`Document::elements_named`]) return an
//! owned snapshot of ids, so the tree can be rewritten while iterating the
//! matches.

use std::fmt;

/// Stable handle to a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An element: a qualified tag name, the namespace it resolved to, and
/// attributes in source order.
///
/// Namespace declarations are kept as ordinary `xmlns`/`xmlns:*` attributes
/// so that they are written back where they appeared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    namespace: Option<String>,
    attributes: Vec<(String, String)>,
}

impl Element {
    /// Creates an element in no namespace, with no attributes.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            attributes: Vec::new(),
        }
    }

    /// Builder-style namespace setter.
    #[must_use]
    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace;
        self
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Returns the qualified name as written (e.g. `tei:app`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the name without any namespace prefix.
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.name
            .rsplit_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    /// Returns the namespace URI the name resolved to, if any.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns the value of an attribute.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Sets an attribute, keeping its position if it already exists.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Removes an attribute, returning its previous value.
    pub fn remove_attribute(&mut self, key: &str) -> Option<String> {
        let position = self.attributes.iter().position(|(k, _)| k == key)?;
        Some(self.attributes.remove(position).1)
    }

    /// Iterates the attributes in source order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// The content of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The document node. Exactly one exists, at the top of the tree.
    Document,
    /// An element.
    Element(Element),
    /// Character data, already unescaped.
    Text(String),
    /// A comment.
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An XML document held as an arena of nodes.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates an empty document containing only the document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Returns the document node.
    #[must_use]
    pub const fn document_node(&self) -> NodeId {
        NodeId(0)
    }

    /// Returns the root element, if the document has one.
    #[must_use]
    pub fn root_element(&self) -> Option<NodeId> {
        self.children(self.document_node())
            .iter()
            .copied()
            .find(|&id| self.element(id).is_some())
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Creates a detached element node.
    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.push(NodeKind::Element(element))
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    /// Creates a detached comment node.
    pub fn create_comment(&mut self, comment: impl Into<String>) -> NodeId {
        self.push(NodeKind::Comment(comment.into()))
    }

    /// Returns the kind of a node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    /// Returns the element data if the node is an element.
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Returns mutable element data if the node is an element.
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Returns the local name of an element node.
    #[must_use]
    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(Element::local_name)
    }

    /// Returns an attribute of an element node.
    #[must_use]
    pub fn attribute(&self, id: NodeId, key: &str) -> Option<&str> {
        self.element(id)?.attribute(key)
    }

    /// Returns the parent of a node, or `None` if it is detached or is the
    /// document node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Returns the children of a node in document order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Appends a detached node as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `child` is still attached elsewhere.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        let index = self.nodes[parent.0].children.len();
        self.insert(parent, index, child);
    }

    /// Inserts a detached node as the `index`-th child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `child` is still attached elsewhere, or if `index` is out of
    /// bounds.
    pub fn insert(&mut self, parent: NodeId, index: usize, child: NodeId) {
        assert!(
            self.nodes[child.0].parent.is_none() && child != self.document_node(),
            "node {child} is already attached"
        );
        self.nodes[parent.0].children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Detaches a node (and its subtree) from its parent.
    ///
    /// Detaching an already detached node is a no-op.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&child| child != id);
        }
    }

    /// Puts `new` in the position of `old`, detaching `old`.
    ///
    /// Returns `false` (and does nothing) if `old` is detached.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> bool {
        if old == new {
            return false;
        }
        self.detach(new);

        let Some(parent) = self.nodes[old.0].parent else {
            return false;
        };
        let Some(index) = self.nodes[parent.0]
            .children
            .iter()
            .position(|&child| child == old)
        else {
            return false;
        };

        self.nodes[parent.0].children[index] = new;
        self.nodes[new.0].parent = Some(parent);
        self.nodes[old.0].parent = None;
        true
    }

    /// Returns every node below `id` in document order, excluding `id`.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Returns every attached element with the given local name, in document
    /// order.
    #[must_use]
    pub fn elements_named(&self, local_name: &str) -> Vec<NodeId> {
        self.elements_matching(|element| element.local_name() == local_name)
    }

    /// Returns every attached element satisfying `predicate`, in document
    /// order.
    pub fn elements_matching<F>(&self, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&Element) -> bool,
    {
        self.descendants(self.document_node())
            .into_iter()
            .filter(|&id| self.element(id).is_some_and(&predicate))
            .collect()
    }

    /// Returns the text that precedes the first non-text child of `id`, or
    /// `None` if there is none.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<String> {
        let text: String = self
            .children(id)
            .iter()
            .map_while(|&child| match self.kind(child) {
                NodeKind::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect();
        (!text.is_empty()).then_some(text)
    }

    /// Replaces the leading text of `id` (see [`Document::text`]).
    ///
    /// Passing `None` or an empty string clears it.
    pub fn set_text(&mut self, id: NodeId, text: Option<&str>) {
        let leading: Vec<NodeId> = self
            .children(id)
            .iter()
            .copied()
            .take_while(|&child| matches!(self.kind(child), NodeKind::Text(_)))
            .collect();
        for child in leading {
            self.detach(child);
        }

        if let Some(text) = text.filter(|text| !text.is_empty()) {
            let node = self.create_text(text);
            self.insert(id, 0, node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `<TEI><ab>in <app n="1"><rdg>a</rdg></app> end</ab></TEI>`
    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let tei = doc.create_element(Element::new("TEI"));
        doc.append(doc.document_node(), tei);
        let ab = doc.create_element(Element::new("ab"));
        doc.append(tei, ab);
        let before = doc.create_text("in ");
        doc.append(ab, before);
        let app = doc.create_element(Element::new("app").with_attribute("n", "1"));
        doc.append(ab, app);
        let rdg = doc.create_element(Element::new("rdg"));
        doc.append(app, rdg);
        let text = doc.create_text("a");
        doc.append(rdg, text);
        let after = doc.create_text(" end");
        doc.append(ab, after);
        (doc, ab, app, rdg)
    }

    #[test]
    fn local_name_strips_prefix() {
        assert_eq!(Element::new("tei:app").local_name(), "app");
        assert_eq!(Element::new("app").local_name(), "app");
    }

    #[test]
    fn namespace_defaults_to_none() {
        assert_eq!(Element::new("app").namespace(), None);
        let element = Element::new("x:app").with_namespace(Some("urn:x".to_string()));
        assert_eq!(element.namespace(), Some("urn:x"));
        assert_eq!(element.local_name(), "app");
    }

    #[test]
    fn attributes_keep_position() {
        let mut element = Element::new("app")
            .with_attribute("n", "1")
            .with_attribute("from", "2");
        element.set_attribute("n", "3");
        let keys: Vec<_> = element.attributes().collect();
        assert_eq!(keys, [("n", "3"), ("from", "2")]);
        assert_eq!(element.remove_attribute("from").as_deref(), Some("2"));
        assert_eq!(element.remove_attribute("from"), None);
    }

    #[test]
    fn queries_in_document_order() {
        let (doc, ab, app, rdg) = sample();
        assert_eq!(doc.elements_named("app"), [app]);
        assert_eq!(doc.elements_named("rdg"), [rdg]);
        assert_eq!(
            doc.elements_matching(|element| element.attribute("n").is_some()),
            [app]
        );
        assert_eq!(doc.local_name(doc.root_element().unwrap()), Some("TEI"));
        assert_eq!(doc.parent(app), Some(ab));
    }

    #[test]
    fn detach_keeps_siblings() {
        let (mut doc, ab, app, _) = sample();
        doc.detach(app);
        assert!(doc.elements_named("app").is_empty());
        assert!(doc.elements_named("rdg").is_empty());
        assert_eq!(doc.children(ab).len(), 2);
        assert_eq!(doc.parent(app), None);
    }

    #[test]
    fn replace_keeps_position() {
        let (mut doc, ab, app, _) = sample();
        let seg = doc.create_element(Element::new("seg"));
        assert!(doc.replace(app, seg));
        assert_eq!(doc.children(ab)[1], seg);
        assert_eq!(doc.parent(seg), Some(ab));
        assert!(!doc.replace(app, seg));
    }

    #[test]
    fn leading_text() {
        let (mut doc, ab, _, rdg) = sample();
        assert_eq!(doc.text(ab).as_deref(), Some("in "));
        assert_eq!(doc.text(rdg).as_deref(), Some("a"));

        doc.set_text(rdg, None);
        assert_eq!(doc.text(rdg), None);

        doc.set_text(rdg, Some("b"));
        assert_eq!(doc.text(rdg).as_deref(), Some("b"));
        assert_eq!(doc.children(rdg).len(), 1);
    }

    #[test]
    #[should_panic(expected = "already attached")]
    fn insert_attached_node_panics() {
        let (mut doc, ab, app, _) = sample();
        doc.append(ab, app);
    }
}
