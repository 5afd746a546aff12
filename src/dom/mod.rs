//! Minimal host document.
//!
//! An arena-backed tree of element, text, comment and fragment nodes with just
//! enough of the DOM surface for component instantiation: node creation,
//! child-list and attribute operations, id lookup, and mutation records for
//! every change (see [`mutation`]).
//!
//! Nodes are never freed; a node that is detached simply has no parent.

mod mutation;
mod parser;
mod serialize;

pub use indextree::NodeId;
pub use mutation::{MutationKind, MutationObserverInit, MutationRecord, ObserverId};

use indextree::Arena;
use smallvec::SmallVec;
use thiserror::Error;

use mutation::ObserverTable;

pub type Attributes = SmallVec<[(String, String); 4]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Fragment,
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Lowercase local name.
    pub tag: String,
    pub attrs: Attributes,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: SmallVec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("node {0:?} does not belong to this document")]
    UnknownNode(NodeId),

    #[error("cannot insert a node into itself or one of its descendants")]
    HierarchyRequest,

    #[error("node is not a child of the given parent")]
    NotFound,

    #[error("node {0:?} cannot have children")]
    NotAParent(NodeId),

    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),
}

/// The host document: a single tree rooted at a document node, plus any
/// number of detached subtrees living in the same arena.
#[derive(Debug)]
pub struct Document {
    arena: Arena<NodeKind>,
    document: NodeId,
    html: NodeId,
    head: NodeId,
    body: NodeId,
    observers: ObserverTable,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create `<html><head></head><body></body></html>`.
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let document = arena.new_node(NodeKind::Document);
        let html = arena.new_node(NodeKind::Element(ElementData::new("html")));
        let head = arena.new_node(NodeKind::Element(ElementData::new("head")));
        let body = arena.new_node(NodeKind::Element(ElementData::new("body")));
        document.append(html, &mut arena);
        html.append(head, &mut arena);
        html.append(body, &mut arena);

        Self {
            arena,
            document,
            html,
            head,
            body,
            observers: ObserverTable::default(),
        }
    }

    pub fn document_node(&self) -> NodeId {
        self.document
    }

    pub fn document_element(&self) -> NodeId {
        self.html
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    // -----------------------------------------------------------------------
    // Node creation
    // -----------------------------------------------------------------------

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.arena.new_node(NodeKind::Element(ElementData::new(tag)))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.arena.new_node(NodeKind::Text(text.to_string()))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.arena.new_node(NodeKind::Comment(text.to_string()))
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.arena.new_node(NodeKind::Fragment)
    }

    pub(crate) fn new_node(&mut self, kind: NodeKind) -> NodeId {
        self.arena.new_node(kind)
    }

    // -----------------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------------

    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.arena
            .get(node)
            .filter(|n| !n.is_removed())
            .map(|n| n.get())
    }

    pub fn element(&self, node: NodeId) -> Option<&ElementData> {
        match self.kind(node)? {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        self.element(node).is_some()
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|data| data.tag.as_str())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node)?.parent()
    }

    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node)?.first_child()
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node)?.next_sibling()
    }

    pub fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.children(&self.arena)
    }

    /// Nodes allocated in the arena, attached or not.
    pub fn node_count(&self) -> usize {
        self.arena.count()
    }

    /// Inclusive descendants in tree order.
    pub fn descendants(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.descendants(&self.arena)
    }

    /// Whether `other` is `node` or one of its descendants.
    pub fn contains(&self, node: NodeId, other: NodeId) -> bool {
        other.ancestors(&self.arena).any(|a| a == node)
    }

    /// Whether the node is part of the document tree.
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.contains(self.document, node)
    }

    /// First connected element with the given id, in tree order.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        self.descendants(self.document)
            .find(|&n| self.element(n).and_then(|e| e.attribute("id")) == Some(id))
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, node: NodeId) -> String {
        self.descendants(node)
            .filter_map(|n| match self.kind(n) {
                Some(NodeKind::Text(text)) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Attributes
    // -----------------------------------------------------------------------

    pub fn get_attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.attribute(&name.to_ascii_lowercase())
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.get_attribute(node, name).is_some()
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let name = name.to_ascii_lowercase();
        let data = self.element_mut(node)?;
        let old_value = match data.attrs.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => Some(std::mem::replace(&mut slot.1, value.to_string())),
            None => {
                data.attrs.push((name.clone(), value.to_string()));
                None
            }
        };
        self.queue_mutation(MutationRecord::attribute(node, name, old_value));
        Ok(())
    }

    /// Returns whether the attribute was present.
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<bool, DomError> {
        let name = name.to_ascii_lowercase();
        let data = self.element_mut(node)?;
        let Some(index) = data.attrs.iter().position(|(key, _)| *key == name) else {
            return Ok(false);
        };
        let (_, old_value) = data.attrs.remove(index);
        self.queue_mutation(MutationRecord::attribute(node, name, Some(old_value)));
        Ok(true)
    }

    pub fn class_list(&self, node: NodeId) -> Vec<&str> {
        self.get_attribute(node, "class")
            .map(|classes| classes.split_ascii_whitespace().collect())
            .unwrap_or_default()
    }

    /// Class list joined by single spaces.
    pub fn class_name(&self, node: NodeId) -> String {
        self.class_list(node).join(" ")
    }

    fn element_mut(&mut self, node: NodeId) -> Result<&mut ElementData, DomError> {
        match self.arena.get_mut(node).map(|n| n.get_mut()) {
            Some(NodeKind::Element(data)) => Ok(data),
            Some(_) => Err(DomError::NotAnElement(node)),
            None => Err(DomError::UnknownNode(node)),
        }
    }

    // -----------------------------------------------------------------------
    // Child list
    // -----------------------------------------------------------------------

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, DomError> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference` (or last when `None`).
    ///
    /// The child is first removed from its current parent. A fragment is not
    /// inserted itself: its children are moved, leaving it empty.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<NodeId, DomError> {
        self.check_node(parent)?;
        let child_kind = self.check_node(child)?.clone();
        if !matches!(
            self.kind(parent),
            Some(NodeKind::Document | NodeKind::Fragment | NodeKind::Element(_))
        ) {
            return Err(DomError::NotAParent(parent));
        }
        if matches!(child_kind, NodeKind::Document) || self.contains(child, parent) {
            return Err(DomError::HierarchyRequest);
        }
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) {
                return Err(DomError::NotFound);
            }
        }

        let moved: Vec<NodeId> = if child_kind == NodeKind::Fragment {
            self.children(child).collect()
        } else {
            vec![child]
        };
        if moved.is_empty() {
            return Ok(child);
        }

        // Inserting a node before itself means inserting before its next sibling.
        let mut reference = reference;
        while let Some(r) = reference.filter(|r| moved.contains(r)) {
            reference = self.next_sibling(r);
        }

        if child_kind == NodeKind::Fragment {
            for &node in &moved {
                node.detach(&mut self.arena);
            }
            self.queue_mutation(MutationRecord::child_list(child, Vec::new(), moved.clone()));
        } else if let Some(old_parent) = self.parent(child) {
            child.detach(&mut self.arena);
            self.queue_mutation(MutationRecord::child_list(old_parent, Vec::new(), vec![child]));
        }

        for &node in &moved {
            let linked = match reference {
                Some(r) => r.checked_insert_before(node, &mut self.arena),
                None => parent.checked_append(node, &mut self.arena),
            };
            linked.map_err(|_| DomError::HierarchyRequest)?;
        }
        self.queue_mutation(MutationRecord::child_list(parent, moved, Vec::new()));
        Ok(child)
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, DomError> {
        self.check_node(parent)?;
        self.check_node(child)?;
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotFound);
        }
        child.detach(&mut self.arena);
        self.queue_mutation(MutationRecord::child_list(parent, Vec::new(), vec![child]));
        Ok(child)
    }

    /// Replace all children with a single text node (nothing for empty text).
    pub fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        self.check_node(node)?;
        if !matches!(
            self.kind(node),
            Some(NodeKind::Element(_) | NodeKind::Fragment)
        ) {
            return Err(DomError::NotAParent(node));
        }
        let removed: Vec<NodeId> = self.children(node).collect();
        for &child in &removed {
            child.detach(&mut self.arena);
        }
        let mut added = Vec::new();
        if !text.is_empty() {
            let text_node = self.create_text(text);
            node.append(text_node, &mut self.arena);
            added.push(text_node);
        }
        if !removed.is_empty() || !added.is_empty() {
            self.queue_mutation(MutationRecord::child_list(node, added, removed));
        }
        Ok(())
    }

    fn check_node(&self, node: NodeId) -> Result<&NodeKind, DomError> {
        self.kind(node).ok_or(DomError::UnknownNode(node))
    }
}
