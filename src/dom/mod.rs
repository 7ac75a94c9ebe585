//! In-memory page model.
//!
//! The outline engine never talks to a browser directly. It reads and writes
//! a [`Document`]: an arena of element and text nodes rooted at `<body>`.
//!
//! # Node identity
//!
//! Nodes are addressed by [`NodeId`] (slot index + generation). Freed slots are
//! recycled with a bumped generation, so an id held after the page removed its
//! node never aliases a newer node. Callers that keep ids across update passes
//! (the outline keeps question/heading targets) must revalidate with
//! [`Document::is_live`] before use.
//!
//! # Observation
//!
//! While an observer is connected, every write to a node that is attached to
//! the body tree appends a [`MutationRecord`]. Writes to detached nodes are
//! invisible, exactly like a DOM `MutationObserver` watching `document.body`.
//!
//! ```text
//! write ─▶ connected? ─▶ writes += 1 ─▶ observing? ─▶ records.push(..)
//! ```

mod mutation;
mod parse;
mod selector;


pub use mutation::{MutationKind, MutationRecord, ObserveOptions};
pub use parse::{ParseError, insert_fragment, parse_document};
pub use selector::{Selector, SelectorError};

use std::fmt;

use crate::utils::html::normalize_whitespace;

// =============================================================================
// Node identity
// =============================================================================

/// Lookup key for a node in a [`Document`].
///
/// Never an owning reference: the node may be gone by the time the id is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

// =============================================================================
// Node data
// =============================================================================

/// Element payload: lowercase tag name plus ordered attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn as_element(&self) -> Option<&Element> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            NodeData::Text(_) => None,
        }
    }
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

// =============================================================================
// Document
// =============================================================================

/// Arena-backed page tree.
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<u32>,
    body: NodeId,
    /// Writes applied to connected nodes since creation
    writes: u64,
    observer: Option<ObserveOptions>,
    records: Vec<MutationRecord>,
    /// Removed subtrees awaiting `sweep()` (kept alive while records point at them)
    graveyard: Vec<NodeId>,
    scrolled_to: Option<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document containing only `<body>`.
    pub fn new() -> Self {
        let mut doc = Self {
            slots: Vec::new(),
            free: Vec::new(),
            body: NodeId {
                index: 0,
                generation: 0,
            },
            writes: 0,
            observer: None,
            records: Vec::new(),
            graveyard: Vec::new(),
            scrolled_to: None,
        };
        doc.body = doc.create_element("body");
        doc
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    // -------------------------------------------------------------------------
    // Allocation
    // -------------------------------------------------------------------------

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let node = Node {
            data,
            parent: None,
            children: Vec::new(),
        };
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId {
                index,
                generation: 0,
            }
        }
    }

    /// Create a detached element. Not a write.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeData::Element(Element::new(tag)))
    }

    /// Create a detached element with attributes. Not a write.
    pub fn create_element_with(&mut self, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let mut element = Element::new(tag);
        element.attrs = attrs
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), (*v).to_string()))
            .collect();
        self.alloc(NodeData::Element(element))
    }

    /// Create a detached text node. Not a write.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::Text(text.to_string()))
    }

    /// Release a detached subtree's slots, bumping their generations.
    fn free_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(slot) = self.slots.get_mut(current.index as usize) else {
                continue;
            };
            if slot.generation != current.generation {
                continue;
            }
            if let Some(node) = slot.node.take() {
                stack.extend(node.children);
            }
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(current.index);
            if self.scrolled_to == Some(current) {
                self.scrolled_to = None;
            }
        }
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Does `id` still name the node it was issued for?
    pub fn is_live(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.get(id)?.as_element()
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(Element::tag)
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attr(name)
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|e| e.has_class(class))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.is_element(c))
    }

    /// Nearest preceding sibling that is an element.
    pub fn prev_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&s| s == id)?;
        siblings[..pos]
            .iter()
            .rev()
            .copied()
            .find(|&s| self.is_element(s))
    }

    /// Ancestors from the parent upwards (self excluded).
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.parent(id),
        }
    }

    /// Descendants in document (pre-)order, self excluded.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { doc: self, stack }
    }

    /// Is the node attached (transitively) to `<body>`?
    pub fn is_connected(&self, id: NodeId) -> bool {
        if !self.is_live(id) {
            return false;
        }
        id == self.body || self.ancestors(id).any(|a| a == self.body)
    }

    /// Concatenated text of the subtree.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(Node {
            data: NodeData::Text(text),
            ..
        }) = self.get(id)
        {
            out.push_str(text);
            return out;
        }
        for node in self.descendants(id) {
            if let Some(Node {
                data: NodeData::Text(text),
                ..
            }) = self.get(node)
            {
                out.push_str(text);
            }
        }
        out
    }

    /// Text content with runs of whitespace collapsed and ends trimmed.
    pub fn normalized_text(&self, id: NodeId) -> String {
        normalize_whitespace(&self.text_content(id))
    }

    /// Total writes applied to connected nodes.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Node most recently scrolled into view, if it still exists.
    pub fn scrolled_to(&self) -> Option<NodeId> {
        self.scrolled_to.filter(|&id| self.is_live(id))
    }

    // -------------------------------------------------------------------------
    // Observation
    // -------------------------------------------------------------------------

    /// Start recording mutations of the body subtree.
    pub fn observe(&mut self, options: ObserveOptions) {
        self.observer = Some(options);
    }

    /// Stop recording and drop undelivered records.
    pub fn disconnect(&mut self) {
        self.observer = None;
        self.records.clear();
        self.sweep();
    }

    pub fn is_observing(&self) -> bool {
        self.observer.is_some()
    }

    /// Nodes currently allocated, attached or not.
    pub fn live_nodes(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    pub fn has_pending_records(&self) -> bool {
        !self.records.is_empty()
    }

    /// Drain pending records. Removed nodes they mention stay readable until
    /// [`Document::sweep`] is called.
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    /// Keep only the pending records `keep` accepts.
    pub fn retain_records(&mut self, mut keep: impl FnMut(&Document, &MutationRecord) -> bool) {
        let records = std::mem::take(&mut self.records);
        let kept: Vec<_> = records.into_iter().filter(|r| keep(self, r)).collect();
        self.records = kept;
    }

    /// Free removed subtrees that were not re-attached.
    pub fn sweep(&mut self) {
        let graveyard = std::mem::take(&mut self.graveyard);
        for id in graveyard {
            if self.is_live(id) && self.parent(id).is_none() && id != self.body {
                self.free_subtree(id);
            }
        }
    }

    fn record(&mut self, kind: MutationKind, target: NodeId) {
        let Some(options) = self.observer else {
            return;
        };
        let wanted = match &kind {
            MutationKind::ChildList { .. } => true,
            MutationKind::Attributes { .. } => options.attributes,
            MutationKind::CharacterData => options.character_data,
        };
        if wanted {
            self.records.push(MutationRecord { target, kind });
        }
    }

    // -------------------------------------------------------------------------
    // Tree writes
    // -------------------------------------------------------------------------

    fn unlink(&mut self, child: NodeId) -> Option<NodeId> {
        let parent = self.parent(child)?;
        if let Some(node) = self.get_mut(parent) {
            node.children.retain(|&c| c != child);
        }
        if let Some(node) = self.get_mut(child) {
            node.parent = None;
        }
        Some(parent)
    }

    fn note_removed(&mut self, parent: NodeId, child: NodeId) {
        if self.is_connected(parent) {
            self.writes += 1;
            self.record(
                MutationKind::ChildList {
                    added: Vec::new(),
                    removed: vec![child],
                },
                parent,
            );
        }
    }

    /// Insert `child` into `parent` before `reference` (or at the end).
    ///
    /// A child that already has a parent is moved. Returns false when any id
    /// is stale, when `reference` is not a child of `parent`, or when the move
    /// would create a cycle.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> bool {
        if !self.is_live(parent) || !self.is_live(child) || child == self.body {
            return false;
        }
        if parent == child || self.ancestors(parent).any(|a| a == child) {
            return false;
        }
        if let Some(r) = reference
            && self.parent(r) != Some(parent)
        {
            return false;
        }

        if let Some(old_parent) = self.unlink(child) {
            self.note_removed(old_parent, child);
        }

        let Some(node) = self.get_mut(parent) else {
            return false;
        };
        let pos = reference
            .and_then(|r| node.children.iter().position(|&c| c == r))
            .unwrap_or(node.children.len());
        node.children.insert(pos, child);
        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
        }

        if self.is_connected(parent) {
            self.writes += 1;
            self.record(
                MutationKind::ChildList {
                    added: vec![child],
                    removed: Vec::new(),
                },
                parent,
            );
        }
        true
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        self.insert_before(parent, child, None)
    }

    /// Swap `old` for `new` in one write. `old` is removed (see [`Document::remove`]).
    pub fn replace_child(&mut self, parent: NodeId, new: NodeId, old: NodeId) -> bool {
        if self.parent(old) != Some(parent) || !self.is_live(new) || new == old {
            return false;
        }
        if new == self.body || self.ancestors(parent).any(|a| a == new) {
            return false;
        }
        if let Some(prev) = self.unlink(new) {
            self.note_removed(prev, new);
        }

        let Some(node) = self.get_mut(parent) else {
            return false;
        };
        let Some(pos) = node.children.iter().position(|&c| c == old) else {
            return false;
        };
        node.children[pos] = new;
        if let Some(n) = self.get_mut(old) {
            n.parent = None;
        }
        if let Some(n) = self.get_mut(new) {
            n.parent = Some(parent);
        }

        if self.is_connected(parent) {
            self.writes += 1;
            self.record(
                MutationKind::ChildList {
                    added: vec![new],
                    removed: vec![old],
                },
                parent,
            );
        }
        self.bury(old);
        true
    }

    /// Detach a node and schedule its subtree for release.
    ///
    /// While observing, the subtree stays readable until [`Document::sweep`]
    /// so that mutation filters can still inspect removed nodes.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.body || !self.is_live(id) {
            return false;
        }
        if let Some(parent) = self.unlink(id) {
            self.note_removed(parent, id);
        }
        self.bury(id);
        true
    }

    fn bury(&mut self, id: NodeId) {
        if self.observer.is_some() {
            self.graveyard.push(id);
        } else {
            self.free_subtree(id);
        }
    }

    /// Remove every child of `id`.
    pub fn clear_children(&mut self, id: NodeId) {
        for child in self.children(id).to_vec() {
            self.remove(child);
        }
    }

    // -------------------------------------------------------------------------
    // Attribute and text writes
    // -------------------------------------------------------------------------

    /// Set an attribute. Setting the current value is not a write.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> bool {
        let name = name.to_ascii_lowercase();
        let Some(Node {
            data: NodeData::Element(element),
            ..
        }) = self.get_mut(id)
        else {
            return false;
        };
        match element.attrs.iter().position(|(k, _)| *k == name) {
            Some(i) if element.attrs[i].1 == value => return true,
            Some(i) => element.attrs[i].1 = value.to_string(),
            None => element.attrs.push((name.clone(), value.to_string())),
        }
        self.note_attr(id, name);
        true
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        let Some(Node {
            data: NodeData::Element(element),
            ..
        }) = self.get_mut(id)
        else {
            return false;
        };
        let before = element.attrs.len();
        element.attrs.retain(|(k, _)| *k != name);
        if element.attrs.len() != before {
            self.note_attr(id, name);
        }
        true
    }

    fn note_attr(&mut self, id: NodeId, name: String) {
        if self.is_connected(id) {
            self.writes += 1;
            self.record(MutationKind::Attributes { name }, id);
        }
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) -> bool {
        let Some(element) = self.element(id) else {
            return false;
        };
        if element.has_class(class) {
            return true;
        }
        let mut classes: Vec<&str> = element.classes().collect();
        classes.push(class);
        let value = classes.join(" ");
        self.set_attr(id, "class", &value)
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) -> bool {
        let Some(element) = self.element(id) else {
            return false;
        };
        if !element.has_class(class) {
            return true;
        }
        let value = element
            .classes()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr(id, "class", &value)
    }

    pub fn set_class(&mut self, id: NodeId, class: &str, on: bool) -> bool {
        if on {
            self.add_class(id, class)
        } else {
            self.remove_class(id, class)
        }
    }

    /// Replace a text node's data.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> bool {
        let Some(Node {
            data: NodeData::Text(data),
            ..
        }) = self.get_mut(id)
        else {
            return false;
        };
        if *data == text {
            return true;
        }
        *data = text.to_string();
        if self.is_connected(id) {
            self.writes += 1;
            self.record(MutationKind::CharacterData, id);
        }
        true
    }

    /// `element.textContent = text`. No-op when the element already holds
    /// exactly that single text child.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> bool {
        if !self.is_element(id) {
            return self.set_text(id, text);
        }
        if let [only] = self.children(id)
            && let Some(Node {
                data: NodeData::Text(current),
                ..
            }) = self.get(*only)
            && current == text
        {
            return true;
        }
        self.clear_children(id);
        if !text.is_empty() {
            let node = self.create_text(text);
            self.append_child(id, node);
        }
        true
    }

    /// Record `id` as the viewport target.
    pub fn scroll_into_view(&mut self, id: NodeId) -> bool {
        if !self.is_connected(id) {
            return false;
        }
        self.scrolled_to = Some(id);
        true
    }
}

// =============================================================================
// Iterators
// =============================================================================

pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(current).iter().rev().copied());
        Some(current)
    }
}
