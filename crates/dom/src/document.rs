use crate::patch::DomPatch;
use crate::types::{Attribute, Id, Listener, Node};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomError {
    MissingNode(Id),
    WrongNodeKind(Id),
    InvalidParent(Id),
    InvalidSibling { parent: Id, before: Id },
    CycleDetected { parent: Id, child: Id },
    RootRemoval,
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomError::MissingNode(id) => write!(f, "node {id} does not exist"),
            DomError::WrongNodeKind(id) => write!(f, "node {id} has the wrong kind for this operation"),
            DomError::InvalidParent(id) => write!(f, "node {id} cannot take part in this parent/child link"),
            DomError::InvalidSibling { parent, before } => {
                write!(f, "node {before} is not a child of {parent}")
            }
            DomError::CycleDetected { parent, child } => {
                write!(f, "inserting {child} under {parent} would create a cycle")
            }
            DomError::RootRemoval => f.write_str("the document root cannot be removed"),
        }
    }
}

impl std::error::Error for DomError {}

/// Whether [`Document::clone_subtree`] carries listener bindings over to the copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloneMode {
    Structure,
    WithListeners,
}

#[derive(Clone)]
enum NodeKind {
    Document {
        doctype: Option<String>,
    },
    Element {
        name: Arc<str>,
        attributes: Vec<Attribute>,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
}

struct NodeRecord {
    id: Id,
    kind: NodeKind,
    parent: Option<Id>,
    children: Vec<Id>,
}

impl NodeRecord {
    fn allows_children(&self) -> bool {
        matches!(self.kind, NodeKind::Document { .. } | NodeKind::Element { .. })
    }
}

/// Keyed, mutable document tree.
///
/// Nodes live in an arena addressed by [`Id`]. Created nodes start detached and
/// are placed with [`Document::append_child`] / [`Document::insert_before`].
/// Every mutation is recorded in a patch journal drained by
/// [`Document::take_patches`].
pub struct Document {
    nodes: Vec<NodeRecord>,
    live: HashMap<Id, usize>,
    root: Id,
    next_id: u32,
    listeners: HashMap<Id, Vec<Listener>>,
    journal: Vec<DomPatch>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("live", &self.live.len())
            .field("pending_patches", &self.journal.len())
            .finish()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            live: HashMap::new(),
            root: Id::INVALID,
            next_id: 1,
            listeners: HashMap::new(),
            journal: Vec::new(),
        };
        doc.root = doc.alloc(NodeKind::Document { doctype: None });
        doc
    }

    pub fn root(&self) -> Id {
        self.root
    }

    pub fn contains(&self, id: Id) -> bool {
        self.live.contains_key(&id)
    }

    pub fn set_doctype(&mut self, value: String) {
        let root = self.root;
        if let Ok(record) = self.record_mut(root)
            && let NodeKind::Document { doctype } = &mut record.kind
        {
            *doctype = Some(value);
        }
    }

    pub fn doctype(&self) -> Option<&str> {
        match &self.record(self.root).ok()?.kind {
            NodeKind::Document { doctype } => doctype.as_deref(),
            _ => None,
        }
    }

    fn alloc(&mut self, kind: NodeKind) -> Id {
        let id = Id(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let index = self.nodes.len();
        self.nodes.push(NodeRecord {
            id,
            kind,
            parent: None,
            children: Vec::new(),
        });
        self.live.insert(id, index);
        id
    }

    fn record(&self, id: Id) -> Result<&NodeRecord, DomError> {
        self.live
            .get(&id)
            .map(|&index| &self.nodes[index])
            .ok_or(DomError::MissingNode(id))
    }

    fn record_mut(&mut self, id: Id) -> Result<&mut NodeRecord, DomError> {
        match self.live.get(&id) {
            Some(&index) => Ok(&mut self.nodes[index]),
            None => Err(DomError::MissingNode(id)),
        }
    }

    // ---- creation ----

    pub fn create_element(&mut self, name: &str, attributes: Vec<Attribute>) -> Id {
        let name: Arc<str> = Arc::from(name);
        let id = self.alloc(NodeKind::Element {
            name: Arc::clone(&name),
            attributes: attributes.clone(),
        });
        self.journal.push(DomPatch::CreateElement {
            key: id,
            name,
            attributes,
        });
        id
    }

    pub fn create_text(&mut self, text: &str) -> Id {
        let id = self.alloc(NodeKind::Text {
            text: text.to_string(),
        });
        self.journal.push(DomPatch::CreateText {
            key: id,
            text: text.to_string(),
        });
        id
    }

    pub fn create_comment(&mut self, text: &str) -> Id {
        let id = self.alloc(NodeKind::Comment {
            text: text.to_string(),
        });
        self.journal.push(DomPatch::CreateComment {
            key: id,
            text: text.to_string(),
        });
        id
    }

    // ---- structure ----

    pub fn parent(&self, id: Id) -> Option<Id> {
        self.record(id).ok()?.parent
    }

    pub fn children(&self, id: Id) -> &[Id] {
        self.record(id).map(|r| r.children.as_slice()).unwrap_or(&[])
    }

    pub fn element_children(&self, id: Id) -> Vec<Id> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.is_element(child))
            .collect()
    }

    pub fn is_element(&self, id: Id) -> bool {
        matches!(
            self.record(id).map(|r| &r.kind),
            Ok(NodeKind::Element { .. })
        )
    }

    pub fn element_name(&self, id: Id) -> Option<&str> {
        match &self.record(id).ok()?.kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn is_element_named(&self, id: Id, name: &str) -> bool {
        self.element_name(id)
            .is_some_and(|n| n.eq_ignore_ascii_case(name))
    }

    /// True when the node is connected to the document root.
    pub fn is_attached(&self, id: Id) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    fn is_descendant(&self, ancestor: Id, maybe_descendant: Id) -> bool {
        let Ok(record) = self.record(ancestor) else {
            return false;
        };
        let mut stack: Vec<Id> = record.children.clone();
        while let Some(current) = stack.pop() {
            if current == maybe_descendant {
                return true;
            }
            stack.extend(self.children(current).iter().copied());
        }
        false
    }

    fn check_link(&self, parent: Id, child: Id) -> Result<(), DomError> {
        if parent == child || self.is_descendant(child, parent) {
            return Err(DomError::CycleDetected { parent, child });
        }
        if !self.record(parent)?.allows_children() {
            return Err(DomError::InvalidParent(parent));
        }
        let child_record = self.record(child)?;
        if child_record.parent.is_some() || child == self.root {
            return Err(DomError::InvalidParent(child));
        }
        Ok(())
    }

    // Used by the tree builder for freshly created, detached nodes.
    pub(crate) fn attach_unchecked(&mut self, parent: Id, child: Id) {
        if let (Some(&p), Some(&c)) = (self.live.get(&parent), self.live.get(&child)) {
            self.nodes[p].children.push(child);
            self.nodes[c].parent = Some(parent);
        }
    }

    pub fn append_child(&mut self, parent: Id, child: Id) -> Result<(), DomError> {
        self.check_link(parent, child)?;
        self.record_mut(parent)?.children.push(child);
        self.record_mut(child)?.parent = Some(parent);
        self.journal.push(DomPatch::AppendChild { parent, child });
        Ok(())
    }

    pub fn insert_before(&mut self, parent: Id, child: Id, before: Id) -> Result<(), DomError> {
        self.check_link(parent, child)?;
        if self.record(before)?.parent != Some(parent) {
            return Err(DomError::InvalidSibling { parent, before });
        }
        let siblings = &mut self.record_mut(parent)?.children;
        let pos = siblings
            .iter()
            .position(|k| *k == before)
            .ok_or(DomError::InvalidSibling { parent, before })?;
        siblings.insert(pos, child);
        self.record_mut(child)?.parent = Some(parent);
        self.journal.push(DomPatch::InsertBefore {
            parent,
            child,
            before,
        });
        Ok(())
    }

    /// Insert `child` as the next sibling of `reference`.
    pub fn insert_after(&mut self, reference: Id, child: Id) -> Result<(), DomError> {
        let parent = self
            .parent(reference)
            .ok_or(DomError::InvalidParent(reference))?;
        let siblings = self.children(parent);
        let pos = siblings
            .iter()
            .position(|k| *k == reference)
            .ok_or(DomError::InvalidSibling {
                parent,
                before: reference,
            })?;
        match siblings.get(pos + 1).copied() {
            Some(next) => self.insert_before(parent, child, next),
            None => self.append_child(parent, child),
        }
    }

    /// Detach `key` and drop it and its whole subtree from the arena.
    pub fn remove_subtree(&mut self, key: Id) -> Result<(), DomError> {
        if key == self.root {
            return Err(DomError::RootRemoval);
        }
        let parent = self.record_mut(key)?.parent.take();
        if let Some(parent) = parent
            && let Ok(record) = self.record_mut(parent)
        {
            record.children.retain(|k| *k != key);
        }
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            if let Some(index) = self.live.remove(&current) {
                stack.append(&mut self.nodes[index].children);
            }
            self.listeners.remove(&current);
        }
        self.journal.push(DomPatch::RemoveNode { key });
        Ok(())
    }

    /// Deep-copy `key` into a new detached subtree and return the copy's root.
    pub fn clone_subtree(&mut self, key: Id, mode: CloneMode) -> Result<Id, DomError> {
        let copy = match self.record(key)?.kind.clone() {
            NodeKind::Document { .. } => return Err(DomError::WrongNodeKind(key)),
            NodeKind::Element { name, attributes } => self.create_element(&name, attributes),
            NodeKind::Text { text } => self.create_text(&text),
            NodeKind::Comment { text } => self.create_comment(&text),
        };
        if mode == CloneMode::WithListeners
            && let Some(bound) = self.listeners.get(&key).cloned()
        {
            self.listeners.insert(copy, bound);
        }
        let children = self.children(key).to_vec();
        for child in children {
            let child_copy = self.clone_subtree(child, mode)?;
            self.append_child(copy, child_copy)?;
        }
        Ok(copy)
    }

    // ---- attributes ----

    pub fn attributes(&self, id: Id) -> &[Attribute] {
        match self.record(id).map(|r| &r.kind) {
            Ok(NodeKind::Element { attributes, .. }) => attributes,
            _ => &[],
        }
    }

    pub fn has_attr(&self, id: Id, name: &str) -> bool {
        self.attributes(id)
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    pub fn attr(&self, id: Id, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .and_then(|(_, v)| v.as_deref())
    }

    fn update_attributes(
        &mut self,
        id: Id,
        edit: impl FnOnce(&mut Vec<Attribute>) -> bool,
    ) -> Result<(), DomError> {
        let record = self.record_mut(id)?;
        let NodeKind::Element { attributes, .. } = &mut record.kind else {
            return Err(DomError::WrongNodeKind(id));
        };
        if edit(attributes) {
            let attributes = attributes.clone();
            self.journal
                .push(DomPatch::SetAttributes { key: id, attributes });
        }
        Ok(())
    }

    fn write_attr(&mut self, id: Id, name: &str, value: Option<String>) -> Result<(), DomError> {
        self.update_attributes(id, |attributes| {
            match attributes
                .iter_mut()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
            {
                Some((_, existing)) if *existing == value => false,
                Some((_, existing)) => {
                    *existing = value;
                    true
                }
                None => {
                    attributes.push((Arc::from(name), value));
                    true
                }
            }
        })
    }

    /// Set `name` to `value`, appending the attribute when absent. Writing the
    /// current value records no patch.
    pub fn set_attr(&mut self, id: Id, name: &str, value: &str) -> Result<(), DomError> {
        self.write_attr(id, name, Some(value.to_string()))
    }

    /// Add or drop a valueless attribute such as `hidden`.
    pub fn set_flag(&mut self, id: Id, name: &str, on: bool) -> Result<(), DomError> {
        if on {
            if self.has_attr(id, name) {
                return Ok(());
            }
            self.write_attr(id, name, None)
        } else {
            self.remove_attr(id, name).map(|_| ())
        }
    }

    pub fn remove_attr(&mut self, id: Id, name: &str) -> Result<bool, DomError> {
        let mut removed = false;
        self.update_attributes(id, |attributes| {
            let before = attributes.len();
            attributes.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
            removed = attributes.len() != before;
            removed
        })?;
        Ok(removed)
    }

    // ---- classes ----

    pub fn classes(&self, id: Id) -> impl Iterator<Item = &str> {
        self.attr(id, "class").unwrap_or("").split_ascii_whitespace()
    }

    pub fn has_class(&self, id: Id, class: &str) -> bool {
        self.classes(id).any(|c| c == class)
    }

    /// True when the element carries every class in the whitespace separated
    /// list `classes`. An empty list matches nothing.
    pub fn has_classes(&self, id: Id, classes: &str) -> bool {
        let mut wanted = classes.split_ascii_whitespace().peekable();
        wanted.peek().is_some() && wanted.all(|c| self.has_class(id, c))
    }

    pub fn add_class(&mut self, id: Id, classes: &str) -> Result<(), DomError> {
        let mut current: Vec<String> = self.classes(id).map(str::to_string).collect();
        let before = current.len();
        for class in classes.split_ascii_whitespace() {
            if !current.iter().any(|c| c == class) {
                current.push(class.to_string());
            }
        }
        if current.len() == before {
            return Ok(());
        }
        self.set_attr(id, "class", &current.join(" "))
    }

    pub fn remove_class(&mut self, id: Id, classes: &str) -> Result<(), DomError> {
        let dropped: Vec<&str> = classes.split_ascii_whitespace().collect();
        let current: Vec<String> = self.classes(id).map(str::to_string).collect();
        let kept: Vec<&str> = current
            .iter()
            .map(String::as_str)
            .filter(|c| !dropped.contains(c))
            .collect();
        if kept.len() == current.len() {
            return Ok(());
        }
        if kept.is_empty() {
            self.remove_attr(id, "class").map(|_| ())
        } else {
            self.set_attr(id, "class", &kept.join(" "))
        }
    }

    // ---- visibility ----

    pub fn set_hidden(&mut self, id: Id, hidden: bool) -> Result<(), DomError> {
        self.set_flag(id, "hidden", hidden)
    }

    pub fn is_hidden(&self, id: Id) -> bool {
        self.has_attr(id, "hidden")
    }

    // ---- text ----

    pub fn text_content(&self, id: Id) -> String {
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Ok(record) = self.record(current) else {
                continue;
            };
            if let NodeKind::Text { text } = &record.kind {
                out.push_str(text);
            }
            stack.extend(record.children.iter().rev().copied());
        }
        out
    }

    /// Replace the children of `id` with a single text node holding `text`.
    /// A lone text child is updated in place.
    pub fn set_text_content(&mut self, id: Id, text: &str) -> Result<(), DomError> {
        if !self.record(id)?.allows_children() {
            return Err(DomError::WrongNodeKind(id));
        }
        let children = self.children(id).to_vec();
        if let [only] = children[..] {
            let record = self.record_mut(only)?;
            if let NodeKind::Text { text: existing } = &mut record.kind {
                if existing != text {
                    existing.clear();
                    existing.push_str(text);
                    self.journal.push(DomPatch::SetText {
                        key: only,
                        text: text.to_string(),
                    });
                }
                return Ok(());
            }
        }
        for child in children {
            self.remove_subtree(child)?;
        }
        let node = self.create_text(text);
        self.append_child(id, node)
    }

    // ---- listeners ----

    pub fn bind(&mut self, id: Id, listener: Listener) -> Result<(), DomError> {
        self.record(id)?;
        let bound = self.listeners.entry(id).or_default();
        if !bound.contains(&listener) {
            bound.push(listener);
        }
        Ok(())
    }

    pub fn listeners(&self, id: Id) -> &[Listener] {
        self.listeners.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Bubble `event` from `target` up to the root and collect every bound
    /// action, nearest first, together with the node it was bound on.
    pub fn dispatch(&self, target: Id, event: &str) -> Vec<(Id, Arc<str>)> {
        let mut out = Vec::new();
        let mut current = self.contains(target).then_some(target);
        while let Some(node) = current {
            for listener in self.listeners(node) {
                if &*listener.event == event {
                    out.push((node, Arc::clone(&listener.action)));
                }
            }
            current = self.parent(node);
        }
        log::trace!(target: "dom", "dispatch {event} at {target}: {} listener(s)", out.len());
        out
    }

    // ---- journal / snapshots ----

    pub fn take_patches(&mut self) -> Vec<DomPatch> {
        std::mem::take(&mut self.journal)
    }

    pub fn pending_patches(&self) -> &[DomPatch] {
        &self.journal
    }

    pub fn materialize(&self) -> Node {
        self.materialize_node(self.root)
            .expect("document root is always live")
    }

    pub fn materialize_node(&self, id: Id) -> Result<Node, DomError> {
        let record = self.record(id)?;
        let children = record
            .children
            .iter()
            .map(|&child| self.materialize_node(child))
            .collect::<Result<Vec<_>, _>>()?;
        let node = match &record.kind {
            NodeKind::Document { doctype } => Node::Document {
                id: record.id,
                doctype: doctype.clone(),
                children,
            },
            NodeKind::Element { name, attributes } => Node::Element {
                id: record.id,
                name: Arc::clone(name),
                attributes: attributes.clone(),
                children,
            },
            NodeKind::Text { text } => Node::Text {
                id: record.id,
                text: text.clone(),
            },
            NodeKind::Comment { text } => Node::Comment {
                id: record.id,
                text: text.clone(),
            },
        };
        Ok(node)
    }

    pub(crate) fn text_of(&self, id: Id) -> Option<&str> {
        match &self.record(id).ok()?.kind {
            NodeKind::Text { text } => Some(text),
            _ => None,
        }
    }

    pub(crate) fn comment_of(&self, id: Id) -> Option<&str> {
        match &self.record(id).ok()?.kind {
            NodeKind::Comment { text } => Some(text),
            _ => None,
        }
    }
}
