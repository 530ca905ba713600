mod common;

use common::{block_markup, delete_link, table_markup};
use dom::{Attribute, DomPatch, Id, Node, parse_document};
use formset::{Formset, FormsetOptions, Hooks};
use std::collections::HashMap;
use std::sync::Arc;

/// Replays patches onto a copy of a snapshot, the way a host mirroring the
/// document would.
#[derive(Debug)]
enum Kind {
    Document(Option<String>),
    Element(Arc<str>, Vec<Attribute>),
    Text(String),
    Comment(String),
}

#[derive(Debug)]
struct Entry {
    kind: Kind,
    parent: Option<Id>,
    children: Vec<Id>,
}

struct Mirror {
    root: Id,
    nodes: HashMap<Id, Entry>,
}

impl Mirror {
    fn from_snapshot(root: &Node) -> Self {
        let mut mirror = Self {
            root: root.id(),
            nodes: HashMap::new(),
        };
        mirror.load(root, None);
        mirror
    }

    fn load(&mut self, node: &Node, parent: Option<Id>) {
        let kind = match node {
            Node::Document { doctype, .. } => Kind::Document(doctype.clone()),
            Node::Element {
                name, attributes, ..
            } => Kind::Element(Arc::clone(name), attributes.clone()),
            Node::Text { text, .. } => Kind::Text(text.clone()),
            Node::Comment { text, .. } => Kind::Comment(text.clone()),
        };
        let children = node.children().iter().map(Node::id).collect();
        self.nodes.insert(
            node.id(),
            Entry {
                kind,
                parent,
                children,
            },
        );
        for child in node.children() {
            self.load(child, Some(node.id()));
        }
    }

    fn create(&mut self, key: Id, kind: Kind) -> Result<(), String> {
        if self.nodes.contains_key(&key) {
            return Err(format!("create of existing key {key}"));
        }
        self.nodes.insert(
            key,
            Entry {
                kind,
                parent: None,
                children: Vec::new(),
            },
        );
        Ok(())
    }

    fn entry(&mut self, key: Id) -> Result<&mut Entry, String> {
        self.nodes
            .get_mut(&key)
            .ok_or_else(|| format!("unknown key {key}"))
    }

    fn apply(&mut self, patch: &DomPatch) -> Result<(), String> {
        match patch {
            DomPatch::CreateElement {
                key,
                name,
                attributes,
            } => self.create(*key, Kind::Element(Arc::clone(name), attributes.clone())),
            DomPatch::CreateText { key, text } => self.create(*key, Kind::Text(text.clone())),
            DomPatch::CreateComment { key, text } => {
                self.create(*key, Kind::Comment(text.clone()))
            }
            DomPatch::AppendChild { parent, child } => {
                self.entry(*child)?.parent = Some(*parent);
                self.entry(*parent)?.children.push(*child);
                Ok(())
            }
            DomPatch::InsertBefore {
                parent,
                child,
                before,
            } => {
                self.entry(*child)?.parent = Some(*parent);
                let siblings = &mut self.entry(*parent)?.children;
                let pos = siblings
                    .iter()
                    .position(|k| k == before)
                    .ok_or_else(|| format!("{before} is not a child of {parent}"))?;
                siblings.insert(pos, *child);
                Ok(())
            }
            DomPatch::RemoveNode { key } => {
                let parent = self.entry(*key)?.parent;
                if let Some(parent) = parent {
                    self.entry(parent)?.children.retain(|k| k != key);
                }
                let mut stack = vec![*key];
                while let Some(current) = stack.pop() {
                    if let Some(entry) = self.nodes.remove(&current) {
                        stack.extend(entry.children);
                    }
                }
                Ok(())
            }
            DomPatch::SetAttributes { key, attributes } => match &mut self.entry(*key)?.kind {
                Kind::Element(_, current) => {
                    *current = attributes.clone();
                    Ok(())
                }
                other => Err(format!("attributes on non-element {key}: {other:?}")),
            },
            DomPatch::SetText { key, text } => match &mut self.entry(*key)?.kind {
                Kind::Text(current) => {
                    *current = text.clone();
                    Ok(())
                }
                other => Err(format!("text on non-text {key}: {other:?}")),
            },
            other => Err(format!("unsupported patch {other:?}")),
        }
    }

    fn materialize(&self, id: Id) -> Node {
        let entry = &self.nodes[&id];
        let children = entry.children.iter().map(|&c| self.materialize(c)).collect();
        match &entry.kind {
            Kind::Document(doctype) => Node::Document {
                id,
                doctype: doctype.clone(),
                children,
            },
            Kind::Element(name, attributes) => Node::Element {
                id,
                name: Arc::clone(name),
                attributes: attributes.clone(),
                children,
            },
            Kind::Text(text) => Node::Text {
                id,
                text: text.clone(),
            },
            Kind::Comment(text) => Node::Comment {
                id,
                text: text.clone(),
            },
        }
    }

    fn replay(&mut self, patches: &[DomPatch]) {
        for patch in patches {
            if let Err(err) = self.apply(patch) {
                panic!("patch {patch:?} failed to apply: {err}");
            }
        }
    }
}

fn check_parity(markup: &str, prefix: &str, steps: &[&str]) {
    let mut doc = parse_document(markup);
    let mut mirror = Mirror::from_snapshot(&doc.materialize());

    let mut formset =
        Formset::setup(&mut doc, FormsetOptions::with_prefix(prefix), Hooks::new()).unwrap();
    mirror.replay(&doc.take_patches());
    assert_eq!(mirror.materialize(mirror.root), doc.materialize(), "after setup");

    for step in steps {
        let effect = match step.split_once(':') {
            None => formset.add(&mut doc).unwrap(),
            Some((_, position)) => {
                let row = formset.rows(&doc)[position.parse::<usize>().unwrap()];
                let link = delete_link(&doc, row);
                formset.remove(&mut doc, link).unwrap()
            }
        };
        mirror.replay(&effect.patches);
        assert_eq!(mirror.materialize(mirror.root), doc.materialize(), "after {step}");
    }
}

#[test]
fn block_effects_replay_onto_a_mirror() {
    check_parity(
        &block_markup("item", 2, Some(4)),
        "item",
        &["add", "add", "remove:1", "remove:0", "add", "remove:2"],
    );
}

#[test]
fn table_effects_replay_onto_a_mirror() {
    check_parity(
        &table_markup("line", 0, None),
        "line",
        &["add", "add", "add", "remove:0", "remove:1"],
    );
}
