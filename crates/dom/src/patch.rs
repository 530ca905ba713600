//! Incremental document patch journal.
//!
//! Every mutation applied through [`crate::Document`] is recorded as a `DomPatch`
//! so a host that mirrors the document elsewhere can replay the change.
//!
//! Invariants:
//! - Patches are recorded in application order.
//! - Keys refer to nodes that exist at the time the patch is applied (except the
//!   `key` of create operations).
//! - `Id::INVALID` never appears in a patch.
//! - Attribute order and duplicates are preserved; `SetAttributes` always carries
//!   the complete attribute list.
//! - Clones appear as a sequence of create operations followed by the
//!   `AppendChild` patches that assemble the detached subtree.

use crate::types::{Attribute, Id};
use std::sync::Arc;

#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomPatch {
    /// Create a detached element node with initial attributes.
    CreateElement {
        key: Id,
        name: Arc<str>,
        attributes: Vec<Attribute>,
    },
    /// Create a detached text node.
    CreateText { key: Id, text: String },
    /// Create a detached comment node.
    CreateComment { key: Id, text: String },
    /// Append a child to the end of a parent's children list.
    AppendChild { parent: Id, child: Id },
    /// Insert a child before an existing sibling.
    InsertBefore { parent: Id, child: Id, before: Id },
    /// Remove a node and its entire subtree.
    RemoveNode { key: Id },
    /// Replace all attributes on an element node.
    SetAttributes { key: Id, attributes: Vec<Attribute> },
    /// Replace the text of a text node.
    SetText { key: Id, text: String },
}

impl DomPatch {
    /// The node the patch is primarily about.
    pub fn key(&self) -> Id {
        match self {
            DomPatch::CreateElement { key, .. }
            | DomPatch::CreateText { key, .. }
            | DomPatch::CreateComment { key, .. }
            | DomPatch::RemoveNode { key }
            | DomPatch::SetAttributes { key, .. }
            | DomPatch::SetText { key, .. } => *key,
            DomPatch::AppendChild { child, .. } | DomPatch::InsertBefore { child, .. } => *child,
        }
    }
}
