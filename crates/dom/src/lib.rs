//! In-memory document tree used by the row collection controller.
//!
//! The tree is a keyed arena ([`Document`]) fed by a small forgiving markup
//! tokenizer. Mutations are journaled as [`DomPatch`] values and nodes can carry
//! [`Listener`] bindings that [`Document::dispatch`] resolves by bubbling.

mod builder;
mod document;
mod entities;
mod patch;
mod serialize;
mod tokenizer;
mod traverse;
mod types;

pub use crate::builder::parse_document;
pub use crate::document::{CloneMode, Document, DomError};
pub use crate::patch::DomPatch;
pub use crate::serialize::{node_to_html, outline, to_html};
pub use crate::tokenizer::{is_void_element, tokenize};
pub use crate::traverse::{Ancestors, Descendants};
pub use crate::types::{Attribute, Id, Listener, Node, NodeId, Token};
