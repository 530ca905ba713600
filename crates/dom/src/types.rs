use std::fmt;
use std::sync::Arc;

pub type NodeId = u32;

/// Stable identity of a node inside one [`crate::Document`].
///
/// `Id(0)` is never handed out; it is reserved as the "unassigned" sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(pub NodeId);

impl Id {
    pub const INVALID: Id = Id(0);
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub type Attribute = (Arc<str>, Option<String>);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Doctype(String),
    StartTag {
        name: String,
        attributes: Vec<(String, Option<String>)>,
        self_closing: bool,
    },
    EndTag(String),
    Comment(String),
    Text(String),
}

/// Owned snapshot of a document subtree, produced by [`crate::Document::materialize`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Document {
        id: Id,
        doctype: Option<String>,
        children: Vec<Node>,
    },
    Element {
        id: Id,
        name: Arc<str>,
        attributes: Vec<Attribute>,
        children: Vec<Node>,
    },
    Text {
        id: Id,
        text: String,
    },
    Comment {
        id: Id,
        text: String,
    },
}

impl Node {
    pub fn id(&self) -> Id {
        match self {
            Node::Document { id, .. } => *id,
            Node::Element { id, .. } => *id,
            Node::Text { id, .. } => *id,
            Node::Comment { id, .. } => *id,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Document { children, .. } | Node::Element { children, .. } => children,
            _ => &[],
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            Node::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .and_then(|(_, v)| v.as_deref()),
            _ => None,
        }
    }
}

/// A listener bound to a node: the event it reacts to and an opaque action
/// name interpreted by whoever dispatches.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Listener {
    pub event: Arc<str>,
    pub action: Arc<str>,
}

impl Listener {
    pub fn new(event: &str, action: &str) -> Self {
        Self {
            event: Arc::from(event),
            action: Arc::from(action),
        }
    }

    pub fn click(action: &str) -> Self {
        Self::new("click", action)
    }
}
