use crate::document::Document;
use crate::types::Id;

/// Pre-order walk over the descendants of a node, excluding the node itself.
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<Id>,
}

impl Iterator for Descendants<'_> {
    type Item = Id;

    fn next(&mut self) -> Option<Id> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}

/// Walk from a node's parent up to the document root.
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<Id>,
}

impl Iterator for Ancestors<'_> {
    type Item = Id;

    fn next(&mut self) -> Option<Id> {
        let id = self.next?;
        self.next = self.doc.parent(id);
        Some(id)
    }
}

impl Document {
    pub fn descendants(&self, id: Id) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: self.children(id).iter().rev().copied().collect(),
        }
    }

    pub fn descendant_elements(&self, id: Id) -> impl Iterator<Item = Id> + '_ {
        self.descendants(id).filter(|&d| self.is_element(d))
    }

    pub fn ancestors(&self, id: Id) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.parent(id),
        }
    }

    /// `id` itself or its nearest ancestor matching `pred`.
    pub fn closest(&self, id: Id, pred: impl Fn(&Document, Id) -> bool) -> Option<Id> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&candidate| pred(self, candidate))
    }

    /// First attached element, in document order, whose `id` attribute equals `value`.
    pub fn element_by_id(&self, value: &str) -> Option<Id> {
        self.descendant_elements(self.root())
            .find(|&el| self.attr(el, "id") == Some(value))
    }

    /// Elements under `scope` (in document order) carrying every class in `classes`.
    pub fn elements_with_classes(&self, scope: Id, classes: &str) -> Vec<Id> {
        self.descendant_elements(scope)
            .filter(|&el| self.has_classes(el, classes))
            .collect()
    }

    pub fn last_element_child(&self, id: Id) -> Option<Id> {
        self.children(id)
            .iter()
            .rev()
            .copied()
            .find(|&child| self.is_element(child))
    }
}
