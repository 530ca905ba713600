use crate::gate::MaxCount;
use dom::{Document, DomError, Id};

/// The two counter fields a collection keeps in the document:
/// `#id_<prefix>-TOTAL_FORMS` and `#id_<prefix>-MAX_NUM_FORMS`.
///
/// Either may be missing. A missing total field is simply not written; a missing
/// max field reads as unbounded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Counters {
    total_field: Option<Id>,
    max_field: Option<Id>,
}

impl Counters {
    pub fn total_field_id(prefix: &str) -> String {
        format!("id_{prefix}-TOTAL_FORMS")
    }

    pub fn max_field_id(prefix: &str) -> String {
        format!("id_{prefix}-MAX_NUM_FORMS")
    }

    pub fn locate(doc: &Document, prefix: &str) -> Self {
        Self {
            total_field: doc.element_by_id(&Self::total_field_id(prefix)),
            max_field: doc.element_by_id(&Self::max_field_id(prefix)),
        }
    }

    pub fn total_field(&self) -> Option<Id> {
        self.total_field
    }

    pub fn max_field(&self) -> Option<Id> {
        self.max_field
    }

    /// The recorded total, if the field exists and holds a number.
    pub fn read_total(&self, doc: &Document) -> Option<usize> {
        let raw = doc.attr(self.total_field?, "value")?;
        raw.trim().parse().ok()
    }

    pub fn read_max(&self, doc: &Document) -> MaxCount {
        MaxCount::from_field(self.max_field.and_then(|field| doc.attr(field, "value")))
    }

    pub fn write_total(&self, doc: &mut Document, total: usize) -> Result<(), DomError> {
        match self.total_field {
            Some(field) => doc.set_attr(field, "value", &total.to_string()),
            None => Ok(()),
        }
    }

    /// Mark both counter fields `autocomplete="off"`.
    pub fn disable_autocomplete(&self, doc: &mut Document) -> Result<(), DomError> {
        for field in [self.total_field, self.max_field].into_iter().flatten() {
            doc.set_attr(field, "autocomplete", "off")?;
        }
        Ok(())
    }
}
