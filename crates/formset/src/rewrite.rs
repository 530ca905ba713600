use crate::ident::{IDENT_ATTRS, RowIdent, fill_placeholder, reindex};
use dom::{Document, DomError, Id};

/// Elements whose identifiers track their row's index.
pub const FIELD_ELEMENTS: [&str; 5] = ["input", "select", "textarea", "label", "a"];

pub fn is_field_element(doc: &Document, el: Id) -> bool {
    FIELD_ELEMENTS
        .iter()
        .any(|name| doc.is_element_named(el, name))
}

/// Field-bearing descendants of `row`, in document order.
pub fn field_elements(doc: &Document, row: Id) -> Vec<Id> {
    doc.descendant_elements(row)
        .filter(|&el| is_field_element(doc, el))
        .collect()
}

/// Point every prefix-scoped identifier on `el` at `index`.
///
/// Returns how many attributes changed; elements without matching identifiers
/// are left alone.
pub fn rewrite_element(
    doc: &mut Document,
    el: Id,
    prefix: &str,
    index: usize,
) -> Result<usize, DomError> {
    let mut changed = 0;
    for attr in IDENT_ATTRS {
        let Some(updated) = doc.attr(el, attr).and_then(|raw| reindex(raw, prefix, index)) else {
            continue;
        };
        log::trace!(target: "formset.rewrite", "{el} {attr} -> {updated}");
        doc.set_attr(el, attr, &updated)?;
        changed += 1;
    }
    Ok(changed)
}

/// Substitute the template placeholder in the identifiers of `el`.
pub fn fill_element_placeholders(
    doc: &mut Document,
    el: Id,
    index: usize,
) -> Result<usize, DomError> {
    let mut changed = 0;
    for attr in IDENT_ATTRS {
        let Some(filled) = doc.attr(el, attr).and_then(|raw| fill_placeholder(raw, index)) else {
            continue;
        };
        doc.set_attr(el, attr, &filled)?;
        changed += 1;
    }
    Ok(changed)
}

/// Renumber one row: its own element id plus every field-bearing descendant.
pub fn renumber_row(
    doc: &mut Document,
    row: Id,
    prefix: &str,
    index: usize,
) -> Result<usize, DomError> {
    let fields = field_elements(doc, row);
    let mut changed = rewrite_element(doc, row, prefix, index)?;
    for field in fields {
        changed += rewrite_element(doc, field, prefix, index)?;
    }
    Ok(changed)
}

/// Every numeric slot found on the row's field-bearing descendants, in
/// document order. A consistent row yields a single repeated value.
pub fn observed_indices(doc: &Document, row: Id, prefix: &str) -> Vec<usize> {
    field_elements(doc, row)
        .into_iter()
        .flat_map(|el| {
            IDENT_ATTRS
                .iter()
                .filter_map(move |attr| doc.attr(el, attr))
        })
        .filter_map(|raw| RowIdent::parse(raw, prefix).and_then(|ident| ident.index()))
        .collect()
}
