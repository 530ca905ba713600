use crate::options::FormsetOptions;
use dom::{Attribute, Document, DomError, Id, is_void_element};
use std::sync::Arc;

const VOID_HREF: &str = "javascript:void(0)";

/// Container shape of a collection's rows, chosen once from the template row.
///
/// The shape decides where the add and delete affordances are placed, and
/// nothing else.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowShape {
    /// Rows are `<tr>` elements.
    TableRow,
    /// Rows are `<ul>` or `<ol>` elements.
    List,
    /// Anything else.
    Block,
}

impl RowShape {
    pub fn detect(doc: &Document, row: Id) -> Self {
        match doc.element_name(row) {
            Some("tr") => RowShape::TableRow,
            Some("ul" | "ol") => RowShape::List,
            _ => RowShape::Block,
        }
    }
}

/// The add affordance: an outer element whose visibility follows the
/// capacity gate, and the anchor that carries the label and the listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddAffordance {
    pub wrapper: Id,
    pub link: Id,
}

pub fn add_affordance_id(prefix: &str) -> String {
    format!("{prefix}-add")
}

fn attrs(pairs: &[(&str, &str)]) -> Vec<Attribute> {
    pairs
        .iter()
        .map(|&(key, value)| (Arc::from(key), Some(value.to_string())))
        .collect()
}

fn anchor(doc: &mut Document, attributes: &[(&str, &str)], text: &str) -> Result<Id, DomError> {
    let link = doc.create_element("a", attrs(attributes));
    let label = doc.create_text(text);
    doc.append_child(link, label)?;
    Ok(link)
}

/// Build the add affordance for a collection whose rows (template included,
/// document order) are `rows`, and put it in the document.
///
/// Table rows get a new `<tr>` appended to the rows' parent, with one cell
/// spanning as many columns as the first row has cells. Every other shape gets
/// a `<div>` right after the last row.
pub fn insert_add_affordance(
    doc: &mut Document,
    shape: RowShape,
    rows: &[Id],
    options: &FormsetOptions,
    total: usize,
) -> Result<AddAffordance, DomError> {
    let (&first, &last) = match (rows.first(), rows.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(DomError::MissingNode(Id::INVALID)),
    };
    let (text, title) = options.add_copy(total);
    let id = add_affordance_id(&options.prefix);
    let link = anchor(
        doc,
        &[("id", id.as_str()), ("href", VOID_HREF), ("title", title)],
        text,
    )?;

    let wrapper = match shape {
        RowShape::TableRow => {
            let parent = doc.parent(first).ok_or(DomError::InvalidParent(first))?;
            let columns = doc.element_children(first).len().max(1);
            let colspan = columns.to_string();
            let wrapper =
                doc.create_element("tr", attrs(&[("class", options.add_css_class.as_str())]));
            let cell = doc.create_element("td", attrs(&[("colspan", colspan.as_str())]));
            doc.append_child(cell, link)?;
            doc.append_child(wrapper, cell)?;
            doc.append_child(parent, wrapper)?;
            wrapper
        }
        RowShape::List | RowShape::Block => {
            let wrapper =
                doc.create_element("div", attrs(&[("class", options.add_css_class.as_str())]));
            doc.append_child(wrapper, link)?;
            doc.insert_after(last, wrapper)?;
            wrapper
        }
    };
    log::debug!(target: "formset", "{}: add affordance {wrapper} ({shape:?})", options.prefix);
    Ok(AddAffordance { wrapper, link })
}

/// Give a freshly cloned row its delete anchor and return the anchor.
///
/// Table rows get `<div><a>` in their last cell, lists get a trailing `<li><a>`
/// and blocks get `<span><a>` in their last child element. A block whose last
/// child cannot hold it takes the wrapper directly.
pub fn attach_delete_affordance(
    doc: &mut Document,
    shape: RowShape,
    row: Id,
    options: &FormsetOptions,
) -> Result<Id, DomError> {
    let (container, wrapper_name) = match shape {
        RowShape::TableRow => (doc.last_element_child(row).unwrap_or(row), "div"),
        RowShape::List => (row, "li"),
        RowShape::Block => {
            let target = doc
                .last_element_child(row)
                .filter(|&child| can_hold_affordance(doc, child, options))
                .unwrap_or(row);
            (target, "span")
        }
    };
    let link = anchor(
        doc,
        &[("class", options.delete_css_class.as_str()), ("href", VOID_HREF)],
        &options.delete_text,
    )?;
    let wrapper = doc.create_element(wrapper_name, Vec::new());
    doc.append_child(wrapper, link)?;
    doc.append_child(container, wrapper)?;
    Ok(link)
}

/// Void elements, text-holding controls and deletion-only content (hidden in
/// new rows) cannot take the delete anchor.
fn can_hold_affordance(doc: &Document, el: Id, options: &FormsetOptions) -> bool {
    let Some(name) = doc.element_name(el) else {
        return false;
    };
    !is_void_element(name)
        && !matches!(name, "textarea" | "select" | "option")
        && !doc.has_classes(el, &options.deletion_css_class)
}
