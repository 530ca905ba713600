#![allow(dead_code)]

use dom::{Document, Id, parse_document};
use formset::{Formset, FormsetOptions, Hooks, observed_indices};
use std::fmt::Write as _;

fn counters(prefix: &str, total: usize, max: Option<usize>) -> String {
    let max = max.map(|m| m.to_string()).unwrap_or_default();
    format!(
        r#"<input type="hidden" name="{prefix}-TOTAL_FORMS" id="id_{prefix}-TOTAL_FORMS" value="{total}">
<input type="hidden" name="{prefix}-MAX_NUM_FORMS" id="id_{prefix}-MAX_NUM_FORMS" value="{max}">
"#
    )
}

fn block_row(prefix: &str, slot: &str, class: &str, delete: bool) -> String {
    let mut row = format!(
        r#"<div class="{prefix}-form{class}" id="{prefix}-{slot}">
  <label for="id_{prefix}-{slot}-name">Name</label>
  <input type="text" id="id_{prefix}-{slot}-name" name="{prefix}-{slot}-name">
  <select id="id_{prefix}-{slot}-kind" name="{prefix}-{slot}-kind"><option value="1">one</option></select>
  <textarea id="id_{prefix}-{slot}-note" name="{prefix}-{slot}-note"></textarea>
  <p class="field DELETE"><input type="checkbox" id="id_{prefix}-{slot}-DELETE" name="{prefix}-{slot}-DELETE"></p>
"#
    );
    if delete {
        row.push_str(r#"  <a class="delete-link" href="javascript:void(0)">remove</a>"#);
        row.push('\n');
    }
    row.push_str("</div>\n");
    row
}

/// A block-shaped collection with `rows` initial rows and a template.
pub fn block_markup(prefix: &str, rows: usize, max: Option<usize>) -> String {
    let mut out = String::from("<form method=\"post\">\n");
    out.push_str(&counters(prefix, rows, max));
    for index in 0..rows {
        out.push_str(&block_row(prefix, &index.to_string(), "", true));
    }
    out.push_str(&block_row(prefix, "__prefix__", " empty-form", false));
    out.push_str("</form>\n");
    out
}

/// A table-shaped collection: one `<tr>` per row inside a `<tbody>`.
pub fn table_markup(prefix: &str, rows: usize, max: Option<usize>) -> String {
    let row = |slot: &str, class: &str| {
        format!(
            r#"<tr class="{prefix}-form{class}" id="{prefix}-{slot}"><td><input id="id_{prefix}-{slot}-sku" name="{prefix}-{slot}-sku"></td><td><input id="id_{prefix}-{slot}-qty" name="{prefix}-{slot}-qty"></td></tr>
"#
        )
    };
    let mut out = counters(prefix, rows, max);
    out.push_str("<table><tbody id=\"rows\">\n");
    for index in 0..rows {
        out.push_str(&row(&index.to_string(), ""));
    }
    out.push_str(&row("__prefix__", " empty-form"));
    out.push_str("</tbody></table>\n");
    out
}

/// A list-shaped collection: every row is a `<ul>`.
pub fn list_markup(prefix: &str, rows: usize) -> String {
    let row = |slot: &str, class: &str, delete: &str| {
        format!(
            r#"<ul class="{prefix}-form{class}"><li><label for="id_{prefix}-{slot}-city">City</label><input id="id_{prefix}-{slot}-city" name="{prefix}-{slot}-city"></li>{delete}</ul>
"#
        )
    };
    let delete = r#"<li><a class="delete-link" href="javascript:void(0)">remove</a></li>"#;
    let mut out = counters(prefix, rows, None);
    for index in 0..rows {
        out.push_str(&row(&index.to_string(), "", delete));
    }
    out.push_str(&row("__prefix__", " empty-form", ""));
    out
}

pub fn setup(markup: &str, options: FormsetOptions) -> (Document, Formset) {
    setup_with(markup, options, Hooks::new())
}

pub fn setup_with(markup: &str, options: FormsetOptions, hooks: Hooks) -> (Document, Formset) {
    let mut doc = parse_document(markup);
    let formset = Formset::setup(&mut doc, options, hooks)
        .unwrap_or_else(|err| panic!("setup failed: {err}\n{markup}"));
    doc.take_patches();
    (doc, formset)
}

/// Value of the `TOTAL_FORMS` field.
pub fn total_field(doc: &Document, prefix: &str) -> Option<usize> {
    let field = doc.element_by_id(&format!("id_{prefix}-TOTAL_FORMS"))?;
    doc.attr(field, "value")?.parse().ok()
}

/// The delete anchor inside `row`.
pub fn delete_link(doc: &Document, row: Id) -> Id {
    doc.elements_with_classes(row, "delete-link")
        .into_iter()
        .next()
        .unwrap_or_else(|| panic!("row {row} has no delete link"))
}

/// Check that rows are indexed `0..total` and every identifier agrees with
/// its row. Returns a readable report on failure.
pub fn check_consistent(doc: &Document, formset: &Formset) -> Result<(), String> {
    let prefix = formset.prefix();
    let rows = formset.rows(doc);
    let mut report = String::new();
    if rows.len() != formset.total() {
        let _ = writeln!(report, "{} rows but total {}", rows.len(), formset.total());
    }
    if let Some(field) = total_field(doc, prefix)
        && field != formset.total()
    {
        let _ = writeln!(report, "total field {field} but total {}", formset.total());
    }
    for (index, &row) in rows.iter().enumerate() {
        let seen = observed_indices(doc, row, prefix);
        if seen.is_empty() || seen.iter().any(|&i| i != index) {
            let _ = writeln!(report, "row {row} at position {index} carries {seen:?}");
        }
    }
    if report.is_empty() {
        Ok(())
    } else {
        report.push_str(&dom::outline(doc, doc.root()).join("\n"));
        Err(report)
    }
}

pub fn assert_consistent(doc: &Document, formset: &Formset) {
    if let Err(report) = check_consistent(doc, formset) {
        panic!("inconsistent collection:\n{report}");
    }
}
