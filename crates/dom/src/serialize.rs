use crate::document::Document;
use crate::entities::{escape_attr, escape_text};
use crate::tokenizer::is_void_element;
use crate::types::Id;
use std::fmt::Write;

/// Render the document back to markup.
///
/// Attribute order is preserved, valueless attributes are written bare and void
/// elements get no end tag. Text inside `script`/`style` is written raw.
pub fn to_html(doc: &Document) -> String {
    let mut out = String::new();
    if let Some(doctype) = doc.doctype() {
        let _ = write!(out, "<!{doctype}>");
    }
    for &child in doc.children(doc.root()) {
        write_node(doc, child, false, &mut out);
    }
    out
}

/// Render one subtree (the node itself included).
pub fn node_to_html(doc: &Document, id: Id) -> String {
    let mut out = String::new();
    write_node(doc, id, false, &mut out);
    out
}

fn write_node(doc: &Document, id: Id, raw_text: bool, out: &mut String) {
    if let Some(text) = doc.text_of(id) {
        if raw_text {
            out.push_str(text);
        } else {
            escape_text(text, out);
        }
        return;
    }
    if let Some(text) = doc.comment_of(id) {
        let _ = write!(out, "<!--{text}-->");
        return;
    }
    let Some(name) = doc.element_name(id) else {
        return;
    };

    out.push('<');
    out.push_str(name);
    for (key, value) in doc.attributes(id) {
        out.push(' ');
        out.push_str(key);
        if let Some(value) = value {
            out.push_str("=\"");
            escape_attr(value, out);
            out.push('"');
        }
    }
    out.push('>');

    if is_void_element(name) {
        return;
    }
    let raw = name == "script" || name == "style";
    for &child in doc.children(id) {
        write_node(doc, child, raw, out);
    }
    let _ = write!(out, "</{name}>");
}

/// Indented one-line-per-element outline for logs and test failure output.
pub fn outline(doc: &Document, id: Id) -> Vec<String> {
    fn walk(doc: &Document, id: Id, depth: usize, out: &mut Vec<String>) {
        let indent = "  ".repeat(depth);
        if let Some(name) = doc.element_name(id) {
            let mut line = format!("{indent}<{name}");
            for key in ["id", "name", "for", "class"] {
                if let Some(value) = doc.attr(id, key) {
                    let _ = write!(line, r#" {key}="{value}""#);
                }
            }
            if doc.is_hidden(id) {
                line.push_str(" hidden");
            }
            line.push('>');
            out.push(line);
            for &child in doc.children(id) {
                walk(doc, child, depth + 1, out);
            }
        } else if let Some(text) = doc.text_of(id) {
            let text = text.trim();
            if !text.is_empty() {
                out.push(format!("{indent}\"{text}\""));
            }
        } else if id == doc.root() {
            out.push("#document".to_string());
            for &child in doc.children(id) {
                walk(doc, child, depth + 1, out);
            }
        }
    }
    let mut out = Vec::new();
    walk(doc, id, 0, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_document;

    #[test]
    fn renders_parsed_markup_faithfully() {
        let src = r#"<!DOCTYPE html><div class="a" hidden><input name="x-0" disabled><label for="id_x-0">A &amp; B</label><!-- c --></div>"#;
        let doc = parse_document(src);
        assert_eq!(to_html(&doc), src);
    }

    #[test]
    fn escapes_attribute_quotes() {
        let mut doc = Document::new();
        let el = doc.create_element("a", Vec::new());
        doc.set_attr(el, "title", r#"say "hi""#).unwrap();
        assert_eq!(node_to_html(&doc, el), r#"<a title="say &quot;hi&quot;"></a>"#);
    }

    #[test]
    fn outline_lists_identifying_attributes() {
        let doc = parse_document(r#"<div id="r" class="row" hidden><input name="n"> text </div>"#);
        let lines = outline(&doc, doc.root());
        assert_eq!(
            lines,
            [
                "#document",
                r#"  <div id="r" class="row" hidden>"#,
                r#"    <input name="n">"#,
                r#"    "text""#,
            ]
        );
    }
}
