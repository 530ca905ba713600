use crate::document::Document;
use crate::tokenizer::tokenize;
use crate::types::{Attribute, Id, Token};
use std::sync::Arc;

/// Parse markup into a fresh [`Document`].
///
/// The tree builder keeps a stack of open elements. An end tag closes the nearest
/// open element with the same name and everything opened after it; an end tag with
/// no matching open element is ignored. The returned document has an empty patch
/// journal: parsing establishes the baseline, it is not a change.
pub fn parse_document(markup: &str) -> Document {
    let mut doc = Document::new();
    let root = doc.root();
    let mut open: Vec<(Id, String)> = Vec::new();

    for token in tokenize(markup) {
        let parent = open.last().map(|(id, _)| *id).unwrap_or(root);
        match token {
            Token::Doctype(doctype) => doc.set_doctype(doctype),
            Token::Comment(text) => {
                let id = doc.create_comment(&text);
                doc.attach_unchecked(parent, id);
            }
            Token::Text(text) => {
                let id = doc.create_text(&text);
                doc.attach_unchecked(parent, id);
            }
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let attributes: Vec<Attribute> = attributes
                    .into_iter()
                    .map(|(k, v)| (Arc::from(k), v))
                    .collect();
                let id = doc.create_element(&name, attributes);
                doc.attach_unchecked(parent, id);
                if !self_closing {
                    open.push((id, name));
                }
            }
            Token::EndTag(name) => {
                if let Some(pos) = open.iter().rposition(|(_, open_name)| *open_name == name) {
                    open.truncate(pos);
                }
            }
        }
    }

    doc.take_patches();
    doc
}
