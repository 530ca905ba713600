//! Structured model of row-scoped identifiers.
//!
//! Attribute strings such as `id_items-3-sku`, `items-3-sku` or
//! `id_items-__prefix__-sku` are parsed into a [`RowIdent`]: the text before the
//! prefix (`lead`), the collection prefix, the row slot and whatever follows
//! (`tail`). Logic works on the parsed form; strings are only produced again by
//! [`RowIdent::render`].
//!
//! A prefix occurrence only counts when it starts the value, follows a byte
//! that is not `[A-Za-z0-9_]`, or follows an `id_` lead that itself starts the
//! value or a segment (`initial-id_items-0-sku`). This keeps a collection named
//! `items` from claiming `line_items-0-sku`.

use std::fmt;

/// Literal token carried by template-row identifiers in place of an index.
pub const PLACEHOLDER: &str = "__prefix__";

/// Attributes that carry index-bearing identifiers.
pub const IDENT_ATTRS: [&str; 3] = ["id", "name", "for"];

const ID_LEAD: &str = "id_";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    Index(usize),
    Placeholder,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Index(index) => write!(f, "{index}"),
            Slot::Placeholder => f.write_str(PLACEHOLDER),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowIdent<'a> {
    pub lead: &'a str,
    pub prefix: &'a str,
    pub slot: Slot,
    pub tail: &'a str,
}

impl<'a> RowIdent<'a> {
    /// Parse the first prefix-scoped slot in `raw`.
    pub fn parse(raw: &'a str, prefix: &'a str) -> Option<Self> {
        if prefix.is_empty() {
            return None;
        }
        let step = prefix.chars().next().map_or(1, char::len_utf8);
        let mut from = 0;
        while let Some(rel) = raw[from..].find(prefix) {
            let start = from + rel;
            from = start + step;
            if !at_boundary(raw, start) {
                continue;
            }
            let Some(after) = raw[start + prefix.len()..].strip_prefix('-') else {
                continue;
            };
            let Some((slot, rest)) = parse_slot(after) else {
                continue;
            };
            return Some(RowIdent {
                lead: &raw[..start],
                prefix: &raw[start..start + prefix.len()],
                slot,
                tail: rest,
            });
        }
        None
    }

    pub fn index(&self) -> Option<usize> {
        match self.slot {
            Slot::Index(index) => Some(index),
            Slot::Placeholder => None,
        }
    }

    pub fn with_index(self, index: usize) -> Self {
        Self {
            slot: Slot::Index(index),
            ..self
        }
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RowIdent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}-{}{}", self.lead, self.prefix, self.slot, self.tail)
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn at_boundary(raw: &str, start: usize) -> bool {
    if start == 0 {
        return true;
    }
    let lead = &raw[..start];
    if let Some(before) = lead.strip_suffix(ID_LEAD) {
        return before.bytes().last().is_none_or(|b| !is_word_byte(b));
    }
    !is_word_byte(raw.as_bytes()[start - 1])
}

fn parse_slot(after: &str) -> Option<(Slot, &str)> {
    if let Some(rest) = after.strip_prefix(PLACEHOLDER) {
        return Some((Slot::Placeholder, rest));
    }
    let digits = after.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    // A run too long for usize reads as usize::MAX; rewriting replaces the
    // whole run either way.
    let index = after[..digits].parse().unwrap_or(usize::MAX);
    Some((Slot::Index(index), &after[digits..]))
}

/// Rewrite the numeric slot of the first prefix-scoped identifier in `raw` to
/// `index`. Returns `None` when nothing would change: no numeric slot for this
/// prefix, or it already holds `index`.
pub fn reindex(raw: &str, prefix: &str, index: usize) -> Option<String> {
    let ident = RowIdent::parse(raw, prefix)?;
    match ident.slot {
        Slot::Index(current) if current != index => Some(ident.with_index(index).render()),
        _ => None,
    }
}

/// Replace every placeholder token in `raw` with `index`, regardless of prefix.
pub fn fill_placeholder(raw: &str, index: usize) -> Option<String> {
    raw.contains(PLACEHOLDER)
        .then(|| raw.replace(PLACEHOLDER, &index.to_string()))
}
