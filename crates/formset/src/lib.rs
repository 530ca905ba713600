//! Dynamic row collections ("formsets") over a [`dom::Document`].
//!
//! A collection is a run of structurally identical rows sharing the class
//! `<prefix>-form`, plus one hidden template row whose identifiers carry the
//! `__prefix__` placeholder. [`Formset`] keeps the rows indexed `0..total`
//! without gaps as rows are added from the template or removed, keeps the
//! `TOTAL_FORMS` counter field in step, and shows the add affordance only while
//! the `MAX_NUM_FORMS` limit allows another row.
//!
//! ```
//! use dom::parse_document;
//! use formset::{Formset, FormsetOptions, Hooks};
//!
//! let mut doc = parse_document(
//!     r#"<input id="id_item-TOTAL_FORMS" value="0">
//!        <div class="item-form empty-form"><input name="item-__prefix__-qty"></div>"#,
//! );
//! let mut items = Formset::setup(&mut doc, FormsetOptions::with_prefix("item"), Hooks::new())?;
//! let effect = items.add(&mut doc)?;
//! assert_eq!(effect.total, 1);
//! assert_eq!(items.rows(&doc).len(), 1);
//! # Ok::<(), formset::FormsetError>(())
//! ```

mod controller;
mod counters;
mod error;
mod gate;
mod ident;
mod options;
mod page;
mod rewrite;
mod shape;

pub use crate::controller::{Command, Effect, Formset, Hook, Hooks, RowEvent};
pub use crate::counters::Counters;
pub use crate::error::{ConfigError, FormsetError};
pub use crate::gate::{MaxCount, add_allowed};
pub use crate::ident::{IDENT_ATTRS, PLACEHOLDER, RowIdent, Slot, fill_placeholder, reindex};
pub use crate::options::FormsetOptions;
pub use crate::page::Page;
pub use crate::rewrite::{
    FIELD_ELEMENTS, field_elements, fill_element_placeholders, is_field_element, observed_indices,
    renumber_row, rewrite_element,
};
pub use crate::shape::{
    AddAffordance, RowShape, add_affordance_id, attach_delete_affordance, insert_add_affordance,
};
