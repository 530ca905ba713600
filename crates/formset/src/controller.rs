//! The row collection controller.
//!
//! A [`Formset`] owns the state of one collection (its counters, capacity and
//! the handles of its template row and add affordance) and runs every command
//! against a `&mut Document` handed in by the caller. Each command returns an
//! [`Effect`] describing what happened, including the document patches it
//! produced.

use crate::counters::Counters;
use crate::error::{ConfigError, FormsetError};
use crate::gate::{MaxCount, add_allowed};
use crate::options::FormsetOptions;
use crate::rewrite::{fill_element_placeholders, renumber_row};
use crate::shape::{AddAffordance, RowShape, attach_delete_affordance, insert_add_affordance};
use dom::{CloneMode, Document, DomError, DomPatch, Id, Listener};
use std::fmt;

pub type Hook = Box<dyn FnMut(&mut Document, Id)>;

/// Caller callbacks. `added` runs once a new row is fully wired; `removed` runs
/// before the row leaves the document.
#[derive(Default)]
pub struct Hooks {
    added: Option<Hook>,
    removed: Option<Hook>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_added(mut self, hook: impl FnMut(&mut Document, Id) + 'static) -> Self {
        self.added = Some(Box::new(hook));
        self
    }

    pub fn on_removed(mut self, hook: impl FnMut(&mut Document, Id) + 'static) -> Self {
        self.removed = Some(Box::new(hook));
        self
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("added", &self.added.is_some())
            .field("removed", &self.removed.is_some())
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowEvent {
    Added { row: Id, index: usize },
    Removing { row: Id },
}

/// Outcome of one command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Effect {
    pub added: Option<Id>,
    pub removed: Option<Id>,
    /// Rows whose identifiers were rewritten by the renumbering pass.
    pub renumbered: Vec<Id>,
    pub total: usize,
    pub add_visible: bool,
    pub events: Vec<RowEvent>,
    /// Everything journaled by the document since the last drain.
    pub patches: Vec<DomPatch>,
}

impl Effect {
    pub fn changed(&self) -> bool {
        self.added.is_some() || self.removed.is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Add,
    /// Remove the row owning the given node (usually its delete anchor).
    Remove(Id),
}

#[derive(Debug)]
pub struct Formset {
    options: FormsetOptions,
    row_class: String,
    shape: RowShape,
    template: Id,
    add: AddAffordance,
    counters: Counters,
    total: usize,
    max: MaxCount,
    hooks: Hooks,
}

impl Formset {
    /// Take control of the collection named by `options.prefix`.
    ///
    /// Configuration errors are detected before the first mutation, so they
    /// leave the document untouched and nothing bound. The mutations that
    /// follow only touch nodes just found in `doc`; a [`FormsetError::Dom`]
    /// from that phase is not rolled back and leaves the edits made so far
    /// in place (and in the journal). Patches produced by setup stay in the
    /// document journal.
    pub fn setup(
        doc: &mut Document,
        options: FormsetOptions,
        hooks: Hooks,
    ) -> Result<Self, FormsetError> {
        if options.prefix.trim().is_empty() {
            return Err(ConfigError::EmptyPrefix.into());
        }
        let row_class = options.row_css_class();
        let all_rows = doc.elements_with_classes(doc.root(), &row_class);
        let templates: Vec<Id> = all_rows
            .iter()
            .copied()
            .filter(|&row| doc.has_classes(row, &options.empty_css_class))
            .collect();
        let template = match templates.as_slice() {
            [template] => *template,
            [] => {
                return Err(ConfigError::MissingTemplate {
                    prefix: options.prefix.clone(),
                    selector: class_selector(&format!("{row_class} {}", options.empty_css_class)),
                }
                .into());
            }
            many => {
                return Err(ConfigError::DuplicateTemplate {
                    prefix: options.prefix.clone(),
                    count: many.len(),
                }
                .into());
            }
        };
        let counters = Counters::locate(doc, &options.prefix);
        let max = counters.read_max(doc);
        let rows: Vec<Id> = all_rows.iter().copied().filter(|&r| r != template).collect();
        let total = rows.len();

        doc.set_hidden(template, true)?;
        counters.disable_autocomplete(doc)?;
        for &row in &rows {
            doc.add_class(row, &options.form_css_class)?;
        }
        match counters.read_total(doc) {
            Some(recorded) if recorded == total => {}
            recorded => {
                if counters.total_field().is_some() {
                    log::warn!(
                        target: "formset",
                        "{}: total field says {recorded:?} but {total} row(s) are present; using {total}",
                        options.prefix
                    );
                }
                counters.write_total(doc, total)?;
            }
        }

        let shape = RowShape::detect(doc, template);
        let add = insert_add_affordance(doc, shape, &all_rows, &options, total)?;

        let formset = Self {
            options,
            row_class,
            shape,
            template,
            add,
            counters,
            total,
            max,
            hooks,
        };
        doc.bind(add.link, Listener::click(&formset.add_action()))?;
        for row in all_rows {
            formset.bind_delete_links(doc, row)?;
        }
        formset.apply_gate(doc)?;
        formset.refresh_label(doc)?;
        log::debug!(
            target: "formset",
            "{}: ready with {total} row(s), max {max}, {shape:?} rows",
            formset.options.prefix
        );
        Ok(formset)
    }

    pub fn prefix(&self) -> &str {
        &self.options.prefix
    }

    pub fn options(&self) -> &FormsetOptions {
        &self.options
    }

    pub fn shape(&self) -> RowShape {
        self.shape
    }

    pub fn template(&self) -> Id {
        self.template
    }

    pub fn add_affordance(&self) -> AddAffordance {
        self.add
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn max(&self) -> MaxCount {
        self.max
    }

    pub fn add_visible(&self) -> bool {
        add_allowed(self.total, self.max)
    }

    pub fn add_action(&self) -> String {
        format!("{}:add", self.options.prefix)
    }

    pub fn delete_action(&self) -> String {
        format!("{}:delete", self.options.prefix)
    }

    /// Ordinary rows in document order.
    pub fn rows(&self, doc: &Document) -> Vec<Id> {
        doc.elements_with_classes(doc.root(), &self.row_class)
            .into_iter()
            .filter(|&row| row != self.template)
            .collect()
    }

    pub fn apply(&mut self, doc: &mut Document, command: Command) -> Result<Effect, FormsetError> {
        match command {
            Command::Add => self.add(doc),
            Command::Remove(trigger) => self.remove(doc, trigger),
        }
    }

    /// Append a new row cloned from the template.
    ///
    /// Refused without touching the document when the collection is full.
    pub fn add(&mut self, doc: &mut Document) -> Result<Effect, FormsetError> {
        if !self.add_visible() {
            log::debug!(
                target: "formset",
                "{}: add refused at {} of {}",
                self.options.prefix,
                self.total,
                self.max
            );
            return Ok(self.idle_effect(doc));
        }
        let index = self.total;
        let prefix = self.options.prefix.as_str();

        let row = doc.clone_subtree(self.template, CloneMode::WithListeners)?;
        doc.set_hidden(row, false)?;
        doc.remove_class(row, &self.options.empty_css_class)?;
        doc.add_class(row, &self.options.form_css_class)?;
        doc.set_attr(row, "id", &format!("{prefix}-{index}"))?;

        let descendants: Vec<Id> = doc.descendant_elements(row).collect();
        for el in descendants {
            fill_element_placeholders(doc, el, index)?;
        }
        renumber_row(doc, row, prefix, index)?;

        let delete = attach_delete_affordance(doc, self.shape, row, &self.options)?;
        if !self.options.deletion_css_class.trim().is_empty() {
            for el in doc.elements_with_classes(row, &self.options.deletion_css_class) {
                doc.set_hidden(el, true)?;
            }
        }

        let parent = doc
            .parent(self.template)
            .ok_or(DomError::InvalidParent(self.template))?;
        doc.insert_before(parent, row, self.template)?;

        self.total = index + 1;
        self.counters.write_total(doc, self.total)?;
        let add_visible = self.apply_gate(doc)?;
        doc.bind(delete, Listener::click(&self.delete_action()))?;
        self.refresh_label(doc)?;
        log::debug!(target: "formset", "{}: added {row} at index {index}", self.options.prefix);

        if let Some(hook) = self.hooks.added.as_mut() {
            hook(doc, row);
        }
        Ok(Effect {
            added: Some(row),
            total: self.total,
            add_visible,
            events: vec![RowEvent::Added { row, index }],
            patches: doc.take_patches(),
            ..Effect::default()
        })
    }

    /// Remove the row that owns `trigger` and close the gap it leaves.
    ///
    /// A trigger outside every ordinary row of this collection is ignored.
    pub fn remove(&mut self, doc: &mut Document, trigger: Id) -> Result<Effect, FormsetError> {
        let Some(row) = self.owning_row(doc, trigger) else {
            log::debug!(
                target: "formset",
                "{}: {trigger} is not inside a row, nothing to remove",
                self.options.prefix
            );
            return Ok(self.idle_effect(doc));
        };

        if let Some(hook) = self.hooks.removed.as_mut() {
            hook(doc, row);
        }
        if doc.contains(row) {
            doc.remove_subtree(row)?;
        }

        self.total = self.rows(doc).len();
        let renumbered = self.renumber(doc)?;
        self.counters.write_total(doc, self.total)?;
        let add_visible = self.apply_gate(doc)?;
        self.refresh_label(doc)?;
        log::debug!(
            target: "formset",
            "{}: removed {row}, {} row(s) left, {} renumbered",
            self.options.prefix,
            self.total,
            renumbered.len()
        );

        Ok(Effect {
            removed: Some(row),
            renumbered,
            total: self.total,
            add_visible,
            events: vec![RowEvent::Removing { row }],
            patches: doc.take_patches(),
            ..Effect::default()
        })
    }

    /// Give the row at position `i` index `i` everywhere. Returns the rows
    /// whose identifiers changed; a second pass returns nothing.
    pub fn renumber(&self, doc: &mut Document) -> Result<Vec<Id>, DomError> {
        let mut changed = Vec::new();
        for (index, row) in self.rows(doc).into_iter().enumerate() {
            if renumber_row(doc, row, &self.options.prefix, index)? > 0 {
                changed.push(row);
            }
        }
        Ok(changed)
    }

    fn owning_row(&self, doc: &Document, trigger: Id) -> Option<Id> {
        let row = doc.closest(trigger, |d, node| d.has_class(node, &self.row_class))?;
        (row != self.template && doc.is_attached(row)).then_some(row)
    }

    fn bind_delete_links(&self, doc: &mut Document, row: Id) -> Result<(), DomError> {
        let links: Vec<Id> = doc
            .elements_with_classes(row, &self.options.delete_css_class)
            .into_iter()
            .filter(|&el| doc.is_element_named(el, "a"))
            .collect();
        for link in links {
            doc.bind(link, Listener::click(&self.delete_action()))?;
        }
        Ok(())
    }

    fn apply_gate(&self, doc: &mut Document) -> Result<bool, DomError> {
        let visible = self.add_visible();
        doc.set_hidden(self.add.wrapper, !visible)?;
        Ok(visible)
    }

    fn refresh_label(&self, doc: &mut Document) -> Result<(), DomError> {
        let (text, title) = self.options.add_copy(self.total);
        doc.set_text_content(self.add.link, text)?;
        doc.set_attr(self.add.link, "title", title)
    }

    fn idle_effect(&self, doc: &mut Document) -> Effect {
        Effect {
            total: self.total,
            add_visible: self.add_visible(),
            patches: doc.take_patches(),
            ..Effect::default()
        }
    }
}

fn class_selector(classes: &str) -> String {
    classes
        .split_ascii_whitespace()
        .map(|class| format!(".{class}"))
        .collect()
}
