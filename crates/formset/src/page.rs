use crate::controller::{Command, Effect, Formset, Hooks};
use crate::error::{ConfigError, FormsetError};
use crate::options::FormsetOptions;
use dom::{Document, Id};

/// Binding layer between document events and controllers.
///
/// Affordances are bound with `<prefix>:add` / `<prefix>:delete` actions; a
/// click is resolved through the document's listener registry and routed to
/// the controller owning that prefix.
#[derive(Debug, Default)]
pub struct Page {
    formsets: Vec<Formset>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set up a controller and register it. The prefix must not already be
    /// taken on this page; that check runs before the document is touched.
    pub fn setup(
        &mut self,
        doc: &mut Document,
        options: FormsetOptions,
        hooks: Hooks,
    ) -> Result<&mut Formset, FormsetError> {
        if self.get(&options.prefix).is_some() {
            return Err(ConfigError::DuplicatePrefix(options.prefix).into());
        }
        let formset = Formset::setup(doc, options, hooks)?;
        self.formsets.push(formset);
        let last = self.formsets.len() - 1;
        Ok(&mut self.formsets[last])
    }

    pub fn register(&mut self, formset: Formset) -> Result<(), ConfigError> {
        if self.get(formset.prefix()).is_some() {
            return Err(ConfigError::DuplicatePrefix(formset.prefix().to_string()));
        }
        self.formsets.push(formset);
        Ok(())
    }

    pub fn get(&self, prefix: &str) -> Option<&Formset> {
        self.formsets.iter().find(|f| f.prefix() == prefix)
    }

    pub fn get_mut(&mut self, prefix: &str) -> Option<&mut Formset> {
        self.formsets.iter_mut().find(|f| f.prefix() == prefix)
    }

    pub fn formsets(&self) -> &[Formset] {
        &self.formsets
    }

    /// Deliver a click on `target`. The nearest bound action that names a
    /// registered controller handles it; `None` means nothing was listening.
    pub fn click(
        &mut self,
        doc: &mut Document,
        target: Id,
    ) -> Result<Option<Effect>, FormsetError> {
        for (bound, action) in doc.dispatch(target, "click") {
            let Some((prefix, verb)) = action.rsplit_once(':') else {
                continue;
            };
            let command = match verb {
                "add" => Command::Add,
                "delete" => Command::Remove(bound),
                _ => continue,
            };
            let Some(formset) = self.get_mut(prefix) else {
                log::debug!(target: "formset", "click on {target}: no formset for {action}");
                continue;
            };
            log::debug!(target: "formset", "click on {target} -> {command:?} for {prefix}");
            return formset.apply(doc, command).map(Some);
        }
        Ok(None)
    }
}
