use crate::error::ConfigError;
use serde::Deserialize;

/// Construction-time options for one row collection.
///
/// Every field has a default, so a TOML table only needs the keys it changes.
/// The camelCase spellings used by page scripts are accepted as aliases.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormsetOptions {
    pub prefix: String,
    #[serde(alias = "addText")]
    pub add_text: String,
    #[serde(alias = "addTitle")]
    pub add_title: String,
    #[serde(alias = "addTextInitial")]
    pub add_text_initial: Option<String>,
    #[serde(alias = "addTitleInitial")]
    pub add_title_initial: Option<String>,
    #[serde(alias = "deleteText")]
    pub delete_text: String,
    #[serde(alias = "addCssClass")]
    pub add_css_class: String,
    #[serde(alias = "deleteCssClass")]
    pub delete_css_class: String,
    #[serde(alias = "emptyCssClass")]
    pub empty_css_class: String,
    #[serde(alias = "formCssClass")]
    pub form_css_class: String,
    /// Content shown only for rows marked for deletion; hidden in new rows.
    #[serde(alias = "deletionCssClass")]
    pub deletion_css_class: String,
}

impl Default for FormsetOptions {
    fn default() -> Self {
        Self {
            prefix: "form".to_string(),
            add_text: "add another".to_string(),
            add_title: "click here to add another".to_string(),
            add_text_initial: None,
            add_title_initial: None,
            delete_text: "remove".to_string(),
            add_css_class: "add-link".to_string(),
            delete_css_class: "delete-link".to_string(),
            empty_css_class: "empty-form".to_string(),
            form_css_class: "dynamic-form".to_string(),
            deletion_css_class: "field DELETE".to_string(),
        }
    }
}

impl FormsetOptions {
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        toml::from_str(input).map_err(|err| ConfigError::Options(err.to_string()))
    }

    /// Class shared by every row of this collection, template included.
    pub fn row_css_class(&self) -> String {
        format!("{}-form", self.prefix)
    }

    /// Label and tooltip for the add affordance at the given row count.
    ///
    /// The initial variants apply only at zero rows and only when configured
    /// with non-empty text.
    pub fn add_copy(&self, total: usize) -> (&str, &str) {
        (
            initial_or(self.add_text_initial.as_deref(), &self.add_text, total),
            initial_or(self.add_title_initial.as_deref(), &self.add_title, total),
        )
    }
}

fn initial_or<'a>(initial: Option<&'a str>, standard: &'a str, total: usize) -> &'a str {
    match initial {
        Some(value) if total == 0 && !value.is_empty() => value,
        _ => standard,
    }
}
