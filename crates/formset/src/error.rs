use dom::DomError;
use std::fmt;

/// Setup-time failures. A controller is never returned half-built: when one of
/// these is reported, no listener has been attached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    EmptyPrefix,
    MissingTemplate { prefix: String, selector: String },
    DuplicateTemplate { prefix: String, count: usize },
    DuplicatePrefix(String),
    Options(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyPrefix => f.write_str("formset prefix must not be empty"),
            ConfigError::MissingTemplate { prefix, selector } => write!(
                f,
                "cannot find the template row for formset '{prefix}' (expected an element matching {selector})"
            ),
            ConfigError::DuplicateTemplate { prefix, count } => write!(
                f,
                "formset '{prefix}' has {count} template rows, exactly one is required"
            ),
            ConfigError::DuplicatePrefix(prefix) => {
                write!(f, "a formset with prefix '{prefix}' is already registered")
            }
            ConfigError::Options(msg) => write!(f, "invalid formset options: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormsetError {
    Config(ConfigError),
    Dom(DomError),
}

impl fmt::Display for FormsetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormsetError::Config(err) => err.fmt(f),
            FormsetError::Dom(err) => write!(f, "document error: {err}"),
        }
    }
}

impl std::error::Error for FormsetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormsetError::Config(err) => Some(err),
            FormsetError::Dom(err) => Some(err),
        }
    }
}

impl From<ConfigError> for FormsetError {
    fn from(err: ConfigError) -> Self {
        FormsetError::Config(err)
    }
}

impl From<DomError> for FormsetError {
    fn from(err: DomError) -> Self {
        FormsetError::Dom(err)
    }
}
