use thiserror::Error;

/// Errors that can occur while loading a Sigma rule document.
///
/// All variants are fatal to the document being loaded, never to a batch:
/// the CLI isolates failures per document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("condition parse error: {0}")]
    Condition(String),

    #[error("unsupported condition expression (mixed 'and'/'or' without grouping): {0}")]
    UnsupportedExpression(String),

    #[error("condition references undefined selection '{0}'")]
    UnknownSelection(String),

    #[error("missing required field '{0}'")]
    MissingField(String),

    #[error("invalid rule: {0}")]
    InvalidRule(String),

    #[error("invalid value for '{0}': {1}")]
    InvalidValue(String, String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LoadError>;
