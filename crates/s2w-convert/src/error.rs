//! Conversion-specific error types.

use thiserror::Error;

/// Errors that can occur while compiling a rule into Wazuh output.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// A compiled alternation failed to build as a regex.
    #[error("invalid pattern: {0}")]
    InvalidRegex(#[from] regex::Error),

    /// A field in a selection has no value alternatives to match.
    #[error("selection '{selection}' field '{field}' has no values")]
    EmptyValues { selection: String, field: String },

    /// A detection key reduced to an empty field name after modifier stripping.
    #[error("selection '{selection}' contains an empty field name")]
    EmptyFieldName { selection: String },

    /// A selection has no field entries at all.
    #[error("selection '{0}' is empty")]
    EmptySelection(String),

    /// A condition reference did not resolve to a loaded selection.
    #[error("condition references undefined selection '{0}'")]
    UnknownSelection(String),

    /// A loader error propagated during conversion.
    #[error("load error: {0}")]
    Load(#[from] s2w_parser::LoadError),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ConvertError>;
