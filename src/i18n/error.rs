//! Error types for the translation store.

use crate::i18n::ValidationReport;
use thiserror::Error;

/// Errors raised by the translation store and resolver.
///
/// Resolution itself never fails; these come from construction, strict table
/// registration, and typed lookups on a resolved table.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslationError {
    /// The language set handed to a store or factory is unusable
    #[error("Invalid language configuration: {0}")]
    Configuration(String),

    /// A language code does not look like a language tag
    #[error("Invalid language code: '{0}'")]
    InvalidLanguageCode(String),

    /// A table failed runtime validation
    #[error("Translation table is invalid: {}", .0.errors.join("; "))]
    InvalidTable(ValidationReport),

    /// Lookup of a key that is not in the resolved table
    #[error("Unknown translation key: '{0}'")]
    UnknownKey(String),

    /// The key resolved to a literal but was called like a producer
    #[error("Translation '{0}' is not a producer")]
    NotAProducer(String),

    /// The key resolved to a producer but was read like a literal
    #[error("Translation '{0}' is a producer and must be called with arguments")]
    NotALiteral(String),

    /// A producer was invoked with the wrong argument type
    #[error("Producer expects arguments of type {expected}, got {found}")]
    SignatureMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

/// Result alias for translation store operations.
pub type Result<T> = std::result::Result<T, TranslationError>;
