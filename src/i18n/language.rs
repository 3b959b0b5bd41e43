//! Language identifiers.
//!
//! Any `Clone + Eq + Debug` type can serve as a language identifier. Code that
//! knows its languages up front should use its own `enum`, which makes an
//! out-of-set language impossible to name. Code that reads languages from
//! configuration uses [`LanguageCode`], a validated string tag.

use crate::i18n::{Result, TranslationError};
use regex::Regex;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Marker for types usable as a language identifier.
pub trait Language: Clone + Eq + fmt::Debug + 'static {}

impl<T> Language for T where T: Clone + Eq + fmt::Debug + 'static {}

// Primary subtag of 2-3 lowercase letters, then optional region/script subtags
static CODE_REGEX: OnceLock<Regex> = OnceLock::new();

fn code_regex() -> &'static Regex {
    CODE_REGEX.get_or_init(|| Regex::new(r"^[a-z]{2,3}(?:-[A-Za-z0-9]{2,8})*$").unwrap())
}

/// A validated language code (e.g. "en", "fi", "pt-BR").
///
/// Cloning is cheap; the code is shared behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LanguageCode {
    code: Arc<str>,
}

impl LanguageCode {
    /// Create a LanguageCode from a code string.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Returns
    /// * `Ok(LanguageCode)` if the code has the shape of a language tag
    /// * `Err(TranslationError::InvalidLanguageCode)` otherwise
    ///
    /// # Example
    /// ```
    /// use switchable_translations::i18n::LanguageCode;
    ///
    /// let finnish = LanguageCode::parse("fi").unwrap();
    /// assert_eq!(finnish.code(), "fi");
    /// assert!(LanguageCode::parse("Finnish").is_err());
    /// ```
    pub fn parse(code: &str) -> Result<LanguageCode> {
        let code = code.trim();
        if !code_regex().is_match(code) {
            return Err(TranslationError::InvalidLanguageCode(code.to_string()));
        }

        Ok(LanguageCode { code: code.into() })
    }

    /// Get the language code as a string slice.
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

impl std::str::FromStr for LanguageCode {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self> {
        LanguageCode::parse(s)
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        self.code()
    }
}

impl serde::Serialize for LanguageCode {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.code())
    }
}
