//! Language set: the allowed languages of a store and its base language.
//!
//! A `LanguageSet` is fixed once constructed. Every store, resolver and
//! validator built on it agrees on which languages exist and which one is the
//! universal fallback.

use crate::i18n::{Language, LanguageCode, Result, TranslationError};

/// The allowed languages plus the distinguished base language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSet<L> {
    /// Allowed languages in declaration order
    languages: Vec<L>,

    /// Fallback target; always a member of `languages`
    base: L,
}

impl<L: Language> LanguageSet<L> {
    /// Create a language set.
    ///
    /// # Arguments
    /// * `base` - The base language; must be one of `allowed`
    /// * `allowed` - Every language the store may be switched to
    ///
    /// # Returns
    /// * `Err(TranslationError::Configuration)` if `allowed` is empty, has
    ///   duplicates, or does not contain `base`
    pub fn new(base: L, allowed: impl IntoIterator<Item = L>) -> Result<Self> {
        let mut languages: Vec<L> = Vec::new();
        for lang in allowed {
            if languages.contains(&lang) {
                return Err(TranslationError::Configuration(format!(
                    "language {:?} is listed more than once",
                    lang
                )));
            }
            languages.push(lang);
        }

        if languages.is_empty() {
            return Err(TranslationError::Configuration(
                "at least one language must be allowed".to_string(),
            ));
        }

        if !languages.contains(&base) {
            return Err(TranslationError::Configuration(format!(
                "base language {:?} is not one of the allowed languages {:?}",
                base, languages
            )));
        }

        Ok(Self { languages, base })
    }

    /// The base language.
    pub fn base(&self) -> &L {
        &self.base
    }

    /// Check whether `lang` is the base language.
    pub fn is_base(&self, lang: &L) -> bool {
        &self.base == lang
    }

    /// Check whether `lang` is one of the allowed languages.
    pub fn contains(&self, lang: &L) -> bool {
        self.languages.contains(lang)
    }

    /// All allowed languages, base included, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &L> {
        self.languages.iter()
    }

    /// All allowed languages except the base.
    pub fn others(&self) -> impl Iterator<Item = &L> {
        self.languages.iter().filter(move |lang| !self.is_base(lang))
    }

    /// Number of allowed languages.
    pub fn len(&self) -> usize {
        self.languages.len()
    }

    /// Always false for a constructed set; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

impl LanguageSet<LanguageCode> {
    /// Build a set from string codes, validating each one.
    ///
    /// # Example
    /// ```
    /// use switchable_translations::i18n::LanguageSet;
    ///
    /// let set = LanguageSet::from_codes("fi", ["fi", "en"]).unwrap();
    /// assert_eq!(set.base().code(), "fi");
    /// assert!(LanguageSet::from_codes("de", ["fi", "en"]).is_err());
    /// ```
    pub fn from_codes<'a>(base: &str, codes: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let base = LanguageCode::parse(base)?;
        let languages = codes
            .into_iter()
            .map(LanguageCode::parse)
            .collect::<Result<Vec<_>>>()?;

        Self::new(base, languages)
    }

    /// Look up an allowed language by its code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageCode> {
        self.languages.iter().find(|lang| lang.code() == code.trim())
    }
}
