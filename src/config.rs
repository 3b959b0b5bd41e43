use crate::i18n::{LanguageCode, LanguageSet};
use anyhow::{bail, Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    // Languages
    pub base_language: String,
    pub languages: Vec<String>,
    pub initial_language: Option<String>,

    // Validation
    pub strict: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let base_language = std::env::var("TRANSLATIONS_BASE_LANGUAGE")
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|_| "en".to_string());

        // The base language is always allowed, even when not listed
        let mut languages: Vec<String> = std::env::var("TRANSLATIONS_LANGUAGES")
            .map(|v| {
                v.split(',')
                    .map(|code| code.trim().to_string())
                    .filter(|code| !code.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        if !languages.contains(&base_language) {
            languages.insert(0, base_language.clone());
        }

        Ok(Self {
            base_language,
            languages,
            initial_language: std::env::var("TRANSLATIONS_INITIAL_LANGUAGE")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            strict: std::env::var("TRANSLATIONS_STRICT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        })
    }

    /// Build the language set described by this configuration.
    pub fn language_set(&self) -> Result<LanguageSet<LanguageCode>> {
        LanguageSet::from_codes(
            &self.base_language,
            self.languages.iter().map(String::as_str),
        )
        .context("Invalid TRANSLATIONS_BASE_LANGUAGE / TRANSLATIONS_LANGUAGES")
    }

    /// The language to switch to at startup, if configured.
    pub fn initial_language(
        &self,
        languages: &LanguageSet<LanguageCode>,
    ) -> Result<Option<LanguageCode>> {
        let Some(code) = &self.initial_language else {
            return Ok(None);
        };

        match languages.get_by_code(code) {
            Some(lang) => Ok(Some(lang.clone())),
            None => bail!(
                "TRANSLATIONS_INITIAL_LANGUAGE '{}' is not one of {:?}",
                code,
                self.languages
            ),
        }
    }
}
