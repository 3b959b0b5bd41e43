//! Translation table validation module.
//!
//! The typed builders already rule out most malformed entries. This module
//! checks what types cannot: that every entry covers exactly the allowed
//! languages, that the base slot is present, and that producers built by
//! hand agree on their argument type. It can also lint literal text for
//! placeholders and links that got lost in translation.

use crate::i18n::{Language, LanguageSet, Translation, TranslationTable};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Validation report containing errors and warnings about a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Problems that break the base-language guarantee
    pub errors: Vec<String>,

    /// Non-critical findings (e.g. languages that will fall back)
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Create a new empty validation report
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Check if the report has any errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check if the report has any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if the report is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }

    /// Append another report's findings.
    #[cfg(test)]
    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for translation tables.
pub struct TableValidator;

// Regex patterns for text linting (cached for performance)
static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();
static URL_REGEX: OnceLock<Regex> = OnceLock::new();

impl TableValidator {
    /// Validate the shape of every entry in `table`.
    ///
    /// Errors:
    /// - the base slot is missing or explicitly absent
    /// - a slot is declared for a language outside the allowed set
    /// - an allowed language has no slot at all
    /// - a producer's argument type differs from the base producer's
    ///
    /// Warnings:
    /// - a non-base slot is explicitly absent and will fall back
    pub fn validate<L, V>(
        languages: &LanguageSet<L>,
        table: &TranslationTable<L, V>,
    ) -> ValidationReport
    where
        L: Language,
        V: 'static,
    {
        let mut report = ValidationReport::new();

        for (key, entry) in table.iter() {
            let base = languages.base();

            // Check the base slot
            if !entry.is_declared(base) {
                report
                    .errors
                    .push(format!("'{}': missing base language {:?}", key, base));
            } else if !entry.is_present(base) {
                report
                    .errors
                    .push(format!("'{}': base language {:?} must not be absent", key, base));
            }

            // Check for undeclared and unknown languages
            for lang in languages.others() {
                if !entry.is_declared(lang) {
                    report
                        .errors
                        .push(format!("'{}': missing language {:?}", key, lang));
                } else if !entry.is_present(lang) {
                    report.warnings.push(format!(
                        "'{}': {:?} is absent and falls back to {:?}",
                        key, lang, base
                    ));
                }
            }
            for lang in entry.declared_languages() {
                if !languages.contains(lang) {
                    report
                        .errors
                        .push(format!("'{}': unknown language {:?}", key, lang));
                }
            }

            // Check producer signatures against the base
            if let Translation::Producer(slots) = entry {
                if let Some(expected) = slots.get(base).map(|producer| producer.signature()) {
                    for (lang, producer) in slots.iter() {
                        let Some(producer) = producer else { continue };
                        if producer.signature() != expected {
                            report.errors.push(format!(
                                "'{}': {:?} producer takes {} but base takes {}",
                                key,
                                lang,
                                producer.signature().name(),
                                expected.name()
                            ));
                        }
                    }
                }
            }
        }

        report
    }

    /// Lint literal text entries against their base value.
    ///
    /// Warns when a translation drops or renames `{placeholder}` names, or
    /// carries a different number of URLs than the base text.
    pub fn lint_text<L, V>(
        languages: &LanguageSet<L>,
        table: &TranslationTable<L, V>,
    ) -> ValidationReport
    where
        L: Language,
        V: AsRef<str> + 'static,
    {
        let mut report = ValidationReport::new();

        for (key, entry) in table.iter() {
            let Translation::Literal(slots) = entry else { continue };
            let Some(base_text) = slots.get(languages.base()) else { continue };
            let base_text = base_text.as_ref();

            let base_placeholders = Self::extract_placeholders(base_text);
            let base_urls = Self::extract_urls(base_text);

            for lang in languages.others() {
                let Some(text) = slots.get(lang) else { continue };
                let text = text.as_ref();

                let placeholders = Self::extract_placeholders(text);
                if placeholders != base_placeholders {
                    report.warnings.push(format!(
                        "'{}': placeholder mismatch for {:?}: base has {:?}, translation has {:?}",
                        key, lang, base_placeholders, placeholders
                    ));
                }

                let urls = Self::extract_urls(text);
                if urls.len() != base_urls.len() {
                    report.warnings.push(format!(
                        "'{}': URL mismatch for {:?}: base has {} URLs, translation has {} URLs",
                        key,
                        lang,
                        base_urls.len(),
                        urls.len()
                    ));
                }
            }
        }

        report
    }

    /// Extract the distinct `{name}` placeholders from text
    fn extract_placeholders(text: &str) -> BTreeSet<String> {
        let regex = PLACEHOLDER_REGEX
            .get_or_init(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

        regex
            .captures_iter(text)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
            .collect()
    }

    /// Extract all URLs from text
    fn extract_urls(text: &str) -> Vec<String> {
        let regex = URL_REGEX.get_or_init(|| Regex::new(r"https?://[^\s)\]]+").unwrap());

        regex
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}
