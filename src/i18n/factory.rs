//! Translations factory: the bundle a view layer consumes.
//!
//! A factory owns one [`LanguageStore`] and hands out [`Translator`]s. Each
//! translator is one consumer of the resolved translations: it reads the
//! current language through a [`LanguageBinding`] and memoizes the resolved
//! table on (active language, base language, table pointer).

use crate::i18n::memo::{ByRef, Memo};
use crate::i18n::{
    resolve, Language, LanguageBinding, LanguageSet, LanguageStore, ResolutionMetrics,
    ResolvedTable, Result, Subscription, TableValidator, TranslationError, TranslationTable,
};
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;
use tracing::{debug, error, info, warn};

/// Language store plus resolution entry points for one value type `V`.
pub struct TranslationsFactory<L, V> {
    store: LanguageStore<L>,
    _value: PhantomData<fn() -> V>,
}

impl<L: Language, V: Clone + 'static> TranslationsFactory<L, V> {
    /// Create a factory over a validated language set.
    pub fn new(languages: LanguageSet<L>) -> Self {
        Self {
            store: LanguageStore::with_metrics(languages, Rc::new(ResolutionMetrics::new())),
            _value: PhantomData,
        }
    }

    /// Create a factory from a base language and the allowed set.
    ///
    /// # Returns
    /// * `Err(TranslationError::Configuration)` if `base` is not allowed
    ///
    /// # Example
    /// ```
    /// use switchable_translations::i18n::{Translation, TranslationTable, TranslationsFactory};
    /// use std::rc::Rc;
    ///
    /// let i18n: TranslationsFactory<&str, String> =
    ///     TranslationsFactory::create("fi", ["fi", "en"]).unwrap();
    /// let table = Rc::new(TranslationTable::new().with(
    ///     "title",
    ///     Translation::text().with("fi", "Otsikko").with("en", "Title").build(),
    /// ));
    ///
    /// let translator = i18n.use_translations(|| {});
    /// assert_eq!(translator.translations(&table).text("title").unwrap(), "Otsikko");
    ///
    /// i18n.set_language("en");
    /// assert_eq!(translator.translations(&table).text("title").unwrap(), "Title");
    /// ```
    pub fn create(base: L, allowed: impl IntoIterator<Item = L>) -> Result<Self> {
        Ok(Self::new(LanguageSet::new(base, allowed)?))
    }

    /// The current language.
    pub fn language(&self) -> L {
        self.store.language()
    }

    /// Set the current language and notify every subscriber.
    pub fn set_language(&self, lang: L) {
        self.store.set_language(lang);
    }

    pub fn subscribe(&self, callback: impl Fn() + 'static) -> Subscription {
        self.store.subscribe(callback)
    }

    /// See [`LanguageStore::use_language`].
    pub fn use_language(&self, invalidate: impl Fn() + 'static) -> LanguageBinding<L> {
        self.store.use_language(invalidate)
    }

    /// Create a consumer of resolved translations.
    ///
    /// `invalidate` runs whenever the language is set, so the host can
    /// re-render the consumer.
    pub fn use_translations(&self, invalidate: impl Fn() + 'static) -> Translator<L, V> {
        Translator {
            binding: self.store.use_language(invalidate),
            memo: Memo::new(),
        }
    }

    /// Validate a table and share it for resolution.
    ///
    /// Warnings are logged; any error rejects the table.
    ///
    /// # Returns
    /// * `Err(TranslationError::InvalidTable)` carrying the full report
    pub fn register(&self, table: TranslationTable<L, V>) -> Result<Rc<TranslationTable<L, V>>> {
        let report = TableValidator::validate(self.store.languages(), &table);

        for warning in &report.warnings {
            warn!("{}", warning);
        }

        if report.has_errors() {
            error!(errors = report.errors.len(), "Rejecting translation table");
            return Err(TranslationError::InvalidTable(report));
        }

        info!(entries = table.len(), "Registered translation table");
        Ok(Rc::new(table))
    }

    /// Resolve `table` for the current language without memoization.
    pub fn resolve_now(&self, table: &TranslationTable<L, V>) -> ResolvedTable<V> {
        resolve(self.store.languages(), &self.store.language(), table)
    }

    pub fn store(&self) -> &LanguageStore<L> {
        &self.store
    }

    pub fn languages(&self) -> &LanguageSet<L> {
        self.store.languages()
    }

    pub fn metrics(&self) -> &ResolutionMetrics {
        self.store.metrics()
    }
}

impl<L: Language, V> fmt::Debug for TranslationsFactory<L, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationsFactory")
            .field("store", &self.store)
            .finish()
    }
}

type MemoKey<L, V> = (L, L, ByRef<TranslationTable<L, V>>);

/// One consumer of resolved translations.
///
/// Unsubscribes from the store when dropped.
pub struct Translator<L, V> {
    binding: LanguageBinding<L>,
    memo: Memo<MemoKey<L, V>, Rc<ResolvedTable<V>>>,
}

impl<L: Language, V: Clone + 'static> Translator<L, V> {
    /// Resolved translations for the current language.
    ///
    /// Returns the cached table while the language and the table pointer are
    /// unchanged; setting the same language again is still a cache hit.
    pub fn translations(&self, table: &Rc<TranslationTable<L, V>>) -> Rc<ResolvedTable<V>> {
        let store = self.binding.store();
        let active = self.binding.language();
        let deps = (
            active.clone(),
            store.languages().base().clone(),
            ByRef(Rc::clone(table)),
        );

        let (resolved, hit) = self
            .memo
            .get_or_compute(deps, || Rc::new(resolve(store.languages(), &active, table)));

        if hit {
            store.metrics().record_cache_hit();
        } else {
            store.metrics().record_cache_miss();
            debug!(language = ?active, "Translation cache miss");
        }

        resolved
    }

    /// Check whether the language was set since the last `translations` call.
    pub fn is_stale(&self) -> bool {
        self.binding.is_stale()
    }

    /// The current language. Does not clear staleness.
    pub fn language(&self) -> L {
        self.binding.store().language()
    }
}

impl<L: Language, V> fmt::Debug for Translator<L, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("binding", &self.binding)
            .field("memo", &self.memo)
            .finish()
    }
}
