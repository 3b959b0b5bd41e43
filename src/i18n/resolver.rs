//! Translation resolution: flatten a table for one active language.
//!
//! Fallback is exactly one level deep. A literal entry resolves to the active
//! language's value, or else the base value. A producer entry resolves to a
//! wrapper that calls the active language's producer, or else the base
//! producer. No other language is ever consulted.

use crate::i18n::{
    Language, LanguageSet, Producer, Result, Signature, Translation, TranslationError,
    TranslationTable,
};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// Resolve `table` for `active` using the base language of `languages`.
pub fn resolve<L, V>(
    languages: &LanguageSet<L>,
    active: &L,
    table: &TranslationTable<L, V>,
) -> ResolvedTable<V>
where
    L: Language,
    V: Clone + 'static,
{
    resolve_with_base(languages.base(), active, table)
}

/// Resolve `table` for `active`, falling back to `base`.
///
/// Keys keep the table's order. An entry with neither an active nor a base
/// value (only possible for tables that skipped validation) is left out.
pub fn resolve_with_base<L, V>(
    base: &L,
    active: &L,
    table: &TranslationTable<L, V>,
) -> ResolvedTable<V>
where
    L: Language,
    V: Clone + 'static,
{
    let mut resolved = ResolvedTable::with_capacity(table.len());

    for (key, entry) in table.iter() {
        match resolve_entry(base, active, entry) {
            Some(value) => resolved.push(key, value),
            None => warn!(key, base = ?base, "Translation has no base value, skipping"),
        }
    }

    debug!(active = ?active, entries = resolved.len(), "Resolved translations");
    resolved
}

fn resolve_entry<L, V>(base: &L, active: &L, entry: &Translation<L, V>) -> Option<Resolved<V>>
where
    L: Language,
    V: Clone + 'static,
{
    match entry {
        Translation::Literal(slots) => slots
            .get(active)
            .or_else(|| slots.get(base))
            .cloned()
            .map(Resolved::Value),
        Translation::Producer(slots) => {
            let primary = slots.get(active).cloned();
            let fallback = slots.get(base).cloned();
            if primary.is_none() && fallback.is_none() {
                return None;
            }
            Some(Resolved::Producer(ResolvedProducer { primary, fallback }))
        }
    }
}

/// A resolved entry.
#[derive(Debug, Clone)]
pub enum Resolved<V> {
    Value(V),
    Producer(ResolvedProducer<V>),
}

/// Producer bound to one active language.
///
/// Calls the active language's producer when it is present and accepts the
/// argument type, otherwise the base producer.
#[derive(Clone)]
pub struct ResolvedProducer<V> {
    primary: Option<Producer<V>>,
    fallback: Option<Producer<V>>,
}

impl<V: 'static> ResolvedProducer<V> {
    /// Invoke the producer for the active language.
    pub fn call<A: 'static>(&self, args: A) -> Result<V> {
        let expected = Signature::of::<A>();
        let chosen = [self.primary.as_ref(), self.fallback.as_ref()]
            .into_iter()
            .flatten()
            .find(|producer| producer.signature() == expected);

        match chosen {
            Some(producer) => producer.call(args),
            None => Err(TranslationError::SignatureMismatch {
                expected: self.signature().name(),
                found: expected.name(),
            }),
        }
    }

    /// Argument signature callers should use (the base producer's).
    pub fn signature(&self) -> Signature {
        // At least one side is always present
        self.fallback
            .as_ref()
            .or(self.primary.as_ref())
            .map(Producer::signature)
            .unwrap_or_else(Signature::of::<()>)
    }
}

impl<V> fmt::Debug for ResolvedProducer<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedProducer")
            .field("primary", &self.primary)
            .field("fallback", &self.fallback)
            .finish()
    }
}

/// Flat, read-only view of a table for one language, in table order.
#[derive(Debug, Clone)]
pub struct ResolvedTable<V> {
    entries: Vec<(String, Resolved<V>)>,
    index: HashMap<String, usize>,
}

impl<V: 'static> ResolvedTable<V> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    fn push(&mut self, key: &str, value: Resolved<V>) {
        self.index.insert(key.to_string(), self.entries.len());
        self.entries.push((key.to_string(), value));
    }

    pub fn get(&self, key: &str) -> Option<&Resolved<V>> {
        self.index.get(key).map(|&position| &self.entries[position].1)
    }

    /// The literal value for `key`.
    ///
    /// # Returns
    /// * `Err(TranslationError::UnknownKey)` if the key is not in the table
    /// * `Err(TranslationError::NotALiteral)` if the key holds a producer
    pub fn text(&self, key: &str) -> Result<&V> {
        match self.get(key) {
            Some(Resolved::Value(value)) => Ok(value),
            Some(Resolved::Producer(_)) => Err(TranslationError::NotALiteral(key.to_string())),
            None => Err(TranslationError::UnknownKey(key.to_string())),
        }
    }

    /// Invoke the producer for `key` with `args`.
    ///
    /// # Example
    /// ```
    /// use switchable_translations::i18n::{resolve_with_base, Translation, TranslationTable};
    ///
    /// let table: TranslationTable<&str, String> = TranslationTable::new().with(
    ///     "greet",
    ///     Translation::producer::<String>()
    ///         .with("fi", |name| format!("Hei {}", name))
    ///         .with("en", |name| format!("Hi {}", name))
    ///         .build(),
    /// );
    ///
    /// let t = resolve_with_base(&"fi", &"en", &table);
    /// assert_eq!(t.call("greet", "Matti".to_string()).unwrap(), "Hi Matti");
    /// ```
    pub fn call<A: 'static>(&self, key: &str, args: A) -> Result<V> {
        match self.get(key) {
            Some(Resolved::Producer(producer)) => producer.call(args),
            Some(Resolved::Value(_)) => Err(TranslationError::NotAProducer(key.to_string())),
            None => Err(TranslationError::UnknownKey(key.to_string())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Resolved<V>)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Literals serialize as themselves, producers as `{"producer": "<args>"}`.
impl<V: Serialize + 'static> Serialize for ResolvedTable<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            match value {
                Resolved::Value(value) => map.serialize_entry(key, value)?,
                Resolved::Producer(producer) => {
                    let mut description = HashMap::new();
                    description.insert("producer", producer.signature().name());
                    map.serialize_entry(key, &description)?
                }
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Lang {
        Fi,
        En,
        Sv,
    }

    fn languages() -> LanguageSet<Lang> {
        LanguageSet::new(Lang::Fi, [Lang::Fi, Lang::En, Lang::Sv]).unwrap()
    }

    fn greeting_table() -> TranslationTable<Lang, String> {
        TranslationTable::new()
            .with(
                "title",
                Translation::text()
                    .with(Lang::Fi, "Otsikko")
                    .with(Lang::En, "Title")
                    .absent(Lang::Sv)
                    .build(),
            )
            .with(
                "greet",
                Translation::producer::<String>()
                    .with(Lang::Fi, |name| format!("Hei {}", name))
                    .with(Lang::En, |name| format!("Hi {}", name))
                    .absent(Lang::Sv)
                    .build(),
            )
    }

    // ==================== Literal Tests ====================

    #[test]
    fn test_literal_active_language() {
        let t = resolve(&languages(), &Lang::En, &greeting_table());
        assert_eq!(t.text("title").unwrap(), "Title");
    }

    #[test]
    fn test_literal_base_language() {
        let t = resolve(&languages(), &Lang::Fi, &greeting_table());
        assert_eq!(t.text("title").unwrap(), "Otsikko");
    }

    #[test]
    fn test_literal_falls_back_to_base() {
        let t = resolve(&languages(), &Lang::Sv, &greeting_table());
        assert_eq!(t.text("title").unwrap(), "Otsikko");
    }

    #[test]
    fn test_literal_undeclared_language_falls_back() {
        let table: TranslationTable<Lang, String> = TranslationTable::new()
            .with("only", Translation::text().with(Lang::Fi, "Vain").build());

        let t = resolve(&languages(), &Lang::En, &table);
        assert_eq!(t.text("only").unwrap(), "Vain");
    }

    #[test]
    fn test_fallback_is_single_level() {
        // Swedish is absent; English must never be consulted for it
        let table: TranslationTable<Lang, String> = TranslationTable::new().with(
            "word",
            Translation::text()
                .with(Lang::Fi, "base")
                .with(Lang::En, "english")
                .absent(Lang::Sv)
                .build(),
        );

        let t = resolve(&languages(), &Lang::Sv, &table);
        assert_eq!(t.text("word").unwrap(), "base");
    }

    // ==================== Producer Tests ====================

    #[test]
    fn test_producer_active_language() {
        let t = resolve(&languages(), &Lang::En, &greeting_table());
        assert_eq!(t.call("greet", "Matti".to_string()).unwrap(), "Hi Matti");
    }

    #[test]
    fn test_producer_falls_back_to_base() {
        let t = resolve(&languages(), &Lang::Sv, &greeting_table());
        assert_eq!(t.call("greet", "Matti".to_string()).unwrap(), "Hei Matti");
    }

    #[test]
    fn test_producer_is_invoked_per_call() {
        let calls = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&calls);
        let table: TranslationTable<Lang, u32> = TranslationTable::new().with(
            "tick",
            Translation::producer::<()>()
                .with(Lang::Fi, move |()| {
                    counter.set(counter.get() + 1);
                    counter.get()
                })
                .build(),
        );

        let t = resolve(&languages(), &Lang::Fi, &table);
        assert_eq!(t.call("tick", ()).unwrap(), 1);
        assert_eq!(t.call("tick", ()).unwrap(), 2);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_producer_with_mismatched_active_signature_uses_base() {
        let mut slots = crate::i18n::Slots::new();
        slots.insert(Lang::Fi, Some(Producer::new(|name: String| format!("Hei {}", name))));
        slots.insert(Lang::En, Some(Producer::new(|count: u32| format!("{} items", count))));
        let table = TranslationTable::new().with("greet", Translation::Producer(slots));

        let t = resolve(&languages(), &Lang::En, &table);
        assert_eq!(t.call("greet", "Matti".to_string()).unwrap(), "Hei Matti");
    }

    #[test]
    fn test_producer_wrong_arguments() {
        let t = resolve(&languages(), &Lang::En, &greeting_table());
        let result = t.call("greet", 42u32);
        assert!(matches!(result, Err(TranslationError::SignatureMismatch { .. })));
    }

    // ==================== Lookup Tests ====================

    #[test]
    fn test_text_on_producer() {
        let t = resolve(&languages(), &Lang::En, &greeting_table());
        assert_eq!(
            t.text("greet"),
            Err(TranslationError::NotALiteral("greet".to_string()))
        );
    }

    #[test]
    fn test_call_on_literal() {
        let t = resolve(&languages(), &Lang::En, &greeting_table());
        assert_eq!(
            t.call("title", ()),
            Err(TranslationError::NotAProducer("title".to_string()))
        );
    }

    #[test]
    fn test_unknown_key() {
        let t = resolve(&languages(), &Lang::En, &greeting_table());
        assert_eq!(
            t.text("nope"),
            Err(TranslationError::UnknownKey("nope".to_string()))
        );
        assert!(t.get("nope").is_none());
    }

    #[test]
    fn test_resolved_preserves_key_order() {
        let t = resolve(&languages(), &Lang::En, &greeting_table());
        let keys: Vec<_> = t.keys().collect();
        assert_eq!(keys, vec!["title", "greet"]);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_empty_table() {
        let table: TranslationTable<Lang, String> = TranslationTable::new();
        let t = resolve(&languages(), &Lang::En, &table);
        assert!(t.is_empty());
    }

    // ==================== Degradation Tests ====================

    #[test]
    fn test_missing_base_uses_active() {
        let table: TranslationTable<Lang, String> = TranslationTable::new().with(
            "word",
            Translation::text().absent(Lang::Fi).with(Lang::En, "word").build(),
        );

        let t = resolve(&languages(), &Lang::En, &table);
        assert_eq!(t.text("word").unwrap(), "word");
    }

    #[test]
    fn test_missing_base_and_active_skips_key() {
        let table: TranslationTable<Lang, String> = TranslationTable::new()
            .with("broken", Translation::text().with(Lang::En, "word").build())
            .with("fine", Translation::text().with(Lang::Fi, "sana").build());

        let t = resolve(&languages(), &Lang::Sv, &table);
        assert!(t.get("broken").is_none());
        assert_eq!(t.text("fine").unwrap(), "sana");
    }

    // ==================== Serialization Tests ====================

    #[test]
    fn test_serialize_resolved_table() {
        let t = resolve(&languages(), &Lang::En, &greeting_table());
        let json = serde_json::to_value(&t).unwrap();

        assert_eq!(json["title"], "Title");
        assert!(json["greet"]["producer"].as_str().unwrap().contains("String"));
    }

    #[test]
    fn test_resolve_with_base_on_string_languages() {
        let table: TranslationTable<&str, String> = TranslationTable::new().with(
            "columnProduct",
            Translation::text().with("fi", "Tuote").absent("en").build(),
        );

        let t = resolve_with_base(&"fi", &"en", &table);
        assert_eq!(t.text("columnProduct").unwrap(), "Tuote");
    }
}
