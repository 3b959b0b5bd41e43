//! Translation entries and tables.
//!
//! A [`Translation`] holds one slot per declared language. Every slot of an
//! entry has the same kind: either all literal values or all producers with
//! one argument type. The enum makes mixing kinds unrepresentable, and the
//! typed [`ProducerBuilder`] pins the argument type for every language of an
//! entry at compile time.

use crate::i18n::{Language, Result, TranslationError};
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

/// Argument type of a producer.
///
/// Two signatures are equal when their argument types are the same type.
#[derive(Clone, Copy)]
pub struct Signature {
    id: TypeId,
    name: &'static str,
}

impl Signature {
    /// Signature of a producer taking `A`.
    pub fn of<A: 'static>() -> Self {
        Self {
            id: TypeId::of::<A>(),
            name: type_name::<A>(),
        }
    }

    /// Human readable argument type, for messages.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Signature {}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.name)
    }
}

/// A function-valued translation.
///
/// Wraps `Fn(A) -> V` behind a reference count and erases `A` so entries with
/// different argument types can share one table. Multiple arguments are passed
/// as a tuple; arguments must be owned (`'static`) values.
pub struct Producer<V> {
    signature: Signature,
    // Always a `Box<dyn Fn(A) -> V>` for the `A` recorded in `signature`
    func: Rc<dyn Any>,
    _value: PhantomData<fn() -> V>,
}

impl<V: 'static> Producer<V> {
    /// Wrap a function.
    ///
    /// # Example
    /// ```
    /// use switchable_translations::i18n::Producer;
    ///
    /// let greet = Producer::new(|name: String| format!("Hi {}", name));
    /// assert_eq!(greet.call("Matti".to_string()).unwrap(), "Hi Matti");
    /// ```
    pub fn new<A, F>(func: F) -> Self
    where
        A: 'static,
        F: Fn(A) -> V + 'static,
    {
        let func: Box<dyn Fn(A) -> V> = Box::new(func);
        Self {
            signature: Signature::of::<A>(),
            func: Rc::new(func),
            _value: PhantomData,
        }
    }

    /// Argument signature recorded at construction.
    pub fn signature(&self) -> Signature {
        self.signature
    }

    /// Invoke the producer.
    ///
    /// The producer runs on every call; results are not memoized.
    ///
    /// # Returns
    /// * `Err(TranslationError::SignatureMismatch)` if `A` is not the argument
    ///   type the producer was built with
    pub fn call<A: 'static>(&self, args: A) -> Result<V> {
        let func = self
            .func
            .downcast_ref::<Box<dyn Fn(A) -> V>>()
            .ok_or(TranslationError::SignatureMismatch {
                expected: self.signature.name,
                found: type_name::<A>(),
            })?;

        Ok(func(args))
    }
}

impl<V> Clone for Producer<V> {
    fn clone(&self) -> Self {
        Self {
            signature: self.signature,
            func: Rc::clone(&self.func),
            _value: PhantomData,
        }
    }
}

impl<V> fmt::Debug for Producer<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Producer({})", self.signature.name)
    }
}

/// Per-language slots of one entry, in declaration order.
///
/// A declared slot is either present (`Some`) or explicitly absent (`None`,
/// meaning "fall back to the base language"). A language that was never
/// declared is missing, which the validator reports as an error.
#[derive(Debug, Clone)]
pub struct Slots<L, T> {
    slots: Vec<(L, Option<T>)>,
}

impl<L: Language, T> Slots<L, T> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Declare a slot, replacing any earlier declaration for `lang`.
    pub fn insert(&mut self, lang: L, value: Option<T>) {
        match self.slots.iter_mut().find(|(l, _)| *l == lang) {
            Some(slot) => slot.1 = value,
            None => self.slots.push((lang, value)),
        }
    }

    /// The present value for `lang`, if any.
    pub fn get(&self, lang: &L) -> Option<&T> {
        self.slots
            .iter()
            .find(|(l, _)| l == lang)
            .and_then(|(_, value)| value.as_ref())
    }

    /// Check whether `lang` has a slot, present or explicitly absent.
    pub fn is_declared(&self, lang: &L) -> bool {
        self.slots.iter().any(|(l, _)| l == lang)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&L, Option<&T>)> {
        self.slots.iter().map(|(l, value)| (l, value.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<L: Language, T> Default for Slots<L, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Language, T> FromIterator<(L, Option<T>)> for Slots<L, T> {
    fn from_iter<I: IntoIterator<Item = (L, Option<T>)>>(iter: I) -> Self {
        let mut slots = Slots::new();
        for (lang, value) in iter {
            slots.insert(lang, value);
        }
        slots
    }
}

/// One translation entry: literal values or producers, per language.
#[derive(Debug, Clone)]
pub enum Translation<L, V> {
    Literal(Slots<L, V>),
    Producer(Slots<L, Producer<V>>),
}

impl<L: Language, V: 'static> Translation<L, V> {
    /// Start a literal-valued entry.
    ///
    /// # Example
    /// ```
    /// use switchable_translations::i18n::{Translation, TranslationTable};
    ///
    /// let mut table: TranslationTable<&str, String> = TranslationTable::new();
    /// table.insert(
    ///     "title",
    ///     Translation::text().with("fi", "Otsikko").with("en", "Title").build(),
    /// );
    /// assert!(table.get("title").is_some());
    /// ```
    pub fn text() -> TextBuilder<L, V> {
        TextBuilder { slots: Slots::new() }
    }

    /// Start a producer entry whose every language takes `A`.
    pub fn producer<A: 'static>() -> ProducerBuilder<L, A, V> {
        ProducerBuilder {
            slots: Slots::new(),
            _args: PhantomData,
        }
    }

    pub fn is_producer(&self) -> bool {
        matches!(self, Translation::Producer(_))
    }

    /// Languages with a slot, present or explicitly absent.
    pub fn declared_languages(&self) -> Vec<&L> {
        match self {
            Translation::Literal(slots) => slots.iter().map(|(l, _)| l).collect(),
            Translation::Producer(slots) => slots.iter().map(|(l, _)| l).collect(),
        }
    }

    /// Check whether `lang` holds a present value or producer.
    pub fn is_present(&self, lang: &L) -> bool {
        match self {
            Translation::Literal(slots) => slots.get(lang).is_some(),
            Translation::Producer(slots) => slots.get(lang).is_some(),
        }
    }

    /// Check whether `lang` has a slot, present or explicitly absent.
    pub fn is_declared(&self, lang: &L) -> bool {
        match self {
            Translation::Literal(slots) => slots.is_declared(lang),
            Translation::Producer(slots) => slots.is_declared(lang),
        }
    }
}

/// Builder for literal entries.
#[derive(Debug)]
pub struct TextBuilder<L, V> {
    slots: Slots<L, V>,
}

impl<L: Language, V> TextBuilder<L, V> {
    /// Set the value for `lang`.
    pub fn with(mut self, lang: L, value: impl Into<V>) -> Self {
        self.slots.insert(lang, Some(value.into()));
        self
    }

    /// Declare `lang` as explicitly absent.
    pub fn absent(mut self, lang: L) -> Self {
        self.slots.insert(lang, None);
        self
    }

    pub fn build(self) -> Translation<L, V> {
        Translation::Literal(self.slots)
    }
}

/// Builder for producer entries; `A` is shared by every language.
pub struct ProducerBuilder<L, A, V> {
    slots: Slots<L, Producer<V>>,
    _args: PhantomData<fn(A)>,
}

impl<L: Language, A: 'static, V: 'static> ProducerBuilder<L, A, V> {
    /// Set the producer for `lang`.
    pub fn with<F>(mut self, lang: L, func: F) -> Self
    where
        F: Fn(A) -> V + 'static,
    {
        self.slots.insert(lang, Some(Producer::new(func)));
        self
    }

    /// Declare `lang` as explicitly absent.
    pub fn absent(mut self, lang: L) -> Self {
        self.slots.insert(lang, None);
        self
    }

    pub fn build(self) -> Translation<L, V> {
        Translation::Producer(self.slots)
    }
}

/// Caller-keyed translation entries, in insertion order.
///
/// Share a table as `Rc<TranslationTable>`: resolution results are cached
/// against the `Rc` pointer, not the table contents.
#[derive(Debug, Clone)]
pub struct TranslationTable<L, V> {
    entries: Vec<(String, Translation<L, V>)>,
    index: HashMap<String, usize>,
}

impl<L: Language, V: 'static> TranslationTable<L, V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Insert an entry, returning the one it replaced.
    ///
    /// A replaced key keeps its original position.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        translation: Translation<L, V>,
    ) -> Option<Translation<L, V>> {
        let key = key.into();
        match self.index.get(&key) {
            Some(&position) => Some(std::mem::replace(
                &mut self.entries[position].1,
                translation,
            )),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, translation));
                None
            }
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, translation: Translation<L, V>) -> Self {
        self.insert(key, translation);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Translation<L, V>> {
        self.index.get(key).map(|&position| &self.entries[position].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Translation<L, V>)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
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

impl<L: Language, V: 'static> Default for TranslationTable<L, V> {
    fn default() -> Self {
        Self::new()
    }
}
