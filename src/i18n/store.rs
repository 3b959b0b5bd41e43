//! Language store: the single source of truth for the active language.
//!
//! The store is a cheaply cloneable handle to shared single-threaded state.
//! All clones observe and mutate the same language and subscriber list.
//! Independent stores can live side by side.
//!
//! Notification is synchronous: `set_language` invokes every subscriber before
//! it returns. The subscriber list is snapshotted before the first callback
//! runs and no borrow is held while callbacks execute, so a callback may read
//! or set the language, subscribe, or unsubscribe. Registration changes made
//! during a pass take effect from the next pass.

use crate::i18n::{Language, LanguageSet, ResolutionMetrics, Result};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, trace, warn};

type Callback = Rc<dyn Fn()>;

struct StoreState<L> {
    current: L,
    /// Number of `set_language` calls so far
    generation: u64,
    subscribers: Vec<(u64, Callback)>,
    next_id: u64,
}

/// Holds the current language and notifies subscribers when it is set.
pub struct LanguageStore<L> {
    state: Rc<RefCell<StoreState<L>>>,
    languages: Rc<LanguageSet<L>>,
    metrics: Rc<ResolutionMetrics>,
}

impl<L: Language> LanguageStore<L> {
    /// Create a store whose initial language is the base language.
    pub fn new(languages: LanguageSet<L>) -> Self {
        Self::with_metrics(languages, Rc::new(ResolutionMetrics::new()))
    }

    /// Create a store from a base language and the allowed set.
    ///
    /// # Returns
    /// * `Err(TranslationError::Configuration)` if `base` is not allowed
    pub fn create(base: L, allowed: impl IntoIterator<Item = L>) -> Result<Self> {
        Ok(Self::new(LanguageSet::new(base, allowed)?))
    }

    pub(crate) fn with_metrics(languages: LanguageSet<L>, metrics: Rc<ResolutionMetrics>) -> Self {
        let state = StoreState {
            current: languages.base().clone(),
            generation: 0,
            subscribers: Vec::new(),
            next_id: 0,
        };

        Self {
            state: Rc::new(RefCell::new(state)),
            languages: Rc::new(languages),
            metrics,
        }
    }

    /// The current language.
    pub fn language(&self) -> L {
        self.state.borrow().current.clone()
    }

    /// The allowed languages and base of this store.
    pub fn languages(&self) -> &LanguageSet<L> {
        &self.languages
    }

    pub fn metrics(&self) -> &ResolutionMetrics {
        &self.metrics
    }

    /// Number of `set_language` calls since the store was created.
    pub fn generation(&self) -> u64 {
        self.state.borrow().generation
    }

    /// Set the current language and notify every subscriber once, in
    /// registration order.
    ///
    /// Setting the language that is already active still notifies. A language
    /// outside the allowed set is accepted and logged.
    pub fn set_language(&self, lang: L) {
        if !self.languages.contains(&lang) {
            warn!(language = ?lang, "Setting a language outside the allowed set");
        }

        let subscribers: Vec<Callback> = {
            let mut state = self.state.borrow_mut();
            debug!(
                from = ?state.current,
                to = ?lang,
                subscribers = state.subscribers.len(),
                "Setting language"
            );
            state.current = lang;
            state.generation += 1;
            state
                .subscribers
                .iter()
                .map(|(_, callback)| Rc::clone(callback))
                .collect()
        };

        self.metrics.record_language_change();
        for callback in &subscribers {
            callback();
            self.metrics.record_notification();
        }
    }

    /// Register `callback` for every future `set_language` call.
    ///
    /// Subscribing the same closure twice creates two registrations. Dropping
    /// the returned [`Subscription`] does not unsubscribe.
    pub fn subscribe(&self, callback: impl Fn() + 'static) -> Subscription {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.subscribers.push((id, Rc::new(callback)));
        trace!(id, subscribers = state.subscribers.len(), "Subscribed");

        drop(state);

        let weak = Rc::downgrade(&self.state);
        let list: Weak<RefCell<dyn SubscriberList>> = weak;
        Subscription { state: list, id }
    }

    /// Bind the current language to a consumer.
    ///
    /// `invalidate` is the host's re-render hook and runs on every
    /// notification. The binding reports itself stale whenever
    /// `set_language` has been called since its last read, and unsubscribes
    /// when dropped.
    pub fn use_language(&self, invalidate: impl Fn() + 'static) -> LanguageBinding<L> {
        let subscription = self.subscribe(invalidate);
        LanguageBinding {
            store: self.clone(),
            seen: Cell::new(self.generation()),
            subscription,
        }
    }

    /// Number of live registrations.
    pub fn subscriber_count(&self) -> usize {
        self.state.borrow().subscribers.len()
    }
}

impl<L> Clone for LanguageStore<L> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            languages: Rc::clone(&self.languages),
            metrics: Rc::clone(&self.metrics),
        }
    }
}

impl<L: Language> fmt::Debug for LanguageStore<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("LanguageStore")
            .field("current", &state.current)
            .field("base", self.languages.base())
            .field("generation", &state.generation)
            .field("subscribers", &state.subscribers.len())
            .finish()
    }
}

// Lets `Subscription` remove itself without naming the language type.
trait SubscriberList {
    fn remove(&mut self, id: u64) -> Option<Callback>;
}

impl<L> SubscriberList for StoreState<L> {
    fn remove(&mut self, id: u64) -> Option<Callback> {
        let index = self.subscribers.iter().position(|(existing, _)| *existing == id)?;
        let (_, callback) = self.subscribers.remove(index);
        Some(callback)
    }
}

/// Handle for removing one registration.
pub struct Subscription {
    state: Weak<RefCell<dyn SubscriberList>>,
    id: u64,
}

impl Subscription {
    /// Remove the registration. Calling this again is a no-op.
    pub fn unsubscribe(&self) {
        let Some(state) = self.state.upgrade() else {
            return;
        };
        // Dropped after the borrow ends: the callback may own a binding on this store.
        let removed = state.borrow_mut().remove(self.id);
        if removed.is_some() {
            trace!(id = self.id, "Unsubscribed");
        }
        drop(removed);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// A consumer's view of the current language (see
/// [`LanguageStore::use_language`]).
pub struct LanguageBinding<L> {
    store: LanguageStore<L>,
    seen: Cell<u64>,
    subscription: Subscription,
}

impl<L: Language> LanguageBinding<L> {
    /// Read the current language and mark the binding fresh.
    pub fn language(&self) -> L {
        self.seen.set(self.store.generation());
        self.store.language()
    }

    /// Check whether `set_language` was called since the last read.
    pub fn is_stale(&self) -> bool {
        self.store.generation() != self.seen.get()
    }

    pub fn store(&self) -> &LanguageStore<L> {
        &self.store
    }
}

impl<L> Drop for LanguageBinding<L> {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}

impl<L: Language> fmt::Debug for LanguageBinding<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageBinding")
            .field("seen", &self.seen.get())
            .field("subscription", &self.subscription)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::TranslationError;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Lang {
        Fi,
        En,
        Sv,
    }

    fn store() -> LanguageStore<Lang> {
        LanguageStore::create(Lang::Fi, [Lang::Fi, Lang::En]).unwrap()
    }

    fn counter() -> (Rc<Cell<u32>>, impl Fn() + 'static) {
        let count = Rc::new(Cell::new(0));
        let handle = Rc::clone(&count);
        (count, move || handle.set(handle.get() + 1))
    }

    // ==================== Construction Tests ====================

    #[test]
    fn test_initial_language_is_base() {
        assert_eq!(store().language(), Lang::Fi);
    }

    #[test]
    fn test_create_rejects_base_outside_set() {
        let result = LanguageStore::create(Lang::Sv, [Lang::Fi, Lang::En]);
        assert!(matches!(result, Err(TranslationError::Configuration(_))));
    }

    #[test]
    fn test_independent_stores() {
        let first = store();
        let second = store();

        first.set_language(Lang::En);

        assert_eq!(first.language(), Lang::En);
        assert_eq!(second.language(), Lang::Fi);
    }

    #[test]
    fn test_clones_share_state() {
        let first = store();
        let second = first.clone();

        second.set_language(Lang::En);

        assert_eq!(first.language(), Lang::En);
    }

    // ==================== set_language Tests ====================

    #[test]
    fn test_set_language_notifies() {
        let store = store();
        let (count, callback) = counter();
        store.subscribe(callback);

        store.set_language(Lang::En);

        assert_eq!(store.language(), Lang::En);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_set_same_language_still_notifies() {
        let store = store();
        let (count, callback) = counter();
        store.subscribe(callback);

        store.set_language(Lang::En);
        store.set_language(Lang::En);

        assert_eq!(store.language(), Lang::En);
        assert_eq!(count.get(), 2);
        assert_eq!(store.generation(), 2);
    }

    #[test]
    fn test_set_language_outside_set_is_accepted() {
        let store = store();
        store.set_language(Lang::Sv);
        assert_eq!(store.language(), Lang::Sv);
    }

    #[test]
    fn test_notification_order_is_registration_order() {
        let store = store();
        let order = Rc::new(RefCell::new(Vec::new()));

        for id in 0..3 {
            let order = Rc::clone(&order);
            store.subscribe(move || order.borrow_mut().push(id));
        }

        store.set_language(Lang::En);

        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_callback_sees_new_language() {
        let store = store();
        let seen = Rc::new(Cell::new(None));
        let reader = store.clone();
        let slot = Rc::clone(&seen);
        store.subscribe(move || slot.set(Some(reader.language())));

        store.set_language(Lang::En);

        assert_eq!(seen.get(), Some(Lang::En));
    }

    // ==================== subscribe Tests ====================

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let store = store();
        let (count, callback) = counter();
        let subscription = store.subscribe(callback);

        subscription.unsubscribe();
        store.set_language(Lang::En);

        assert_eq!(count.get(), 0);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_unsubscribe_twice_is_noop() {
        let store = store();
        let (count, callback) = counter();
        let subscription = store.subscribe(callback);
        let (other_count, other) = counter();
        store.subscribe(other);

        subscription.unsubscribe();
        subscription.unsubscribe();
        store.set_language(Lang::En);

        assert_eq!(count.get(), 0);
        assert_eq!(other_count.get(), 1);
        assert_eq!(store.subscriber_count(), 1);
    }

    #[test]
    fn test_same_callback_twice_registers_twice() {
        let store = store();
        let count = Rc::new(Cell::new(0));
        let callback: Rc<dyn Fn()> = {
            let count = Rc::clone(&count);
            Rc::new(move || count.set(count.get() + 1))
        };

        let first = {
            let callback = Rc::clone(&callback);
            store.subscribe(move || callback())
        };
        let _second = {
            let callback = Rc::clone(&callback);
            store.subscribe(move || callback())
        };

        store.set_language(Lang::En);
        assert_eq!(count.get(), 2);

        first.unsubscribe();
        store.set_language(Lang::Fi);
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn test_dropping_subscription_keeps_registration() {
        let store = store();
        let (count, callback) = counter();
        drop(store.subscribe(callback));

        store.set_language(Lang::En);

        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_unsubscribe_after_store_dropped() {
        let subscription = {
            let store = store();
            store.subscribe(|| {})
        };
        subscription.unsubscribe();
    }

    // ==================== Re-entrancy Tests ====================

    #[test]
    fn test_unsubscribe_during_notification_does_not_skip_others() {
        let store = store();
        let order = Rc::new(RefCell::new(Vec::new()));
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        {
            let order = Rc::clone(&order);
            let victim = Rc::clone(&victim);
            store.subscribe(move || {
                order.borrow_mut().push("a");
                if let Some(subscription) = victim.borrow().as_ref() {
                    subscription.unsubscribe();
                }
            });
        }
        let b = {
            let order = Rc::clone(&order);
            store.subscribe(move || order.borrow_mut().push("b"))
        };
        {
            let order = Rc::clone(&order);
            store.subscribe(move || order.borrow_mut().push("c"));
        }
        *victim.borrow_mut() = Some(b);

        store.set_language(Lang::En);
        assert_eq!(*order.borrow(), vec!["a", "b", "c"]);

        order.borrow_mut().clear();
        store.set_language(Lang::Fi);
        assert_eq!(*order.borrow(), vec!["a", "c"]);
    }

    #[test]
    fn test_subscribe_during_notification_takes_effect_next_pass() {
        let store = store();
        let (late_count, late) = counter();
        let late = Rc::new(RefCell::new(Some(late)));

        {
            let inner = store.clone();
            let late = Rc::clone(&late);
            store.subscribe(move || {
                if let Some(callback) = late.borrow_mut().take() {
                    inner.subscribe(callback);
                }
            });
        }

        store.set_language(Lang::En);
        assert_eq!(late_count.get(), 0);

        store.set_language(Lang::Fi);
        assert_eq!(late_count.get(), 1);
    }

    #[test]
    fn test_set_language_from_callback() {
        let store = store();
        {
            let inner = store.clone();
            store.subscribe(move || {
                if inner.language() == Lang::Sv {
                    inner.set_language(Lang::Fi);
                }
            });
        }

        store.set_language(Lang::Sv);

        assert_eq!(store.language(), Lang::Fi);
        assert_eq!(store.generation(), 2);
    }

    // ==================== use_language Tests ====================

    #[test]
    fn test_binding_reads_current_language() {
        let store = store();
        let binding = store.use_language(|| {});

        assert_eq!(binding.language(), Lang::Fi);
        assert!(!binding.is_stale());
    }

    #[test]
    fn test_binding_stale_after_set() {
        let store = store();
        let (renders, invalidate) = counter();
        let binding = store.use_language(invalidate);

        store.set_language(Lang::En);

        assert!(binding.is_stale());
        assert_eq!(renders.get(), 1);
        assert_eq!(binding.language(), Lang::En);
        assert!(!binding.is_stale());
    }

    #[test]
    fn test_binding_stale_after_same_language_set() {
        let store = store();
        let binding = store.use_language(|| {});
        binding.language();

        store.set_language(Lang::Fi);

        assert!(binding.is_stale());
    }

    #[test]
    fn test_binding_unsubscribes_on_drop() {
        let store = store();
        let binding = store.use_language(|| {});
        assert_eq!(store.subscriber_count(), 1);

        drop(binding);

        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_unsubscribe_callback_owning_binding() {
        let store = store();
        let binding = store.use_language(|| {});
        let subscription = store.subscribe(move || {
            binding.language();
        });
        assert_eq!(store.subscriber_count(), 2);

        store.set_language(Lang::En);
        subscription.unsubscribe();

        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_unsubscribe_during_notification_of_callback_owning_binding() {
        let store = store();
        let binding = store.use_language(|| {});
        let handle: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let own = Rc::clone(&handle);
        let subscription = store.subscribe(move || {
            binding.language();
            if let Some(subscription) = own.borrow().as_ref() {
                subscription.unsubscribe();
            }
        });
        *handle.borrow_mut() = Some(subscription);

        store.set_language(Lang::En);

        assert_eq!(store.subscriber_count(), 0);
    }

    // ==================== Metrics Tests ====================

    #[test]
    fn test_metrics_count_changes_and_notifications() {
        let store = store();
        store.subscribe(|| {});
        store.subscribe(|| {});

        store.set_language(Lang::En);
        store.set_language(Lang::En);

        assert_eq!(store.metrics().language_changes(), 2);
        assert_eq!(store.metrics().notifications(), 4);
    }
}
