//! Language-switchable translation store.
//!
//! One store holds the current language for a process (or a test, or a
//! tenant: stores are independent values). Translation tables map keys to
//! per-language literals or producers. Resolution flattens a table for the
//! active language, falling back to the base language one level deep.
//!
//! # Architecture
//!
//! - `language`: `Language` marker trait and validated `LanguageCode`
//! - `registry`: `LanguageSet`, the allowed languages and the base
//! - `store`: `LanguageStore` with synchronous subscriber notification
//! - `translation`: entries, producers and tables
//! - `resolver`: flattening a table for one language
//! - `memo`: dependency-keyed caching
//! - `factory`: `TranslationsFactory` and per-consumer `Translator`
//! - `validator`: runtime shape checks and text linting
//! - `metrics`: cache and notification counters
//!
//! # Example
//!
//! ```rust
//! use switchable_translations::i18n::{Translation, TranslationTable, TranslationsFactory};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum Lang { Fi, En }
//!
//! let i18n: TranslationsFactory<Lang, String> =
//!     TranslationsFactory::create(Lang::Fi, [Lang::Fi, Lang::En]).unwrap();
//!
//! let table = i18n
//!     .register(
//!         TranslationTable::new()
//!             .with(
//!                 "title",
//!                 Translation::text().with(Lang::Fi, "Otsikko").with(Lang::En, "Title").build(),
//!             )
//!             .with(
//!                 "greet",
//!                 Translation::producer::<&'static str>()
//!                     .with(Lang::Fi, |name| format!("Hei {}", name))
//!                     .with(Lang::En, |name| format!("Hi {}", name))
//!                     .build(),
//!             ),
//!     )
//!     .unwrap();
//!
//! let translator = i18n.use_translations(|| {});
//! i18n.set_language(Lang::En);
//!
//! let t = translator.translations(&table);
//! assert_eq!(t.text("title").unwrap(), "Title");
//! assert_eq!(t.call("greet", "Matti").unwrap(), "Hi Matti");
//! ```

mod error;
mod factory;
mod language;
pub mod memo;
mod metrics;
mod registry;
mod resolver;
mod store;
mod translation;
mod validator;

pub use error::{Result, TranslationError};
pub use factory::{TranslationsFactory, Translator};
pub use language::{Language, LanguageCode};
pub use metrics::{MetricsReport, ResolutionMetrics};
pub use registry::LanguageSet;
pub use resolver::{resolve, resolve_with_base, Resolved, ResolvedProducer, ResolvedTable};
pub use store::{LanguageBinding, LanguageStore, Subscription};
pub use translation::{
    ProducerBuilder, Producer, Signature, Slots, TextBuilder, Translation, TranslationTable,
};
pub use validator::{TableValidator, ValidationReport};
