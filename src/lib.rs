//! Language-switchable translations with reactive resolution.
//!
//! See [`i18n`] for the store, resolver and factory.

pub mod config;
pub mod i18n;
