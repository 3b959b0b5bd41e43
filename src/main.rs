//! Translations demo - resolves a sample table for every configured language
//!
//! Usage:
//!   cargo run                                            # English only
//!   TRANSLATIONS_BASE_LANGUAGE=fi TRANSLATIONS_LANGUAGES=fi,en cargo run
//!
//! Optional environment variables:
//! - TRANSLATIONS_BASE_LANGUAGE (defaults to en)
//! - TRANSLATIONS_LANGUAGES (comma separated, defaults to the base language)
//! - TRANSLATIONS_INITIAL_LANGUAGE
//! - TRANSLATIONS_STRICT (defaults to true)

use anyhow::{Context, Result};
use std::rc::Rc;
use switchable_translations::config::Config;
use switchable_translations::i18n::{
    LanguageCode, LanguageSet, TableValidator, Translation, TranslationTable, TranslationsFactory,
};
use tracing::{info, warn};

/// Sample table: a plain title, a fallback-only entry and a producer
fn sample_table(languages: &LanguageSet<LanguageCode>) -> TranslationTable<LanguageCode, String> {
    let base = languages.base().clone();

    let mut title = Translation::text().with(base.clone(), format!("Title ({})", base));
    let mut column = Translation::text().with(base.clone(), format!("Product ({})", base));
    let mut greet = Translation::producer::<String>().with(base.clone(), |name: String| {
        format!("Hello {}", name)
    });

    for lang in languages.others() {
        let code = lang.clone();
        title = title.with(lang.clone(), format!("Title ({})", lang));
        column = column.absent(lang.clone());
        greet = greet.with(lang.clone(), move |name: String| format!("[{}] Hello {}", code, name));
    }

    TranslationTable::new()
        .with("title", title.build())
        .with("columnProduct", column.build())
        .with("greet", greet.build())
}

fn main() -> Result<()> {
    // Load .env file (ignored if missing)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("switchable_translations=info".parse()?),
        )
        .init();

    info!("Starting translations demo");

    let config = Config::from_env()?;
    let languages = config.language_set()?;
    let initial = config.initial_language(&languages)?;
    info!(
        "Base language: {}, allowed: {:?}",
        languages.base(),
        config.languages
    );

    let i18n: TranslationsFactory<LanguageCode, String> =
        TranslationsFactory::new(languages.clone());
    if let Some(lang) = initial {
        i18n.set_language(lang);
    }

    let table = sample_table(&languages);
    for warning in TableValidator::lint_text(&languages, &table).warnings {
        warn!("{}", warning);
    }
    let table = if config.strict {
        i18n.register(table).context("Sample table failed validation")?
    } else {
        Rc::new(table)
    };

    let translator = i18n.use_translations(|| {});
    info!("Current language: {}", translator.language());

    for lang in languages.iter() {
        i18n.set_language(lang.clone());
        let t = translator.translations(&table);

        let greeting = t.call("greet", "Matti".to_string())?;
        println!("{}: {}", lang, serde_json::to_string(&*t)?);
        println!("{}: greet(\"Matti\") = {}", lang, greeting);
    }

    // Re-reading with an unchanged language is served from the cache
    translator.translations(&table);

    println!("{}", serde_json::to_string_pretty(&i18n.metrics().report())?);
    info!("Done");
    Ok(())
}
