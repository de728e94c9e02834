//! Builds a [`TranslationDocument`] for one locale of a project.

use std::{collections::HashSet, sync::Arc};

use tracing::{debug, warn};

use crate::{
    error::Error,
    store::{ProjectLocale, TermStore},
    types::{TranslationDocument, TranslationRecord},
};

/// Options of a single collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectOptions {
    /// Keep only the terms without a translation.
    pub untranslated: bool,
    /// Fill missing translations from this locale.
    pub fallback_locale: Option<String>,
}

impl CollectOptions {
    pub fn untranslated(mut self, untranslated: bool) -> Self {
        self.untranslated = untranslated;
        self
    }

    pub fn fallback(mut self, locale: impl Into<String>) -> Self {
        self.fallback_locale = Some(locale.into());
        self
    }
}

/// Reads terms from a [`TermStore`] and shapes them into documents.
#[derive(Clone)]
pub struct Collector {
    store: Arc<dyn TermStore>,
}

impl Collector {
    pub fn new(store: Arc<dyn TermStore>) -> Self {
        Self { store }
    }

    /// Collects the document of `locale_code`.
    ///
    /// The locale must be configured for the project. With
    /// `options.untranslated` only empty translations are kept. With a
    /// fallback locale, gaps are filled from that locale; an unconfigured
    /// fallback is ignored. Both run in that order when both are set.
    pub async fn collect(
        &self,
        project_id: &str,
        locale_code: &str,
        options: &CollectOptions,
    ) -> Result<TranslationDocument, Error> {
        if locale_code.trim().is_empty() {
            return Err(Error::validation_error("locale is a required param"));
        }
        let locale = self
            .store
            .find_project_locale(project_id, locale_code)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "locale `{}` is not configured for project `{}`",
                    locale_code, project_id
                ))
            })?;

        self.collect_locale(project_id, &locale, options).await
    }

    /// Same as [`Collector::collect`] for an already resolved project locale.
    pub async fn collect_locale(
        &self,
        project_id: &str,
        locale: &ProjectLocale,
        options: &CollectOptions,
    ) -> Result<TranslationDocument, Error> {
        let mut document = self.fetch(project_id, locale).await?;

        let untranslated_terms: Option<HashSet<String>> = options.untranslated.then(|| {
            document
                .translations
                .iter()
                .filter(|r| !r.is_translated())
                .map(|r| r.term.clone())
                .collect()
        });

        if let Some(fallback_code) = options.fallback_locale.as_deref() {
            document = self
                .merge_fallback(project_id, document, fallback_code)
                .await?;
        }

        if let Some(terms) = untranslated_terms {
            document = document.retain_terms(&terms);
        }

        debug!(
            project_id,
            locale = %locale.code,
            entries = document.len(),
            "Collected translations"
        );
        Ok(document)
    }

    async fn fetch(
        &self,
        project_id: &str,
        locale: &ProjectLocale,
    ) -> Result<TranslationDocument, Error> {
        let rows = self
            .store
            .terms_with_translations(project_id, locale)
            .await?;
        let translations = rows
            .iter()
            .map(|row| TranslationRecord::new(row.term.as_str(), row.translation()))
            .collect();
        Ok(TranslationDocument::new(locale.code.as_str(), translations))
    }

    async fn merge_fallback(
        &self,
        project_id: &str,
        primary: TranslationDocument,
        fallback_code: &str,
    ) -> Result<TranslationDocument, Error> {
        let Some(fallback_locale) = self
            .store
            .find_project_locale(project_id, fallback_code)
            .await?
        else {
            warn!(
                project_id,
                fallback_locale = fallback_code,
                "Fallback locale is not configured for the project, ignoring it"
            );
            return Ok(primary);
        };

        let fallback = self.fetch(project_id, &fallback_locale).await?;
        Ok(primary.translated_only().with_fallback(&fallback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    async fn collector() -> Collector {
        let store = MemoryStore::new();
        store.add_project("1", &["en", "fr", "de"]).await;
        for (term, locale, value) in [
            ("b.title", "en", "Title"),
            ("b.title", "fr", "Titre"),
            ("a.ok", "en", "OK"),
            ("c.cancel", "en", "Cancel"),
            ("c.cancel", "de", "Abbrechen"),
        ] {
            store.add_translation("1", term, locale, value).await.unwrap();
        }
        Collector::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_collect_sorted_with_empty_gaps() {
        let collector = collector().await;
        let document = collector
            .collect("1", "fr", &CollectOptions::default())
            .await
            .unwrap();
        assert_eq!(document.iso, "fr");
        assert_eq!(
            document.translations,
            vec![
                TranslationRecord::new("a.ok", ""),
                TranslationRecord::new("b.title", "Titre"),
                TranslationRecord::new("c.cancel", ""),
            ]
        );
    }

    #[tokio::test]
    async fn test_collect_rejects_empty_and_unknown_locales() {
        let collector = collector().await;
        let options = CollectOptions::default();
        assert!(matches!(
            collector.collect("1", " ", &options).await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            collector.collect("1", "ja", &options).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_untranslated_only() {
        let collector = collector().await;
        let document = collector
            .collect("1", "fr", &CollectOptions::default().untranslated(true))
            .await
            .unwrap();
        assert_eq!(document.terms().collect::<Vec<_>>(), vec!["a.ok", "c.cancel"]);
        assert!(document.translations.iter().all(|r| r.translation.is_empty()));
    }

    #[tokio::test]
    async fn test_fallback_fills_gaps() {
        let collector = collector().await;
        let document = collector
            .collect("1", "fr", &CollectOptions::default().fallback("en"))
            .await
            .unwrap();
        assert_eq!(document.iso, "fr");
        assert_eq!(document.get("a.ok"), Some("OK"));
        assert_eq!(document.get("b.title"), Some("Titre"));
        assert_eq!(document.get("c.cancel"), Some("Cancel"));
    }

    #[tokio::test]
    async fn test_untranslated_with_fallback() {
        let collector = collector().await;
        let options = CollectOptions::default().untranslated(true).fallback("de");
        let document = collector.collect("1", "fr", &options).await.unwrap();
        assert_eq!(
            document.translations,
            vec![
                TranslationRecord::new("a.ok", ""),
                TranslationRecord::new("c.cancel", "Abbrechen"),
            ]
        );
    }

    #[tokio::test]
    async fn test_unconfigured_fallback_is_ignored() {
        let collector = collector().await;
        let plain = collector
            .collect("1", "fr", &CollectOptions::default())
            .await
            .unwrap();
        let with_fallback = collector
            .collect("1", "fr", &CollectOptions::default().fallback("ja"))
            .await
            .unwrap();
        assert_eq!(plain, with_fallback);
    }
}
