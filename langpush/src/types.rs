//! Core, format-agnostic types for langpush.
//! Collectors build these; exporters serialize these.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use unic_langid::LanguageIdentifier;

use crate::error::Error;

/// One term of a project together with its translation for a single locale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct TranslationRecord {
    /// The locale-independent key.
    pub term: String,

    /// The translated value, empty when the term is untranslated.
    #[serde(default)]
    pub translation: String,
}

impl TranslationRecord {
    pub fn new(term: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            translation: translation.into(),
        }
    }

    pub fn is_translated(&self) -> bool {
        !self.translation.is_empty()
    }
}

/// All translations of a project for one locale.
///
/// This is the only shape handed from the collector to the exporters.
/// Records are kept sorted by term, ascending.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct TranslationDocument {
    /// Locale code, e.g. `fr` or `pt_BR`.
    pub iso: String,

    #[serde(default)]
    pub translations: Vec<TranslationRecord>,
}

impl TranslationDocument {
    /// Builds a document, ordering the records by term.
    pub fn new(iso: impl Into<String>, mut translations: Vec<TranslationRecord>) -> Self {
        translations.sort_by(|a, b| a.term.cmp(&b.term));
        Self {
            iso: iso.into(),
            translations,
        }
    }

    /// Builds a document from `(term, translation)` pairs.
    pub fn from_pairs<I, K, V>(iso: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let translations = pairs
            .into_iter()
            .map(|(term, translation)| TranslationRecord::new(term, translation))
            .collect();
        Self::new(iso, translations)
    }

    pub fn len(&self) -> usize {
        self.translations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translations.is_empty()
    }

    /// Looks up the translation of a term.
    pub fn get(&self, term: &str) -> Option<&str> {
        self.translations
            .iter()
            .find(|r| r.term == term)
            .map(|r| r.translation.as_str())
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.translations.iter().map(|r| r.term.as_str())
    }

    /// Keeps only the entries that have no translation yet.
    pub fn untranslated_only(mut self) -> Self {
        self.translations.retain(|r| !r.is_translated());
        self
    }

    /// Keeps only the entries that carry a translation.
    pub fn translated_only(mut self) -> Self {
        self.translations.retain(TranslationRecord::is_translated);
        self
    }

    /// Keeps only the entries whose term is in `terms`.
    pub fn retain_terms(mut self, terms: &HashSet<String>) -> Self {
        self.translations.retain(|r| terms.contains(&r.term));
        self
    }

    /// Overlays this document onto `fallback`.
    ///
    /// For every term the result holds this document's translation when it
    /// is non-empty, otherwise the fallback translation. Terms are matched by
    /// value. The result follows the fallback order, followed by terms that
    /// only exist in this document. The locale code of `self` is kept.
    pub fn with_fallback(&self, fallback: &TranslationDocument) -> TranslationDocument {
        let primary: HashMap<&str, &str> = self
            .translations
            .iter()
            .filter(|r| r.is_translated())
            .map(|r| (r.term.as_str(), r.translation.as_str()))
            .collect();

        let mut seen = HashSet::with_capacity(fallback.len());
        let mut merged = Vec::with_capacity(fallback.len().max(self.len()));

        for record in &fallback.translations {
            if !seen.insert(record.term.as_str()) {
                continue;
            }
            let translation = primary
                .get(record.term.as_str())
                .copied()
                .unwrap_or(record.translation.as_str());
            merged.push(TranslationRecord::new(record.term.as_str(), translation));
        }

        for record in &self.translations {
            if seen.insert(record.term.as_str()) {
                merged.push(record.clone());
            }
        }

        TranslationDocument {
            iso: self.iso.clone(),
            translations: merged,
        }
    }

    pub fn language_identifier(&self) -> Result<LanguageIdentifier, Error> {
        parse_locale_code(&self.iso)
    }
}

/// Parses a locale code such as `en`, `pt-BR` or `zh_Hant_TW`.
pub fn parse_locale_code(code: &str) -> Result<LanguageIdentifier, Error> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return Err(Error::validation_error("locale code is empty"));
    }
    trimmed
        .parse::<LanguageIdentifier>()
        .map_err(|e| Error::validation_error(format!("invalid locale code `{}`: {}", code, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(iso: &str, pairs: &[(&str, &str)]) -> TranslationDocument {
        TranslationDocument::from_pairs(iso, pairs.iter().copied())
    }

    #[test]
    fn test_new_sorts_by_term() {
        let document = doc("en", &[("b", "B"), ("a.b", "AB"), ("a", "A"), ("B", "upper")]);
        let terms: Vec<_> = document.terms().collect();
        assert_eq!(terms, vec!["B", "a", "a.b", "b"]);
    }

    #[test]
    fn test_untranslated_and_translated_filters() {
        let document = doc("fr", &[("a", "A"), ("b", ""), ("c", "C")]);
        let untranslated = document.clone().untranslated_only();
        assert_eq!(untranslated.terms().collect::<Vec<_>>(), vec!["b"]);
        let translated = document.translated_only();
        assert_eq!(translated.terms().collect::<Vec<_>>(), vec!["a", "c"]);
    }

    #[test]
    fn test_with_fallback_primary_wins() {
        let primary = doc("fr", &[("hello", "Bonjour"), ("bye", ""), ("only_fr", "Seul")]);
        let fallback = doc("en", &[("hello", "Hello"), ("bye", "Goodbye"), ("thanks", "")]);

        let merged = primary.with_fallback(&fallback);
        assert_eq!(merged.iso, "fr");
        assert_eq!(merged.get("hello"), Some("Bonjour"));
        assert_eq!(merged.get("bye"), Some("Goodbye"));
        assert_eq!(merged.get("thanks"), Some(""));
        assert_eq!(merged.get("only_fr"), Some("Seul"));
        // Fallback order first, then primary-only terms.
        assert_eq!(
            merged.terms().collect::<Vec<_>>(),
            vec!["bye", "hello", "thanks", "only_fr"]
        );
    }

    #[test]
    fn test_with_fallback_does_not_mutate_inputs() {
        let primary = doc("de", &[("a", "")]);
        let fallback = doc("en", &[("a", "A")]);
        let _ = primary.with_fallback(&fallback);
        assert_eq!(primary.get("a"), Some(""));
        assert_eq!(fallback.get("a"), Some("A"));
    }

    #[test]
    fn test_parse_locale_code() {
        assert_eq!(parse_locale_code("pt_BR").unwrap().to_string(), "pt-BR");
        assert!(parse_locale_code("en").is_ok());
        assert!(matches!(parse_locale_code(""), Err(Error::Validation(_))));
        assert!(matches!(
            parse_locale_code("not a locale"),
            Err(Error::Validation(_))
        ));
    }
}
