use langpush::formats::{FormatType, export, import};
use langpush::types::{TranslationDocument, TranslationRecord};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn term_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z0-9_]{0,15}").expect("valid term regex")
}

fn translation_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex(
        "[ \t]?[A-Za-z0-9 _\\-\\.,!\\?'\"&<>:;#@/\\\\=éü\t\r😀]{0,24}",
    )
    .expect("valid translation regex")
}

/// Terms made of the characters each format has to escape.
fn special_term_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9 _\\-\\.,!\\?'\"&<>:;#@/\\\\=éü😀]{1,16}")
        .expect("valid special term regex")
}

/// Same as [`special_term_strategy`] without the `.` nesting delimiter.
fn undotted_special_term_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9 _\\-,!\\?'\"&<>:;#@/\\\\=éü😀]{1,16}")
        .expect("valid special term regex")
}

fn multiline_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z ]{1,8}\n[A-Za-z\t ]{1,8}").expect("valid regex")
}

fn dataset_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map(term_strategy(), translation_strategy(), 1..8)
}

fn build_document(iso: &str, values: &BTreeMap<String, String>) -> TranslationDocument {
    TranslationDocument::new(
        iso,
        values
            .iter()
            .map(|(term, translation)| TranslationRecord::new(term.as_str(), translation.as_str()))
            .collect(),
    )
}

fn roundtrip(format: FormatType, document: &TranslationDocument) -> Result<TranslationDocument, TestCaseError> {
    let bytes = export(format, document).map_err(|e| TestCaseError::fail(e.to_string()))?;
    import(format, &bytes, &document.iso).map_err(|e| {
        TestCaseError::fail(format!(
            "{} failed to read back: {}\n{}",
            format,
            e,
            String::from_utf8_lossy(&bytes)
        ))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn every_format_roundtrips_special_characters(values in dataset_strategy()) {
        let document = build_document("en", &values);
        for format in FormatType::ALL {
            let parsed = roundtrip(format, &document)?;
            prop_assert_eq!(&parsed, &document, "format {}", format);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn flat_formats_roundtrip_special_character_terms(
        values in prop::collection::btree_map(special_term_strategy(), translation_strategy(), 1..8)
    ) {
        let document = build_document("en", &values);
        // Android resource names are sanitized; nested formats split on `.`.
        for format in FormatType::ALL.into_iter().filter(|f| {
            !matches!(f, FormatType::AndroidXml | FormatType::JsonNested | FormatType::YamlNested)
        }) {
            let parsed = roundtrip(format, &document)?;
            prop_assert_eq!(&parsed, &document, "format {}", format);
        }
    }

    #[test]
    fn nested_formats_roundtrip_special_character_terms(
        values in prop::collection::btree_map(undotted_special_term_strategy(), translation_strategy(), 1..8)
    ) {
        let document = build_document("en", &values);
        for format in [FormatType::JsonNested, FormatType::YamlNested] {
            let parsed = roundtrip(format, &document)?;
            prop_assert_eq!(&parsed, &document, "format {}", format);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn every_format_roundtrips_line_breaks(term in term_strategy(), value in multiline_strategy()) {
        let document = TranslationDocument::from_pairs("fr", [(term, value)]);
        for format in FormatType::ALL {
            let parsed = roundtrip(format, &document)?;
            prop_assert_eq!(&parsed, &document, "format {}", format);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn nested_formats_roundtrip_dotted_terms(
        groups in prop::collection::btree_map(term_strategy(), dataset_strategy(), 1..4)
    ) {
        // Every leaf sits at depth two, so no path is both a leaf and an object.
        let values: BTreeMap<String, String> = groups
            .iter()
            .flat_map(|(group, leaves)| {
                leaves
                    .iter()
                    .map(move |(leaf, value)| (format!("{}.{}", group, leaf), value.clone()))
            })
            .collect();
        let document = build_document("de", &values);

        for format in [FormatType::JsonNested, FormatType::YamlNested] {
            let parsed = roundtrip(format, &document)?;
            prop_assert_eq!(&parsed, &document, "format {}", format);
        }
    }
}
