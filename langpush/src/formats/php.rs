//! Support for PHP array files (`return [ 'term' => 'translation', ];`).
//!
//! Only single-quoted string literals are read. Inside them PHP recognises
//! just two escapes, `\\` and `\'`; every other backslash is literal.

use std::io::{BufRead, Write};

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    error::Error,
    traits::Parser,
    types::{TranslationDocument, TranslationRecord},
};

lazy_static! {
    /// A `'key' => 'value'` pair, or a line comment to skip.
    static ref ENTRY_REGEX: Regex = Regex::new(
        r"(?s)'((?:[^'\\]|\\.)*)'\s*=>\s*'((?:[^'\\]|\\.)*)'|//[^\n]*|#[^\n]*"
    )
    .unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Format {
    pub entries: Vec<(String, String)>,
}

impl Parser for Format {
    fn from_reader<R: BufRead>(mut reader: R) -> Result<Self, Error> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;

        let body = content
            .trim_start()
            .strip_prefix("<?php")
            .ok_or_else(|| Error::InvalidResource("PHP file must start with `<?php`".to_string()))?;
        if !body.contains("return") {
            return Err(Error::InvalidResource(
                "PHP file must return an array".to_string(),
            ));
        }

        let entries = ENTRY_REGEX
            .captures_iter(body)
            .filter_map(|caps| {
                let key = caps.get(1)?.as_str();
                let value = caps.get(2)?.as_str();
                Some((unescape(key), unescape(value)))
            })
            .collect();

        Ok(Format { entries })
    }

    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        writeln!(writer, "<?php")?;
        writeln!(writer)?;
        writeln!(writer, "return [")?;
        for (key, value) in &self.entries {
            writeln!(writer, "    '{}' => '{}',", escape(key), escape(value))?;
        }
        writeln!(writer, "];")?;
        Ok(())
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && matches!(chars.peek(), Some('\\') | Some('\'')) {
            if let Some(next) = chars.next() {
                out.push(next);
            }
            continue;
        }
        out.push(c);
    }
    out
}

impl From<TranslationDocument> for Format {
    fn from(value: TranslationDocument) -> Self {
        Format {
            entries: value
                .translations
                .into_iter()
                .map(|r| (r.term, r.translation))
                .collect(),
        }
    }
}

impl From<Format> for TranslationDocument {
    fn from(value: Format) -> Self {
        TranslationDocument::new(
            String::new(),
            value
                .entries
                .into_iter()
                .map(|(term, translation)| TranslationRecord::new(term, translation))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_write_php_array() {
        let document = TranslationDocument::from_pairs(
            "it",
            [("welcome", "Benvenuto all'app"), ("path", "C:\\tmp")],
        );
        let out = String::from_utf8(Format::from(document).to_bytes().unwrap()).unwrap();
        assert_eq!(
            out,
            indoc! {r#"
            <?php

            return [
                'path' => 'C:\\tmp',
                'welcome' => 'Benvenuto all\'app',
            ];
            "#}
        );
    }

    #[test]
    fn test_parse_with_comments_and_literal_backslashes() {
        let content = indoc! {r#"
            <?php
            // generated
            return [
                # section
                'a' => 'line\nstays literal',
                'b'=>'it\'s',
            ];
        "#};
        let format = Format::from_str(content).unwrap();
        assert_eq!(
            format.entries,
            vec![
                ("a".to_string(), "line\\nstays literal".to_string()),
                ("b".to_string(), "it's".to_string()),
            ]
        );
    }

    #[test]
    fn test_round_trip_quotes_and_arrows() {
        let document = TranslationDocument::from_pairs(
            "it",
            [("x => y", "'quoted' \\ value"), ("multi", "a\nb"), ("empty", "")],
        );
        let bytes = Format::from(document.clone()).to_bytes().unwrap();
        let parsed = TranslationDocument::from(Format::from_bytes(&bytes).unwrap());
        assert_eq!(parsed.translations, document.translations);
    }

    #[test]
    fn test_missing_open_tag_is_rejected() {
        assert!(Format::from_str("return ['a' => 'b'];").is_err());
    }
}
