//! Support for Android `strings.xml` localization format.
//!
//! Terms become `<string name="...">` resources. Terms are free text while
//! resource names must be Java identifiers, so names are sanitized on export
//! and an imported file yields the sanitized names as terms.

use std::{
    collections::HashSet,
    io::{BufRead, Write},
};

use lazy_static::lazy_static;
use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use regex::Regex;

use crate::{
    error::Error,
    formats::xml,
    traits::Parser,
    types::{TranslationDocument, TranslationRecord},
};

lazy_static! {
    static ref INVALID_NAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9_]").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Format {
    pub strings: Vec<StringResource>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringResource {
    pub name: String,
    /// Unescaped value as the app sees it.
    pub value: String,
}

impl Parser for Format {
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut xml_reader = xml::reader(reader);
        let mut buf = Vec::new();
        let mut strings = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Start(ref e) if e.name().as_ref() == b"string" => {
                    let name = string_name(e)?;
                    let raw = xml::read_text(&mut xml_reader, b"string")?;
                    strings.push(StringResource {
                        name,
                        value: unescape(&raw),
                    });
                }
                Event::Empty(ref e) if e.name().as_ref() == b"string" => {
                    strings.push(StringResource {
                        name: string_name(e)?,
                        value: String::new(),
                    });
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(Format { strings })
    }

    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        let mut xml_writer = Writer::new(&mut writer);

        xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
        xml_writer.write_event(Event::Start(BytesStart::new("resources")))?;
        xml_writer.write_event(Event::Text(BytesText::new("\n")))?;

        for sr in &self.strings {
            let mut elem = BytesStart::new("string");
            elem.push_attribute(("name", sr.name.as_str()));

            xml_writer.write_event(Event::Text(BytesText::new("    ")))?;
            xml_writer.write_event(Event::Start(elem))?;
            xml_writer.write_event(Event::Text(BytesText::new(&escape(&sr.value))))?;
            xml_writer.write_event(Event::End(BytesEnd::new("string")))?;
            xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
        }

        xml_writer.write_event(Event::End(BytesEnd::new("resources")))?;
        xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
        Ok(())
    }
}

fn string_name(e: &BytesStart) -> Result<String, Error> {
    xml::attribute(e, b"name")?
        .ok_or_else(|| Error::InvalidResource("string tag missing 'name'".to_string()))
}

/// Turns a term into a valid resource name.
pub fn sanitize_name(term: &str) -> String {
    let mut name = INVALID_NAME_CHARS.replace_all(term, "_").into_owned();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

/// Sanitizes every term, suffixing `_2`, `_3`... on collisions.
fn unique_names<'a>(terms: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    terms
        .map(|term| {
            let base = sanitize_name(term);
            let mut name = base.clone();
            let mut n = 2;
            while !seen.insert(name.clone()) {
                name = format!("{}_{}", base, n);
                n += 1;
            }
            name
        })
        .collect()
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for (i, c) in value.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\u000D"),
            '@' | '?' if i == 0 => {
                out.push('\\');
                out.push(c);
            }
            c if !xml::is_xml_char(c) => out.push_str(&format!("\\u{:04X}", c as u32)),
            _ => out.push(c),
        }
    }
    out
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if hex.len() == 4 => out.push(decoded),
                    _ => {
                        out.push('u');
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

impl From<TranslationDocument> for Format {
    fn from(value: TranslationDocument) -> Self {
        let names = unique_names(value.terms());
        Format {
            strings: names
                .into_iter()
                .zip(value.translations)
                .map(|(name, record)| StringResource {
                    name,
                    value: record.translation,
                })
                .collect(),
        }
    }
}

impl From<Format> for TranslationDocument {
    fn from(value: Format) -> Self {
        TranslationDocument::new(
            String::new(),
            value
                .strings
                .into_iter()
                .map(|sr| TranslationRecord::new(sr.name, sr.value))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("app.title"), "app_title");
        assert_eq!(sanitize_name("1st place"), "_1st_place");
        assert_eq!(sanitize_name(""), "_");
        assert_eq!(sanitize_name("héllo-world"), "h_llo_world");
        assert_eq!(sanitize_name("already_ok"), "already_ok");
    }

    #[test]
    fn test_duplicate_names_get_suffixes() {
        let names = unique_names(["a.b", "a-b", "a b", "a_b_2"].into_iter());
        assert_eq!(names, vec!["a_b", "a_b_2", "a_b_3", "a_b_2_2"]);
    }

    #[test]
    fn test_escape_value() {
        assert_eq!(escape("It's \"fine\""), "It\\'s \\\"fine\\\"");
        assert_eq!(escape("@string/x"), "\\@string/x");
        assert_eq!(escape("?attr and @ later"), "\\?attr and @ later");
        assert_eq!(escape("a\\b\nc\td"), "a\\\\b\\nc\\td");
    }

    #[test]
    fn test_control_characters_use_unicode_escapes() {
        assert_eq!(escape("a\u{1}b\u{FFFF}"), "a\\u0001b\\uFFFF");
        assert_eq!(escape("line\r\n"), "line\\u000D\\n");
        assert_eq!(unescape("a\\u0001b\\u00e9"), "a\u{1}bé");
        assert_eq!(unescape("bad \\uZZ"), "bad uZZ");

        let document =
            TranslationDocument::from_pairs("fr", [("bell", "ding\u{7}dong"), ("crlf", "a\r\nb")]);
        let bytes = Format::from(document.clone()).to_bytes().unwrap();
        assert!(String::from_utf8(bytes.clone()).unwrap().contains("ding\\u0007dong"));
        let parsed = TranslationDocument::from(Format::from_bytes(&bytes).unwrap());
        assert_eq!(parsed.translations, document.translations);
    }

    #[test]
    fn test_write_strings_xml() {
        let document = TranslationDocument::from_pairs(
            "fr",
            [("menu.open", "Ouvrir <b>"), ("plus", "a & b")],
        );
        let out = String::from_utf8(Format::from(document).to_bytes().unwrap()).unwrap();
        assert_eq!(
            out,
            indoc! {r#"
            <?xml version="1.0" encoding="utf-8"?>
            <resources>
                <string name="menu_open">Ouvrir &lt;b&gt;</string>
                <string name="plus">a &amp; b</string>
            </resources>
            "#}
        );
    }

    #[test]
    fn test_parse_strings_xml() {
        let xml = r#"
        <resources>
            <string name="hello">  Hello\nthere  </string>
            <string name="quote">It\'s &amp; \"ok\"</string>
            <string name="empty"/>
            <plurals name="ignored"><item quantity="one">x</item></plurals>
        </resources>
        "#;
        let format = Format::from_str(xml).unwrap();
        assert_eq!(format.strings.len(), 3);
        assert_eq!(format.strings[0].value, "  Hello\nthere  ");
        assert_eq!(format.strings[1].value, "It's & \"ok\"");
        assert_eq!(format.strings[2].value, "");
    }

    #[test]
    fn test_round_trip_with_identifier_terms() {
        let document = TranslationDocument::from_pairs(
            "de",
            [("greeting", "Hallo \"Welt\"\n\t@home"), ("empty", "")],
        );
        let bytes = Format::from(document.clone()).to_bytes().unwrap();
        let parsed = TranslationDocument::from(Format::from_bytes(&bytes).unwrap());
        assert_eq!(parsed.translations, document.translations);
    }
}
