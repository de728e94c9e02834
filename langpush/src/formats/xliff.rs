//! Support for XLIFF 1.2 documents.
//!
//! One `<file>` element per document, one `<trans-unit>` per term. The term
//! is both the unit `id` and its `<source>`; the translation is the `<target>`.

use std::{
    fmt::{Display, Formatter},
    io::{BufRead, Write},
    str::FromStr,
};

use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::{
    error::Error,
    formats::xml,
    traits::Parser,
    types::{TranslationDocument, TranslationRecord},
};

const XLIFF_1_2_NAMESPACE: &str = "urn:oasis:names:tc:xliff:document:1.2";

/// XLIFF versions the exporter can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum XliffVersion {
    #[default]
    V1_2,
}

impl Display for XliffVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            XliffVersion::V1_2 => write!(f, "1.2"),
        }
    }
}

impl FromStr for XliffVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1.2" => Ok(XliffVersion::V1_2),
            other => Err(Error::UnsupportedFormat(format!("xliff {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Format {
    pub version: XliffVersion,
    /// Used for `original`, `source-language` and `target-language`.
    pub language: String,
    pub units: Vec<TransUnit>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransUnit {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl Format {
    pub fn new(version: XliffVersion, document: TranslationDocument) -> Self {
        Format {
            version,
            ..Format::from(document)
        }
    }
}

impl Parser for Format {
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut xml_reader = xml::reader(reader);
        let mut buf = Vec::new();
        let mut format = Format::default();
        let mut current: Option<TransUnit> = None;

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Start(ref e) if e.name().as_ref() == b"xliff" => {
                    if let Some(version) = xml::attribute(e, b"version")? {
                        format.version = version.parse()?;
                    }
                }
                Event::Start(ref e) | Event::Empty(ref e) if e.name().as_ref() == b"file" => {
                    let language = match xml::attribute(e, b"target-language")? {
                        Some(language) => Some(language),
                        None => xml::attribute(e, b"source-language")?,
                    };
                    format.language = language.unwrap_or_default();
                }
                Event::Start(ref e) if e.name().as_ref() == b"trans-unit" => {
                    let id = xml::attribute(e, b"id")?.ok_or_else(|| {
                        Error::InvalidResource("trans-unit missing 'id'".to_string())
                    })?;
                    current = Some(TransUnit {
                        id,
                        source: String::new(),
                        target: String::new(),
                    });
                }
                Event::Start(ref e) if e.name().as_ref() == b"source" => {
                    let text = xml::read_text(&mut xml_reader, b"source")?;
                    if let Some(unit) = current.as_mut() {
                        unit.source = text;
                    }
                }
                Event::Start(ref e) if e.name().as_ref() == b"target" => {
                    let text = xml::read_text(&mut xml_reader, b"target")?;
                    if let Some(unit) = current.as_mut() {
                        unit.target = text;
                    }
                }
                Event::End(ref e) if e.name().as_ref() == b"trans-unit" => {
                    if let Some(unit) = current.take() {
                        format.units.push(unit);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(format)
    }

    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        xml::check_chars(&self.language)?;
        for unit in &self.units {
            xml::check_chars(&unit.id)?;
            xml::check_chars(&unit.source)?;
            xml::check_chars(&unit.target)?;
        }

        let mut xml_writer = Writer::new(&mut writer);
        let version = self.version.to_string();

        xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        xml_writer.write_event(Event::Text(BytesText::new("\n")))?;

        let mut root = BytesStart::new("xliff");
        root.push_attribute(("version", version.as_str()));
        root.push_attribute(("xmlns", XLIFF_1_2_NAMESPACE));
        xml_writer.write_event(Event::Start(root))?;
        xml_writer.write_event(Event::Text(BytesText::new("\n  ")))?;

        let mut file = BytesStart::new("file");
        file.push_attribute(("original", self.language.as_str()));
        file.push_attribute(("datatype", "plaintext"));
        file.push_attribute(("source-language", self.language.as_str()));
        file.push_attribute(("target-language", self.language.as_str()));
        xml_writer.write_event(Event::Start(file))?;
        xml_writer.write_event(Event::Text(BytesText::new("\n    ")))?;
        xml_writer.write_event(Event::Start(BytesStart::new("body")))?;
        xml_writer.write_event(Event::Text(BytesText::new("\n")))?;

        for unit in &self.units {
            let mut elem = BytesStart::new("trans-unit");
            elem.push_attribute(("id", unit.id.as_str()));
            xml_writer.write_event(Event::Text(BytesText::new("      ")))?;
            xml_writer.write_event(Event::Start(elem))?;

            for (tag, text) in [("source", &unit.source), ("target", &unit.target)] {
                xml_writer.write_event(Event::Text(BytesText::new("\n        ")))?;
                xml_writer.write_event(Event::Start(BytesStart::new(tag)))?;
                xml_writer.write_event(Event::Text(xml::text(text)))?;
                xml_writer.write_event(Event::End(BytesEnd::new(tag)))?;
            }

            xml_writer.write_event(Event::Text(BytesText::new("\n      ")))?;
            xml_writer.write_event(Event::End(BytesEnd::new("trans-unit")))?;
            xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
        }

        xml_writer.write_event(Event::Text(BytesText::new("    ")))?;
        xml_writer.write_event(Event::End(BytesEnd::new("body")))?;
        xml_writer.write_event(Event::Text(BytesText::new("\n  ")))?;
        xml_writer.write_event(Event::End(BytesEnd::new("file")))?;
        xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
        xml_writer.write_event(Event::End(BytesEnd::new("xliff")))?;
        xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
        Ok(())
    }
}

impl From<TranslationDocument> for Format {
    fn from(value: TranslationDocument) -> Self {
        Format {
            version: XliffVersion::default(),
            language: value.iso,
            units: value
                .translations
                .into_iter()
                .map(|r| TransUnit {
                    id: r.term.clone(),
                    source: r.term,
                    target: r.translation,
                })
                .collect(),
        }
    }
}

impl From<Format> for TranslationDocument {
    fn from(value: Format) -> Self {
        TranslationDocument::new(
            value.language,
            value
                .units
                .into_iter()
                .map(|unit| TranslationRecord::new(unit.id, unit.target))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_version_parsing() {
        assert_eq!("1.2".parse::<XliffVersion>().unwrap(), XliffVersion::V1_2);
        assert!(matches!(
            "2.0".parse::<XliffVersion>(),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_write_xliff() {
        let document = TranslationDocument::from_pairs("fr", [("save", "Enregistrer")]);
        let out = String::from_utf8(
            Format::new(XliffVersion::V1_2, document)
                .to_bytes()
                .unwrap(),
        )
        .unwrap();
        assert_eq!(
            out,
            indoc! {r#"
            <?xml version="1.0" encoding="utf-8"?>
            <xliff version="1.2" xmlns="urn:oasis:names:tc:xliff:document:1.2">
              <file original="fr" datatype="plaintext" source-language="fr" target-language="fr">
                <body>
                  <trans-unit id="save">
                    <source>save</source>
                    <target>Enregistrer</target>
                  </trans-unit>
                </body>
              </file>
            </xliff>
            "#}
        );
    }

    #[test]
    fn test_parse_takes_term_from_id() {
        let xml = r#"<xliff version="1.2"><file source-language="en" target-language="de">
            <body>
              <trans-unit id="menu.open"><source>Open</source><target>Öffnen</target></trans-unit>
              <trans-unit id="menu.close"><source>Close</source></trans-unit>
            </body></file></xliff>"#;
        let document = TranslationDocument::from(Format::from_str(xml).unwrap());
        assert_eq!(document.iso, "de");
        assert_eq!(document.get("menu.open"), Some("Öffnen"));
        assert_eq!(document.get("menu.close"), Some(""));
    }

    #[test]
    fn test_control_characters_are_rejected() {
        let document = TranslationDocument::from_pairs("fr", [("escape\u{1B}", "ok")]);
        let err = Format::new(XliffVersion::V1_2, document).to_bytes().unwrap_err();
        assert!(err.to_string().contains("U+001B"), "{}", err);
    }

    #[test]
    fn test_unsupported_version_is_rejected() {
        let xml = r#"<xliff version="2.0"><file/></xliff>"#;
        assert!(matches!(
            Format::from_str(xml),
            Err(Error::UnsupportedFormat(_))
        ));
    }
}
