//! Support for .NET `.resx` resource files.
//!
//! The writer emits the four standard `resheader` entries followed by one
//! `<data name="..." xml:space="preserve">` element per term.

use std::io::{BufRead, Write};

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

const RESX_READER: &str = "System.Resources.ResXResourceReader, System.Windows.Forms, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089";
const RESX_WRITER: &str = "System.Resources.ResXResourceWriter, System.Windows.Forms, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089";

const RESHEADERS: [(&str, &str); 4] = [
    ("resmimetype", "text/microsoft-resx"),
    ("version", "2.0"),
    ("reader", RESX_READER),
    ("writer", RESX_WRITER),
];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Format {
    pub data: Vec<DataEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataEntry {
    pub name: String,
    pub value: String,
}

impl Parser for Format {
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut xml_reader = xml::reader(reader);
        let mut buf = Vec::new();
        let mut data = Vec::new();
        let mut current: Option<DataEntry> = None;

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Start(ref e) if e.name().as_ref() == b"data" => {
                    current = Some(DataEntry {
                        name: data_name(e)?,
                        value: String::new(),
                    });
                }
                Event::Empty(ref e) if e.name().as_ref() == b"data" => {
                    data.push(DataEntry {
                        name: data_name(e)?,
                        value: String::new(),
                    });
                }
                Event::Start(ref e) if e.name().as_ref() == b"value" => {
                    let text = xml::read_text(&mut xml_reader, b"value")?;
                    if let Some(entry) = current.as_mut() {
                        entry.value = text;
                    }
                }
                Event::End(ref e) if e.name().as_ref() == b"data" => {
                    if let Some(entry) = current.take() {
                        data.push(entry);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(Format { data })
    }

    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        let mut xml_writer = Writer::new(&mut writer);

        xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
        xml_writer.write_event(Event::Start(BytesStart::new("root")))?;
        xml_writer.write_event(Event::Text(BytesText::new("\n")))?;

        for (name, value) in RESHEADERS {
            let mut elem = BytesStart::new("resheader");
            elem.push_attribute(("name", name));
            write_entry(&mut xml_writer, elem, value)?;
        }

        for entry in &self.data {
            xml::check_chars(&entry.name)?;
            xml::check_chars(&entry.value)?;
            let mut elem = BytesStart::new("data");
            elem.push_attribute(("name", entry.name.as_str()));
            elem.push_attribute(("xml:space", "preserve"));
            write_entry(&mut xml_writer, elem, &entry.value)?;
        }

        xml_writer.write_event(Event::End(BytesEnd::new("root")))?;
        xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
        Ok(())
    }
}

/// Writes `elem` wrapping a single `<value>` child.
fn write_entry<W: Write>(
    xml_writer: &mut Writer<W>,
    elem: BytesStart,
    value: &str,
) -> Result<(), Error> {
    let tag = String::from_utf8_lossy(elem.name().as_ref()).into_owned();

    xml_writer.write_event(Event::Text(BytesText::new("  ")))?;
    xml_writer.write_event(Event::Start(elem))?;
    xml_writer.write_event(Event::Text(BytesText::new("\n    ")))?;
    xml_writer.write_event(Event::Start(BytesStart::new("value")))?;
    xml_writer.write_event(Event::Text(xml::text(value)))?;
    xml_writer.write_event(Event::End(BytesEnd::new("value")))?;
    xml_writer.write_event(Event::Text(BytesText::new("\n  ")))?;
    xml_writer.write_event(Event::End(BytesEnd::new(tag)))?;
    xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
    Ok(())
}

fn data_name(e: &BytesStart) -> Result<String, Error> {
    xml::attribute(e, b"name")?
        .ok_or_else(|| Error::InvalidResource("data tag missing 'name'".to_string()))
}

impl From<TranslationDocument> for Format {
    fn from(value: TranslationDocument) -> Self {
        Format {
            data: value
                .translations
                .into_iter()
                .map(|r| DataEntry {
                    name: r.term,
                    value: r.translation,
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
                .data
                .into_iter()
                .map(|entry| TranslationRecord::new(entry.name, entry.value))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_resx() {
        let document = TranslationDocument::from_pairs("nl", [("Greeting", "Hallo <wereld> & co")]);
        let out = String::from_utf8(Format::from(document).to_bytes().unwrap()).unwrap();

        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<root>\n"));
        assert!(out.contains(
            "  <resheader name=\"resmimetype\">\n    <value>text/microsoft-resx</value>\n  </resheader>\n"
        ));
        assert!(out.contains(
            "  <data name=\"Greeting\" xml:space=\"preserve\">\n    <value>Hallo &lt;wereld&gt; &amp; co</value>\n  </data>\n"
        ));
        assert!(out.ends_with("</root>\n"));
    }

    #[test]
    fn test_parse_resx_skips_headers_and_comments() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<root>
  <resheader name="version"><value>2.0</value></resheader>
  <data name="Title" xml:space="preserve">
    <value> Main  window </value>
    <comment>shown in the title bar</comment>
  </data>
  <data name="Empty" />
</root>"#;
        let format = Format::from_str(xml).unwrap();
        assert_eq!(
            format.data,
            vec![
                DataEntry {
                    name: "Title".to_string(),
                    value: " Main  window ".to_string()
                },
                DataEntry {
                    name: "Empty".to_string(),
                    value: String::new()
                },
            ]
        );
    }

    #[test]
    fn test_control_characters_are_rejected() {
        for (term, value) in [("bell", "ding\u{7}"), ("tab\u{1}", "x")] {
            let document = TranslationDocument::from_pairs("nl", [(term, value)]);
            assert!(matches!(
                Format::from(document).to_bytes(),
                Err(Error::InvalidResource(_))
            ));
        }
    }

    #[test]
    fn test_round_trip() {
        let document = TranslationDocument::from_pairs(
            "nl",
            [("a.b", "multi\nline"), ("quote", "\"q\" 'a'"), ("none", "")],
        );
        let bytes = Format::from(document.clone()).to_bytes().unwrap();
        let parsed = TranslationDocument::from(Format::from_bytes(&bytes).unwrap());
        assert_eq!(parsed.translations, document.translations);
    }
}
