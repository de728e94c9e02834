//! Reading helpers shared by the XML based formats.

use std::io::BufRead;

use quick_xml::{
    Reader,
    escape::escape,
    events::{BytesStart, BytesText, Event},
};

use crate::error::Error;

/// Creates a reader that keeps whitespace, so values survive unchanged.
pub(crate) fn reader<R: BufRead>(reader: R) -> Reader<R> {
    let mut xml_reader = Reader::from_reader(reader);
    xml_reader.config_mut().trim_text(false);
    xml_reader
}

/// Returns the unescaped value of attribute `name`, if present.
pub(crate) fn attribute(e: &BytesStart, name: &[u8]) -> Result<Option<String>, Error> {
    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() == name {
            return Ok(Some(attr.unescape_value()?.to_string()));
        }
    }
    Ok(None)
}

/// Whether XML 1.0 can carry `c` at all, raw or as a character reference.
pub(crate) fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Fails on the first character XML 1.0 cannot carry.
pub(crate) fn check_chars(value: &str) -> Result<(), Error> {
    match value.chars().find(|c| !is_xml_char(*c)) {
        Some(c) => Err(Error::InvalidResource(format!(
            "U+{:04X} is not allowed in XML: `{}`",
            c as u32,
            value.escape_debug()
        ))),
        None => Ok(()),
    }
}

/// Escapes `value` as element text, with `\r` as a character reference so
/// line-ending normalization cannot turn it into `\n`.
pub(crate) fn text(value: &str) -> BytesText<'static> {
    BytesText::from_escaped(escape(value).replace('\r', "&#13;"))
}

/// Collects the text up to the closing `end` tag.
///
/// Nested markup is skipped, only its text is kept.
pub(crate) fn read_text<R: BufRead>(xml_reader: &mut Reader<R>, end: &[u8]) -> Result<String, Error> {
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut depth = 0usize;

    loop {
        match xml_reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e.into_inner())),
            Event::Start(_) => depth += 1,
            Event::End(e) => {
                if depth == 0 {
                    if e.name().as_ref() != end {
                        return Err(Error::InvalidResource(format!(
                            "expected `</{}>`, found `</{}>`",
                            String::from_utf8_lossy(end),
                            String::from_utf8_lossy(e.name().as_ref())
                        )));
                    }
                    break;
                }
                depth -= 1;
            }
            Event::Eof => {
                return Err(Error::InvalidResource(format!(
                    "unexpected end of file inside `<{}>`",
                    String::from_utf8_lossy(end)
                )));
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_chars() {
        assert!(check_chars("tab\tline\nreturn\r émoji 😀").is_ok());
        for bad in ["bell\u{7}", "\u{1}", "nul\0", "\u{FFFE}"] {
            assert!(matches!(check_chars(bad), Err(Error::InvalidResource(_))), "{:?}", bad);
        }
    }

    fn first_text(xml: &str, tag: &[u8]) -> Result<String, Error> {
        let mut xml_reader = reader(xml.as_bytes());
        let mut buf = Vec::new();
        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Start(e) if e.name().as_ref() == tag => {
                    return read_text(&mut xml_reader, tag);
                }
                Event::Eof => return Ok(String::new()),
                _ => {}
            }
            buf.clear();
        }
    }

    #[test]
    fn test_whitespace_entities_and_cdata() {
        let xml = "<v>  a &amp; b <![CDATA[<raw>]]> </v>";
        assert_eq!(first_text(xml, b"v").unwrap(), "  a & b <raw> ");
    }

    #[test]
    fn test_nested_markup_keeps_text() {
        let xml = "<v>Hello <b>bold</b> world</v>";
        assert_eq!(first_text(xml, b"v").unwrap(), "Hello bold world");
    }

    #[test]
    fn test_carriage_return_survives() {
        let escaped = text("a\r\nb <c>");
        assert_eq!(&*escaped, b"a&#13;\nb &lt;c&gt;");

        let xml = format!("<v>{}</v>", std::str::from_utf8(&escaped).unwrap());
        assert_eq!(first_text(&xml, b"v").unwrap(), "a\r\nb <c>");
    }

    #[test]
    fn test_unclosed_element() {
        assert!(first_text("<v>text", b"v").is_err());
    }
}
