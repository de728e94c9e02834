//! Support for Java `.properties` files.
//!
//! Output is one `key=value` line per term, escaped so it stays ASCII and
//! reads back unchanged with `java.util.Properties#load`.

use std::io::{BufRead, Write};

use crate::{
    error::Error,
    traits::Parser,
    types::{TranslationDocument, TranslationRecord},
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Format {
    pub pairs: Vec<(String, String)>,
}

impl Parser for Format {
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut pairs = Vec::new();
        let mut logical = String::new();

        for line in reader.lines() {
            let line = line?;
            let segment = if logical.is_empty() {
                line.trim_start_matches([' ', '\t', '\u{000C}'])
            } else {
                // Continuation lines drop their leading whitespace.
                line.trim_start()
            };

            if logical.is_empty() && (segment.is_empty() || segment.starts_with(['#', '!'])) {
                continue;
            }

            if ends_with_continuation(segment) {
                logical.push_str(&segment[..segment.len() - 1]);
                continue;
            }

            logical.push_str(segment);
            pairs.push(parse_logical_line(&logical)?);
            logical.clear();
        }

        if !logical.is_empty() {
            pairs.push(parse_logical_line(&logical)?);
        }

        Ok(Format { pairs })
    }

    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        for (key, value) in &self.pairs {
            writeln!(writer, "{}={}", escape(key, true), escape(value, false))?;
        }
        Ok(())
    }
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Splits a logical line at the first unescaped `=`, `:` or whitespace.
fn parse_logical_line(line: &str) -> Result<(String, String), Error> {
    let mut key_end = line.len();
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' | ' ' | '\t' | '\u{000C}' => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = unescape(&line[..key_end])?;
    let mut rest = line[key_end..].trim_start_matches([' ', '\t', '\u{000C}']);
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start_matches([' ', '\t', '\u{000C}']);
    }
    let value = unescape(rest)?;
    Ok((key, value))
}

fn escape(s: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, c) in s.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '=' => out.push_str("\\="),
            ':' => out.push_str("\\:"),
            '#' => out.push_str("\\#"),
            '!' => out.push_str("\\!"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{000C}' => out.push_str("\\f"),
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            ' '..='~' => out.push(c),
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04X}", unit));
                }
            }
        }
    }
    out
}

fn unescape(s: &str) -> Result<String, Error> {
    let mut units: Vec<u16> = Vec::with_capacity(s.len());
    let mut chars = s.chars();
    let mut buf = [0u16; 2];

    while let Some(c) = chars.next() {
        if c != '\\' {
            units.extend_from_slice(c.encode_utf16(&mut buf));
            continue;
        }
        let Some(next) = chars.next() else {
            break;
        };
        let decoded = match next {
            't' => '\t',
            'n' => '\n',
            'r' => '\r',
            'f' => '\u{000C}',
            'u' => {
                let hex: String = chars.by_ref().take(4).collect();
                let unit = u16::from_str_radix(&hex, 16).map_err(|_| {
                    Error::InvalidResource(format!("malformed \\u escape `\\u{}`", hex))
                })?;
                units.push(unit);
                continue;
            }
            other => other,
        };
        units.extend_from_slice(decoded.encode_utf16(&mut buf));
    }

    String::from_utf16(&units)
        .map_err(|e| Error::InvalidResource(format!("invalid UTF-16 escape sequence: {}", e)))
}

impl From<TranslationDocument> for Format {
    fn from(value: TranslationDocument) -> Self {
        Format {
            pairs: value
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
                .pairs
                .into_iter()
                .map(|(term, translation)| TranslationRecord::new(term, translation))
                .collect(),
        )
    }
}
