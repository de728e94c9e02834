//! Support for gettext PO files.
//!
//! Each term becomes a `msgid`/`msgstr` pair. The file starts with a header
//! entry (empty `msgid`) carrying the `Language` field. An empty term gets an
//! empty `msgctxt` so it is not read back as the header. Values containing
//! line breaks are split over several string lines after each `\n`, the way
//! `msgmerge` lays them out.

use std::io::{BufRead, Write};

use crate::{
    error::Error,
    traits::Parser,
    types::{TranslationDocument, TranslationRecord},
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Format {
    /// Value of the `Language` header field.
    pub language: String,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub msgid: String,
    pub msgstr: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Context,
    Id,
    IdPlural,
    Str,
    StrPlural,
    Other,
}

#[derive(Default)]
struct PendingMessage {
    msgid: Option<String>,
    msgstr: String,
    has_context: bool,
}

impl Parser for Format {
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut format = Format::default();
        let mut pending = PendingMessage::default();
        let mut field = Field::Other;

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            let line_no = index + 1;

            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            if trimmed.starts_with('"') {
                let text = parse_quoted(trimmed, line_no)?;
                match field {
                    Field::Id => pending.msgid.get_or_insert_with(String::new).push_str(&text),
                    Field::Str => pending.msgstr.push_str(&text),
                    _ => {}
                }
                continue;
            }

            let (keyword, rest) = trimmed
                .split_once(char::is_whitespace)
                .ok_or_else(|| invalid_line(line_no, trimmed))?;
            let text = parse_quoted(rest.trim(), line_no)?;

            match keyword {
                "msgctxt" => {
                    format.finish(std::mem::take(&mut pending));
                    pending.has_context = true;
                    field = Field::Context;
                }
                "msgid" => {
                    if pending.msgid.is_some() {
                        format.finish(std::mem::take(&mut pending));
                    }
                    pending.msgid = Some(text);
                    field = Field::Id;
                }
                "msgid_plural" => field = Field::IdPlural,
                "msgstr" | "msgstr[0]" => {
                    pending.msgstr = text;
                    field = Field::Str;
                }
                // Only the first plural form is kept.
                k if k.starts_with("msgstr[") => field = Field::StrPlural,
                _ => return Err(invalid_line(line_no, trimmed)),
            }
        }
        format.finish(pending);

        Ok(format)
    }

    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        writeln!(writer, "msgid \"\"")?;
        writeln!(writer, "msgstr \"\"")?;
        writeln!(writer, "\"Content-Type: text/plain; charset=UTF-8\\n\"")?;
        writeln!(writer, "\"Content-Transfer-Encoding: 8bit\\n\"")?;
        writeln!(writer, "\"Language: {}\\n\"", escape(&self.language))?;
        writeln!(writer, "\"MIME-Version: 1.0\\n\"")?;
        writeln!(writer, "\"X-Generator: langpush\\n\"")?;

        for message in &self.messages {
            writeln!(writer)?;
            if message.msgid.is_empty() {
                writeln!(writer, "msgctxt \"\"")?;
            }
            write_field(&mut writer, "msgid", &message.msgid)?;
            write_field(&mut writer, "msgstr", &message.msgstr)?;
        }
        Ok(())
    }
}

impl Format {
    fn finish(&mut self, pending: PendingMessage) {
        let Some(msgid) = pending.msgid else {
            return;
        };
        if msgid.is_empty() && !pending.has_context {
            self.language = header_field(&pending.msgstr, "Language").unwrap_or_default();
            return;
        }
        self.messages.push(Message {
            msgid,
            msgstr: pending.msgstr,
        });
    }
}

fn header_field(header: &str, name: &str) -> Option<String> {
    header.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        (key.trim() == name).then(|| value.trim().to_string())
    })
}

fn write_field<W: Write>(writer: &mut W, keyword: &str, value: &str) -> Result<(), Error> {
    let trimmed = value.strip_suffix('\n').unwrap_or(value);
    if !trimmed.contains('\n') {
        writeln!(writer, "{} \"{}\"", keyword, escape(value))?;
        return Ok(());
    }
    writeln!(writer, "{} \"\"", keyword)?;
    for segment in value.split_inclusive('\n') {
        writeln!(writer, "\"{}\"", escape(segment))?;
    }
    Ok(())
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0007}' => out.push_str("\\a"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000B}' => out.push_str("\\v"),
            '\u{000C}' => out.push_str("\\f"),
            _ => out.push(c),
        }
    }
    out
}

fn parse_quoted(s: &str, line_no: usize) -> Result<String, Error> {
    let inner = s
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| invalid_line(line_no, s))?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('a') => out.push('\u{0007}'),
            Some('b') => out.push('\u{0008}'),
            Some('v') => out.push('\u{000B}'),
            Some('f') => out.push('\u{000C}'),
            Some(other) => out.push(other),
            None => return Err(invalid_line(line_no, s)),
        }
    }
    Ok(out)
}

fn invalid_line(line_no: usize, line: &str) -> Error {
    Error::InvalidResource(format!("PO line {}: cannot parse `{}`", line_no, line))
}

impl From<TranslationDocument> for Format {
    fn from(value: TranslationDocument) -> Self {
        Format {
            language: value.iso,
            messages: value
                .translations
                .into_iter()
                .map(|r| Message {
                    msgid: r.term,
                    msgstr: r.translation,
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
                .messages
                .into_iter()
                .map(|m| TranslationRecord::new(m.msgid, m.msgstr))
                .collect(),
        )
    }
}
