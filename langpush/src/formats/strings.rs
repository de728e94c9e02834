//! Support for Apple `.strings` localization format.
//!
//! Provides parsing, serialization, and conversion to/from [`TranslationDocument`].

use std::fs::File;
use std::io::Read;
use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;

use indoc::indoc;

use crate::{
    error::Error,
    traits::Parser,
    types::{TranslationDocument, TranslationRecord},
};

/// Represents an Apple `.strings` localization file.
///
/// The format consists of a set of `"key" = "value";` pairs, with optional comments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Format {
    /// Language code taken from the `//: Language:` header line, if any.
    pub language: String,
    /// All key-value pairs in the file.
    pub pairs: Vec<Pair>,
}

/// A single key-value pair in a `.strings` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub key: String,
    pub value: String,
    /// Comment immediately preceding the pair, markers included.
    pub comment: Option<String>,
}

impl std::fmt::Display for Pair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(comment) = &self.comment {
            writeln!(f, "{}", comment)?;
        }
        write!(f, "\"{}\" = \"{}\";", escape(&self.key), escape(&self.value))
    }
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
            _ => out.push(c),
        }
    }
    out
}

struct Scanner<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

impl<'a> Scanner<'a> {
    fn new(content: &'a str) -> Self {
        Scanner {
            chars: content.chars().peekable(),
            line: 1,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c == Some('\n') {
            self.line += 1;
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.bump();
        }
    }

    fn error(&self, message: &str) -> Error {
        Error::InvalidResource(format!(".strings line {}: {}", self.line, message))
    }

    fn expect(&mut self, expected: char) -> Result<(), Error> {
        self.skip_whitespace();
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(&format!("expected `{}`, found `{}`", expected, c))),
            None => Err(self.error(&format!("expected `{}`, found end of file", expected))),
        }
    }

    /// Reads a comment after its leading `/`, returning it with its markers.
    fn comment(&mut self) -> Result<String, Error> {
        match self.bump() {
            Some('/') => {
                let mut text = String::from("//");
                while let Some(&c) = self.chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    text.push(c);
                    self.bump();
                }
                Ok(text.trim_end().to_string())
            }
            Some('*') => {
                let mut text = String::from("/*");
                loop {
                    match self.bump() {
                        Some('*') if self.chars.peek() == Some(&'/') => {
                            self.bump();
                            text.push_str("*/");
                            return Ok(text);
                        }
                        Some(c) => text.push(c),
                        None => return Err(self.error("unterminated comment")),
                    }
                }
            }
            _ => Err(self.error("stray `/`")),
        }
    }

    /// Reads a quoted string, skipping any whitespace before it.
    fn quoted(&mut self) -> Result<String, Error> {
        self.expect('"')?;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('r') => out.push('\r'),
                    Some('t') => out.push('\t'),
                    Some(other) => out.push(other),
                    None => return Err(self.error("unterminated string")),
                },
                Some(c) => out.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }
}

impl Parser for Format {
    /// The language is read from the `//: Language:` header that
    /// [`Format::to_writer`] emits; hand-written files usually leave it empty.
    fn from_reader<R: std::io::BufRead>(mut reader: R) -> Result<Self, Error> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;

        let mut scanner = Scanner::new(&content);
        let mut format = Format::default();
        let mut last_comment: Option<String> = None;

        loop {
            let line_before = scanner.line;
            scanner.skip_whitespace();
            // A blank line detaches a comment from the pair below it.
            if scanner.line > line_before + 1 {
                last_comment = None;
            }
            match scanner.chars.peek() {
                None => break,
                Some('/') => {
                    scanner.bump();
                    let comment = scanner.comment()?;
                    if let Some(header) = comment.strip_prefix("//:") {
                        if let Some((key, value)) = header.split_once(':') {
                            if key.trim() == "Language" {
                                format.language = value.trim().to_string();
                            }
                        }
                        continue;
                    }
                    last_comment = Some(comment);
                }
                Some(_) => {
                    let key = scanner.quoted()?;
                    scanner.expect('=')?;
                    let value = scanner.quoted()?;
                    scanner.expect(';')?;
                    format.pairs.push(Pair {
                        key,
                        value,
                        comment: last_comment.take(),
                    });
                }
            }
        }

        Ok(format)
    }

    fn to_writer<W: std::io::Write>(&self, mut writer: W) -> Result<(), Error> {
        let mut content = format!(
            indoc! {"
            // This file is automatically generated by langpush.
            // Do not edit it manually, as your changes will be overwritten.
            //
            //: Language: {}
            //

            "},
            self.language
        );

        for pair in &self.pairs {
            content.push_str(&pair.to_string());
            content.push('\n');
        }

        writer.write_all(content.as_bytes()).map_err(Error::Io)
    }

    /// Override default file reading to support BOM-aware decoding (e.g., UTF-16 Apple .strings)
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let file = File::open(path).map_err(Error::Io)?;
        let mut decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
            .bom_override(true)
            .build(file);

        let mut decoded = String::new();
        decoder.read_to_string(&mut decoded).map_err(Error::Io)?;

        Self::from_str(&decoded)
    }
}

impl From<TranslationDocument> for Format {
    fn from(value: TranslationDocument) -> Self {
        Format {
            language: value.iso,
            pairs: value
                .translations
                .into_iter()
                .map(|r| Pair {
                    key: r.term,
                    value: r.translation,
                    comment: None,
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
                .pairs
                .into_iter()
                .map(|pair| TranslationRecord::new(pair.key, pair.value))
                .collect(),
        )
    }
}
