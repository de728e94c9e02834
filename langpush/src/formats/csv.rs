//! Support for the two-column CSV format.
//!
//! The first row is always the `term,translation` header. Quoting of
//! delimiters, quotes and line breaks is left to the `csv` crate.
use std::io::BufRead;

use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    traits::Parser,
    types::{TranslationDocument, TranslationRecord},
};

pub const HEADER: [&str; 2] = ["term", "translation"];

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct CSVRecord {
    pub term: String,
    #[serde(default)]
    pub translation: String,
}

/// All rows of a CSV export, without the header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Format {
    pub records: Vec<CSVRecord>,
}

impl Parser for Format {
    /// Parse from any reader. The header row is required.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        if headers.len() < 2 || &headers[0] != HEADER[0] || &headers[1] != HEADER[1] {
            return Err(Error::InvalidResource(format!(
                "CSV header must be `{}`",
                HEADER.join(",")
            )));
        }

        let mut records = Vec::new();
        for result in rdr.deserialize() {
            records.push(result?);
        }
        Ok(Format { records })
    }

    /// Write to any writer (file, memory, etc.).
    fn to_writer<W: std::io::Write>(&self, writer: W) -> Result<(), Error> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        wtr.write_record(HEADER)?;
        for record in &self.records {
            wtr.write_record([record.term.as_str(), record.translation.as_str()])?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl From<TranslationDocument> for Format {
    fn from(value: TranslationDocument) -> Self {
        Format {
            records: value
                .translations
                .into_iter()
                .map(|r| CSVRecord {
                    term: r.term,
                    translation: r.translation,
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
                .records
                .into_iter()
                .map(|record| TranslationRecord::new(record.term, record.translation))
                .collect(),
        )
    }
}
