//! All supported export formats for langpush.
//!
//! Each submodule holds one `Format` type implementing [`Parser`] plus
//! conversions to and from [`TranslationDocument`]. [`FormatType`] is the
//! dispatch key used by [`export`] and [`import`].

pub mod android_xml;
pub mod csv;
pub mod gettext;
pub mod json;
pub mod nested;
pub mod php;
pub mod properties;
pub mod resx;
pub mod strings;
mod xml;
pub mod xliff;
pub mod yaml;

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

// Reexporting the formats for easier access
pub use android_xml::Format as AndroidXmlFormat;
pub use csv::Format as CSVFormat;
pub use gettext::Format as GettextFormat;
pub use json::{FlatFormat as JsonFlatFormat, NestedFormat as JsonNestedFormat};
pub use php::Format as PhpFormat;
pub use properties::Format as PropertiesFormat;
pub use resx::Format as ResxFormat;
pub use strings::Format as StringsFormat;
pub use xliff::{Format as XliffFormat, XliffVersion};
pub use yaml::{FlatFormat as YamlFlatFormat, NestedFormat as YamlNestedFormat};

use crate::{error::Error, traits::Parser, types::TranslationDocument};

/// Every export format, keyed by the identifier used in the `format` query
/// parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatType {
    /// Two-column CSV with a `term,translation` header.
    Csv,
    /// Single-level JSON object.
    JsonFlat,
    /// JSON object nested along `.` separated terms.
    JsonNested,
    /// Single-level YAML mapping.
    YamlFlat,
    /// YAML mapping nested along `.` separated terms.
    YamlNested,
    /// Java `.properties`.
    Properties,
    /// gettext PO.
    Po,
    /// Apple `.strings`.
    Strings,
    /// PHP array returned from a script.
    Php,
    /// Android `strings.xml`.
    AndroidXml,
    /// .NET RESX.
    Resx,
    /// XLIFF 1.2.
    Xliff12,
}

impl FormatType {
    pub const ALL: [FormatType; 12] = [
        FormatType::AndroidXml,
        FormatType::Csv,
        FormatType::Xliff12,
        FormatType::JsonFlat,
        FormatType::JsonNested,
        FormatType::YamlFlat,
        FormatType::YamlNested,
        FormatType::Properties,
        FormatType::Po,
        FormatType::Strings,
        FormatType::Php,
        FormatType::Resx,
    ];

    /// The identifier accepted by [`FromStr`].
    pub fn id(&self) -> &'static str {
        match self {
            FormatType::Csv => "csv",
            FormatType::JsonFlat => "jsonflat",
            FormatType::JsonNested => "jsonnested",
            FormatType::YamlFlat => "yamlflat",
            FormatType::YamlNested => "yamlnested",
            FormatType::Properties => "properties",
            FormatType::Po => "po",
            FormatType::Strings => "strings",
            FormatType::Php => "php",
            FormatType::AndroidXml => "androidxml",
            FormatType::Resx => "resx",
            FormatType::Xliff12 => "xliff12",
        }
    }

    /// Returns the typical file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatType::Csv => "csv",
            FormatType::JsonFlat | FormatType::JsonNested => "json",
            FormatType::YamlFlat | FormatType::YamlNested => "yaml",
            FormatType::Properties => "properties",
            FormatType::Po => "po",
            FormatType::Strings => "strings",
            FormatType::Php => "php",
            FormatType::AndroidXml => "xml",
            FormatType::Resx => "resx",
            FormatType::Xliff12 => "xliff",
        }
    }

    /// MIME type used for HTTP responses and uploads.
    pub fn content_type(&self) -> &'static str {
        match self {
            FormatType::Csv => "text/csv; charset=utf-8",
            FormatType::JsonFlat | FormatType::JsonNested => "application/json; charset=utf-8",
            FormatType::YamlFlat | FormatType::YamlNested => "application/x-yaml; charset=utf-8",
            FormatType::Properties => "text/x-java-properties; charset=utf-8",
            FormatType::Po => "text/x-gettext-translation; charset=utf-8",
            FormatType::Strings => "text/plain; charset=utf-8",
            FormatType::Php => "application/x-httpd-php; charset=utf-8",
            FormatType::AndroidXml | FormatType::Resx => "application/xml; charset=utf-8",
            FormatType::Xliff12 => "application/x-xliff+xml; charset=utf-8",
        }
    }

    /// File name for an exported locale, e.g. `fr.json`.
    pub fn file_name(&self, iso: &str) -> String {
        format!("{}.{}", iso, self.extension())
    }
}

impl Display for FormatType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Accepts the identifiers listed in [`FormatType::id`], case-insensitively.
///
/// # Example
/// ```rust
/// use langpush::formats::FormatType;
/// use std::str::FromStr;
/// assert_eq!(FormatType::from_str("jsonnested").unwrap(), FormatType::JsonNested);
/// assert_eq!(FormatType::from_str("XLIFF12").unwrap(), FormatType::Xliff12);
/// assert!(FormatType::from_str("xlsx").is_err());
/// ```
impl FromStr for FormatType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        FormatType::ALL
            .into_iter()
            .find(|f| f.id() == s)
            .ok_or(Error::UnsupportedFormat(s))
    }
}

/// Serializes a document into the given format.
pub fn export(format: FormatType, document: &TranslationDocument) -> Result<Vec<u8>, Error> {
    let document = document.clone();
    match format {
        FormatType::Csv => CSVFormat::from(document).to_bytes(),
        FormatType::JsonFlat => JsonFlatFormat::from(document).to_bytes(),
        FormatType::JsonNested => JsonNestedFormat::from(document).to_bytes(),
        FormatType::YamlFlat => YamlFlatFormat::from(document).to_bytes(),
        FormatType::YamlNested => YamlNestedFormat::from(document).to_bytes(),
        FormatType::Properties => PropertiesFormat::from(document).to_bytes(),
        FormatType::Po => GettextFormat::from(document).to_bytes(),
        FormatType::Strings => StringsFormat::from(document).to_bytes(),
        FormatType::Php => PhpFormat::from(document).to_bytes(),
        FormatType::AndroidXml => AndroidXmlFormat::from(document).to_bytes(),
        FormatType::Resx => ResxFormat::from(document).to_bytes(),
        FormatType::Xliff12 => XliffFormat::new(XliffVersion::V1_2, document).to_bytes(),
    }
}

/// Parses an exported file back into a document.
///
/// Formats that carry a language (PO, `.strings`, XLIFF) use it and reject
/// an invalid code with [`Error::Validation`]; the others take `iso`.
pub fn import(format: FormatType, bytes: &[u8], iso: &str) -> Result<TranslationDocument, Error> {
    let mut document = match format {
        FormatType::Csv => TranslationDocument::from(CSVFormat::from_bytes(bytes)?),
        FormatType::JsonFlat => TranslationDocument::from(JsonFlatFormat::from_bytes(bytes)?),
        FormatType::JsonNested => TranslationDocument::from(JsonNestedFormat::from_bytes(bytes)?),
        FormatType::YamlFlat => TranslationDocument::from(YamlFlatFormat::from_bytes(bytes)?),
        FormatType::YamlNested => TranslationDocument::from(YamlNestedFormat::from_bytes(bytes)?),
        FormatType::Properties => TranslationDocument::from(PropertiesFormat::from_bytes(bytes)?),
        FormatType::Po => TranslationDocument::from(GettextFormat::from_bytes(bytes)?),
        FormatType::Strings => TranslationDocument::from(StringsFormat::from_bytes(bytes)?),
        FormatType::Php => TranslationDocument::from(PhpFormat::from_bytes(bytes)?),
        FormatType::AndroidXml => TranslationDocument::from(AndroidXmlFormat::from_bytes(bytes)?),
        FormatType::Resx => TranslationDocument::from(ResxFormat::from_bytes(bytes)?),
        FormatType::Xliff12 => TranslationDocument::from(XliffFormat::from_bytes(bytes)?),
    };
    if document.iso.is_empty() {
        document.iso = iso.to_string();
    } else {
        document.language_identifier()?;
    }
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_type_round_trips_through_id() {
        for format in FormatType::ALL {
            assert_eq!(FormatType::from_str(format.id()).unwrap(), format);
            assert_eq!(format.to_string(), format.id());
        }
    }

    #[test]
    fn test_format_type_from_str_case_insensitive() {
        assert_eq!(
            FormatType::from_str(" AndroidXML ").unwrap(),
            FormatType::AndroidXml
        );
        assert_eq!(FormatType::from_str("PO").unwrap(), FormatType::Po);
    }

    #[test]
    fn test_unknown_format_is_unsupported() {
        let err = FormatType::from_str("xlsx").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(ref s) if s == "xlsx"));
    }

    #[test]
    fn test_serde_uses_format_ids() {
        let json = serde_json::to_string(&FormatType::Xliff12).unwrap();
        assert_eq!(json, "\"xliff12\"");
        let parsed: FormatType = serde_json::from_str("\"yamlnested\"").unwrap();
        assert_eq!(parsed, FormatType::YamlNested);
    }

    #[test]
    fn test_file_names_and_content_types() {
        assert_eq!(FormatType::JsonNested.file_name("fr"), "fr.json");
        assert_eq!(FormatType::Xliff12.file_name("de"), "de.xliff");
        assert_eq!(FormatType::Csv.content_type(), "text/csv; charset=utf-8");
        assert_eq!(
            FormatType::Resx.content_type(),
            FormatType::AndroidXml.content_type()
        );
    }

    #[test]
    fn test_import_rejects_invalid_file_language() {
        let po = "msgid \"\"\nmsgstr \"\"\n\"Language: not a locale!!\\n\"\n\nmsgid \"a\"\nmsgstr \"b\"\n";
        let err = import(FormatType::Po, po.as_bytes(), "fr").unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "{}", err);

        let xliff = concat!(
            "<xliff version=\"1.2\"><file source-language=\"%%%\" target-language=\"%%%\">",
            "<body><trans-unit id=\"a\"><source>a</source><target>b</target></trans-unit></body>",
            "</file></xliff>"
        );
        let err = import(FormatType::Xliff12, xliff.as_bytes(), "fr").unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "{}", err);
    }

    #[test]
    fn test_import_keeps_file_language_or_falls_back() {
        let po = "msgid \"\"\nmsgstr \"\"\n\"Language: pt-BR\\n\"\n";
        assert_eq!(import(FormatType::Po, po.as_bytes(), "fr").unwrap().iso, "pt-BR");
        assert_eq!(import(FormatType::Csv, b"term,translation\n", "fr").unwrap().iso, "fr");
    }

    #[test]
    fn test_export_then_import_every_format() {
        let document = TranslationDocument::from_pairs(
            "fr",
            [
                ("app.title", "Titre \"principal\""),
                ("app.empty", ""),
                ("greeting", "Salut, l'ami: <b>&</b>"),
            ],
        );
        // Android resource names are sanitized, so `app.title` does not survive.
        for format in FormatType::ALL
            .into_iter()
            .filter(|f| *f != FormatType::AndroidXml)
        {
            let bytes = export(format, &document).unwrap();
            let parsed = import(format, &bytes, "fr").unwrap();
            assert_eq!(parsed, document, "round trip failed for {}", format);
        }
    }
}
