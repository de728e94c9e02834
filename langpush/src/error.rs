//! All error types for the langpush crate.
//!
//! These are returned from every fallible operation (collection, serialization,
//! parsing, authorization, uploads).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Authz(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("upload of `{key}` failed: {message}")]
    Sink { key: String, message: String },

    #[error("store error: {0}")]
    Store(String),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("CSV parse error: {0}")]
    CsvParse(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid resource: {0}")]
    InvalidResource(String),
}

impl Error {
    /// Creates a new validation error
    pub fn validation_error(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Creates a new storage sink error for the given object key
    pub fn sink_error(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Sink {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::NotFound(_) => "not_found",
            Error::Authz(_) => "unauthorized",
            Error::Forbidden(_) => "forbidden",
            Error::UnsupportedFormat(_) => "unsupported_format",
            Error::Sink { .. } => "sink",
            Error::Store(_) => "store",
            Error::Parse(_)
            | Error::Yaml(_)
            | Error::XmlParse(_)
            | Error::CsvParse(_)
            | Error::InvalidResource(_) => "invalid_resource",
            Error::Io(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_validation_error() {
        let error = Error::validation_error("locale is a required param");
        assert_eq!(
            error.to_string(),
            "validation error: locale is a required param"
        );
        assert_eq!(error.kind(), "validation");
    }

    #[test]
    fn test_sink_error() {
        let error = Error::sink_error("site_p1/locale/fr.json", "bucket unavailable");
        assert_eq!(
            error.to_string(),
            "upload of `site_p1/locale/fr.json` failed: bucket unavailable"
        );
        assert_eq!(error.kind(), "sink");
    }

    #[test]
    fn test_parse_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{ invalid json }").unwrap_err();
        let error = Error::Parse(json_error);
        assert!(error.to_string().contains("parse error"));
        assert_eq!(error.kind(), "invalid_resource");
    }

    #[test]
    fn test_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = Error::from(io_error);
        assert!(error.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_display() {
        let errors = vec![
            Error::NotFound("test".to_string()),
            Error::Authz("test".to_string()),
            Error::Forbidden("test".to_string()),
            Error::UnsupportedFormat("test".to_string()),
            Error::Store("test".to_string()),
            Error::InvalidResource("test".to_string()),
        ];

        for error in errors {
            let display = format!("{}", error);
            assert!(display.contains("test"));
        }
    }
}
