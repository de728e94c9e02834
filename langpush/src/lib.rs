#![forbid(unsafe_code)]
//! Translation export and push toolkit for Rust.
//!
//! Collects the terms of a project for one or more locales, serializes them
//! into one of twelve localization formats, and pushes the files to object
//! storage. Every format goes through the unified [`TranslationDocument`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use langpush::{
//!     Caller, FormatType, MemorySink, MemoryStore, PushQuery, PushService, StaticTokenAuthorizer,
//! };
//!
//! # async fn run() -> Result<(), langpush::Error> {
//! let store = MemoryStore::load("catalog.json").await?;
//! let authorizer = StaticTokenAuthorizer::default().with_grant("secret", Caller::user("me"), &["1"]);
//! let service = PushService::new(Arc::new(authorizer), Arc::new(store))
//!     .with_sink(Arc::new(MemorySink::new()));
//!
//! let summary = service
//!     .push(&Caller::user("me"), "1", &PushQuery::new("all", FormatType::JsonNested))
//!     .await?;
//! println!("{}", summary.message());
//! # Ok(())
//! # }
//! ```
//!
//! # Supported Formats
//!
//! - **CSV**: `term,translation` rows
//! - **JSON / YAML**: flat or nested along `.` separated terms
//! - **Java `.properties`**, **gettext PO**, **Apple `.strings`**, **PHP arrays**
//! - **Android `strings.xml`**, **.NET RESX**, **XLIFF 1.2**

pub mod auth;
pub mod collector;
pub mod error;
pub mod formats;
pub mod push;
pub mod sink;
pub mod store;
pub mod traits;
pub mod types;

// Re-export most used types for easy consumption
pub use crate::{
    auth::{Authorizer, Caller, CallerKind, Membership, ProjectAction, StaticTokenAuthorizer, TokenGrant},
    collector::{CollectOptions, Collector},
    error::Error,
    formats::{FormatType, export, import},
    push::{ExportedFile, LocaleResult, PushOutcome, PushQuery, PushService, PushSummary},
    sink::{LocalSink, MemorySink, StorageSink, locale_key},
    store::{Catalog, MemoryStore, ProjectLocale, TermRow, TermStore},
    types::{TranslationDocument, TranslationRecord, parse_locale_code},
};
