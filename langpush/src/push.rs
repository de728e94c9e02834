//! Batch export of a project's locales, optionally pushed to object storage.
//!
//! [`PushService::push`] authorizes the caller, resolves the target locales
//! and runs one collect + export (+ upload) pipeline per locale. Pipelines run
//! concurrently and the summary is built once all of them are done. A failing
//! locale becomes a [`PushOutcome::Failed`] entry and never aborts the batch.

use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};
use url::Url;

use crate::{
    auth::{Authorizer, Caller, ProjectAction},
    collector::{CollectOptions, Collector},
    error::Error,
    formats::{self, FormatType},
    sink::{StorageSink, locale_key},
    store::{ProjectLocale, TermStore},
    types::parse_locale_code,
};

/// Locale value selecting every configured locale.
pub const ALL_LOCALES: &str = "all";

/// Placeholder the web app sends when no locale is picked.
pub const PLACEHOLDER_LOCALE: &str = "xx";

/// Query parameters of the push and export endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub locale: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub format: Option<String>,
    #[serde(default)]
    pub untranslated: bool,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub fallback_locale: Option<String>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

impl PushQuery {
    pub fn new(locale: impl Into<String>, format: FormatType) -> Self {
        Self {
            locale: Some(locale.into()),
            format: Some(format.id().to_string()),
            ..Self::default()
        }
    }

    pub fn untranslated(mut self, untranslated: bool) -> Self {
        self.untranslated = untranslated;
        self
    }

    pub fn fallback(mut self, locale: impl Into<String>) -> Self {
        self.fallback_locale = Some(locale.into());
        self
    }

    /// Builds the push URL for `project_id` below the API `endpoint`.
    ///
    /// A missing locale is sent as the `xx` placeholder.
    ///
    /// ```rust
    /// use langpush::{formats::FormatType, push::PushQuery};
    /// let query = PushQuery::new("fr", FormatType::Po).fallback("en");
    /// let url = query.to_url("https://api.example.com/api/v1", "42").unwrap();
    /// assert_eq!(
    ///     url.as_str(),
    ///     "https://api.example.com/api/v1/projects/42/push?locale=fr&format=po&untranslated=false&fallbackLocale=en"
    /// );
    /// ```
    pub fn to_url(&self, endpoint: &str, project_id: &str) -> Result<Url, Error> {
        let base = format!(
            "{}/projects/{}/push",
            endpoint.trim_end_matches('/'),
            project_id
        );
        let mut url = Url::parse(&base)
            .map_err(|e| Error::validation_error(format!("invalid endpoint `{}`: {}", endpoint, e)))?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("locale", self.locale.as_deref().unwrap_or(PLACEHOLDER_LOCALE));
            pairs.append_pair("format", self.format.as_deref().unwrap_or_default());
            pairs.append_pair("untranslated", if self.untranslated { "true" } else { "false" });
            if let Some(fallback) = &self.fallback_locale {
                pairs.append_pair("fallbackLocale", fallback);
            }
        }
        Ok(url)
    }

    fn collect_options(&self) -> CollectOptions {
        CollectOptions {
            untranslated: self.untranslated,
            fallback_locale: self.fallback_locale.clone(),
        }
    }

    /// Checks the parameters, returning the requested locale and format.
    fn validate(&self) -> Result<(&str, FormatType), Error> {
        let locale = self
            .locale
            .as_deref()
            .ok_or_else(|| Error::validation_error("locale is a required param"))?;
        if locale != ALL_LOCALES {
            parse_locale_code(locale)?;
        }
        if let Some(fallback) = &self.fallback_locale {
            parse_locale_code(fallback)?;
        }
        let format = self
            .format
            .as_deref()
            .ok_or_else(|| Error::validation_error("format is a required param"))?
            .parse()?;
        Ok((locale, format))
    }
}

/// What happened to one locale of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PushOutcome {
    /// Uploaded to the storage sink.
    Pushed {
        key: String,
        url: String,
        bytes: usize,
    },
    /// Exported without a sink; the file is returned inline.
    Exported { bytes: usize, content: String },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocaleResult {
    pub locale: String,
    #[serde(flatten)]
    pub outcome: PushOutcome,
}

impl LocaleResult {
    pub fn is_success(&self) -> bool {
        !matches!(self.outcome, PushOutcome::Failed { .. })
    }
}

/// Result of a batch push, one entry per target locale in project order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSummary {
    pub project_id: String,
    pub format: FormatType,
    pub entries: Vec<LocaleResult>,
}

impl PushSummary {
    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.succeeded()
    }

    /// Plain text summary, e.g. `3 pushed in total.`
    pub fn message(&self) -> String {
        format!("{} pushed in total.", self.succeeded())
    }
}

/// A single exported locale file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Runs exports and pushes on behalf of authorized callers.
#[derive(Clone)]
pub struct PushService {
    authorizer: Arc<dyn Authorizer>,
    store: Arc<dyn TermStore>,
    collector: Collector,
    sink: Option<Arc<dyn StorageSink>>,
}

impl PushService {
    pub fn new(authorizer: Arc<dyn Authorizer>, store: Arc<dyn TermStore>) -> Self {
        Self {
            authorizer,
            collector: Collector::new(store.clone()),
            store,
            sink: None,
        }
    }

    /// Uploads every exported file to `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn StorageSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn authorizer(&self) -> &Arc<dyn Authorizer> {
        &self.authorizer
    }

    /// Exports the requested locales of a project.
    ///
    /// `query.locale` selects a single configured locale. `all`, or any code
    /// that is not configured for the project, selects every locale.
    pub async fn push(
        &self,
        caller: &Caller,
        project_id: &str,
        query: &PushQuery,
    ) -> Result<PushSummary, Error> {
        self.authorizer
            .authorize(caller, project_id, ProjectAction::ExportTranslation)
            .await?;
        let (requested, format) = query.validate()?;

        let project_locales = self.store.project_locales(project_id).await?;
        if project_locales.is_empty() {
            return Err(Error::NotFound("locales not found".to_string()));
        }
        let targets = select_locales(project_locales, requested);

        let options = query.collect_options();
        let pipelines = targets
            .iter()
            .map(|locale| self.run_locale(project_id, locale, format, &options));
        let entries = join_all(pipelines).await;

        let summary = PushSummary {
            project_id: project_id.to_string(),
            format,
            entries,
        };
        info!(
            project_id,
            %format,
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            "Push finished"
        );
        Ok(summary)
    }

    /// Exports a single configured locale and returns the file.
    pub async fn export_one(
        &self,
        caller: &Caller,
        project_id: &str,
        query: &PushQuery,
    ) -> Result<ExportedFile, Error> {
        self.authorizer
            .authorize(caller, project_id, ProjectAction::ExportTranslation)
            .await?;
        let (locale, format) = query.validate()?;

        let document = self
            .collector
            .collect(project_id, locale, &query.collect_options())
            .await?;
        let bytes = formats::export(format, &document)?;

        Ok(ExportedFile {
            file_name: format.file_name(&document.iso),
            content_type: format.content_type(),
            bytes,
        })
    }

    async fn run_locale(
        &self,
        project_id: &str,
        locale: &ProjectLocale,
        format: FormatType,
        options: &CollectOptions,
    ) -> LocaleResult {
        let outcome = match self.export_locale(project_id, locale, format, options).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(project_id, locale = %locale.code, error = %e, "Locale push failed");
                PushOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };
        LocaleResult {
            locale: locale.code.clone(),
            outcome,
        }
    }

    async fn export_locale(
        &self,
        project_id: &str,
        locale: &ProjectLocale,
        format: FormatType,
        options: &CollectOptions,
    ) -> Result<PushOutcome, Error> {
        let document = self
            .collector
            .collect_locale(project_id, locale, options)
            .await?;
        let bytes = formats::export(format, &document)?;
        let size = bytes.len();

        let Some(sink) = &self.sink else {
            return Ok(PushOutcome::Exported {
                bytes: size,
                content: String::from_utf8_lossy(&bytes).into_owned(),
            });
        };

        let key = locale_key(project_id, &locale.code, format);
        let url = sink.put(&key, bytes, format.content_type()).await?;
        Ok(PushOutcome::Pushed {
            key,
            url,
            bytes: size,
        })
    }
}

/// The configured locale named by `requested`, or all of them.
fn select_locales(project_locales: Vec<ProjectLocale>, requested: &str) -> Vec<ProjectLocale> {
    if requested == ALL_LOCALES {
        return project_locales;
    }
    match project_locales.iter().find(|l| l.code == requested) {
        Some(locale) => vec![locale.clone()],
        None => project_locales,
    }
}
