//! Offline exports straight from a catalog file, without the HTTP server.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use langpush::{
    Caller, Error, ExportedFile, FormatType, LocalSink, MemoryStore, PushQuery, PushService,
    PushSummary, StaticTokenAuthorizer, auth::ALL_PROJECTS,
};

/// Caller the offline commands act as.
const LOCAL_CALLER: &str = "local";

/// What to export, as given on the command line.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub catalog: PathBuf,
    pub project: String,
    pub locale: String,
    pub format: FormatType,
    pub untranslated: bool,
    pub fallback_locale: Option<String>,
}

impl ExportRequest {
    fn query(&self) -> PushQuery {
        let query = PushQuery::new(self.locale.as_str(), self.format).untranslated(self.untranslated);
        match &self.fallback_locale {
            Some(fallback) => query.fallback(fallback.as_str()),
            None => query,
        }
    }
}

async fn local_service(catalog: &Path) -> Result<PushService, Error> {
    let store = MemoryStore::load(catalog).await?;
    let authorizer = StaticTokenAuthorizer::default().with_grant(
        LOCAL_CALLER,
        Caller::user(LOCAL_CALLER),
        &[ALL_PROJECTS],
    );
    Ok(PushService::new(Arc::new(authorizer), Arc::new(store)))
}

/// Exports one locale and returns the file.
pub async fn export_file(request: &ExportRequest) -> Result<ExportedFile, Error> {
    let service = local_service(&request.catalog).await?;
    service
        .export_one(&Caller::user(LOCAL_CALLER), &request.project, &request.query())
        .await
}

/// Exports one locale into `output`, or to stdout when `output` is `None`.
pub async fn run_export(request: &ExportRequest, output: Option<&Path>) -> Result<(), Error> {
    let file = export_file(request).await?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, &file.bytes)?;
            println!("✅ Wrote {} ({} bytes)", path.display(), file.bytes.len());
        }
        None => io::stdout().write_all(&file.bytes)?,
    }
    Ok(())
}

/// Pushes the requested locales into `out_dir`, laid out by storage key.
pub async fn run_push(request: &ExportRequest, out_dir: &Path) -> Result<PushSummary, Error> {
    let service = local_service(&request.catalog)
        .await?
        .with_sink(Arc::new(LocalSink::new(out_dir)));
    service
        .push(&Caller::user(LOCAL_CALLER), &request.project, &request.query())
        .await
}
