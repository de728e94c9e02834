//! HTTP surface of the push service.

use std::{error::Error as StdError, path::Path, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path as UrlPath, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use langpush::{
    Caller, Error, LocalSink, MemoryStore, PushQuery, PushService, StaticTokenAuthorizer,
};
use serde_json::json;
use tracing::{info, warn};

use crate::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub service: PushService,
}

impl AppState {
    pub fn new(service: PushService) -> Self {
        Self { service }
    }

    /// Builds the service described by `settings`.
    ///
    /// Relative catalog and storage paths are resolved against `base_dir`.
    pub async fn from_settings(settings: &Settings, base_dir: &Path) -> Result<Self, Error> {
        let store = match &settings.catalog.path {
            Some(path) => {
                let path = base_dir.join(path);
                info!("Loading catalog from {}", path.display());
                MemoryStore::load(&path).await?
            }
            None => {
                warn!("No catalog configured, serving an empty store");
                MemoryStore::new()
            }
        };
        let authorizer = StaticTokenAuthorizer::new(settings.tokens.clone());
        let mut service = PushService::new(Arc::new(authorizer), Arc::new(store));

        if let Some(dir) = &settings.storage.dir {
            let mut sink = LocalSink::new(base_dir.join(dir));
            if let Some(base_url) = &settings.storage.base_url {
                sink = sink.with_base_url(base_url);
            }
            service = service.with_sink(Arc::new(sink));
        }
        Ok(Self::new(service))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/projects/:projectId/push", get(push))
        .route("/api/v1/projects/:projectId/exports", get(export))
        .with_state(state)
}

/// Binds `addr` and serves until Ctrl-C.
pub async fn serve(state: AppState, addr: &str) -> Result<(), Box<dyn StdError>> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn push(
    State(state): State<AppState>,
    UrlPath(project_id): UrlPath<String>,
    Query(query): Query<PushQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let caller = authenticate(&state, &headers).await?;
    let summary = state.service.push(&caller, &project_id, &query).await?;

    if wants_plain_text(&headers) {
        return Ok(summary.message().into_response());
    }
    Ok(Json(summary).into_response())
}

async fn export(
    State(state): State<AppState>,
    UrlPath(project_id): UrlPath<String>,
    Query(query): Query<PushQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let caller = authenticate(&state, &headers).await?;
    let file = state.service.export_one(&caller, &project_id, &query).await?;

    let disposition = format!("attachment; filename=\"{}\"", file.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Caller, Error> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::Authz("missing bearer token".to_string()))?;
    state.service.authorizer().authenticate(token).await
}

fn wants_plain_text(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|accept| accept.contains("text/plain"))
}

/// A library error on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::Validation(_) | Error::UnsupportedFormat(_) => StatusCode::BAD_REQUEST,
            Error::Authz(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(error = %self.0, "Request failed");
        }
        let body = json!({
            "error": self.0.kind(),
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
