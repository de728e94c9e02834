//! Object storage for pushed locale files.
//!
//! [`StorageSink`] is the seam to an object store such as S3. Two
//! implementations ship with the crate: [`LocalSink`] writes files under a
//! directory and [`MemorySink`] keeps objects in memory.

use std::{
    collections::{BTreeMap, HashSet},
    path::{Component, Path, PathBuf},
};

use async_trait::async_trait;
use tokio::{fs, sync::RwLock};
use tracing::{debug, info};
use url::Url;

use crate::{error::Error, formats::FormatType};

/// Destination for exported files.
#[async_trait]
pub trait StorageSink: Send + Sync {
    /// Stores `bytes` under `key` and returns the public URL of the object.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, Error>;
}

/// Object key of an exported locale: `site_<projectId>/locale/<iso>.<ext>`.
pub fn locale_key(project_id: &str, iso: &str, format: FormatType) -> String {
    format!("site_{}/locale/{}", project_id, format.file_name(iso))
}

fn check_key(key: &str) -> Result<(), Error> {
    let path = Path::new(key);
    let valid = !key.is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if valid {
        Ok(())
    } else {
        Err(Error::sink_error(key, "key must be a relative path without `..`"))
    }
}

/// Writes objects as files below a root directory.
#[derive(Debug, Clone)]
pub struct LocalSink {
    root: PathBuf,
    base_url: Option<String>,
}

impl LocalSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            base_url: None,
        }
    }

    /// Serve URLs as `<base_url>/<key>` instead of `file://` URLs.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn url_for(&self, key: &str, path: &Path) -> String {
        if let Some(base_url) = &self.base_url {
            return format!("{}/{}", base_url.trim_end_matches('/'), key);
        }
        Url::from_file_path(path)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| path.display().to_string())
    }
}

#[async_trait]
impl StorageSink for LocalSink {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, Error> {
        check_key(key)?;
        let path = self.root.join(key);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::sink_error(key, e.to_string()))?;
        }
        fs::write(&path, &bytes)
            .await
            .map_err(|e| Error::sink_error(key, e.to_string()))?;

        debug!(key = %key, path = ?path, size = bytes.len(), content_type, "Stored file");
        Ok(self.url_for(key, &path))
    }
}

/// An object held by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Keeps objects in memory. Selected keys can be made to fail.
#[derive(Debug, Default)]
pub struct MemorySink {
    objects: RwLock<BTreeMap<String, StoredObject>>,
    failing: RwLock<HashSet<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later `put` of `key` fail.
    pub async fn fail_key(&self, key: impl Into<String>) {
        self.failing.write().await.insert(key.into());
    }

    pub async fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }

    /// Stored keys in ascending order.
    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl StorageSink for MemorySink {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, Error> {
        check_key(key)?;
        if self.failing.read().await.contains(key) {
            info!(key = %key, "Rejecting upload of failing key");
            return Err(Error::sink_error(key, "simulated upload failure"));
        }

        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(format!("memory://{}", key))
    }
}
