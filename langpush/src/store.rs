//! Read access to a project's terms and translations.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::Error;

/// A locale configured for a project. Only these can be exported.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectLocale {
    pub id: String,
    pub project_id: String,
    /// Locale code, e.g. `fr` or `pt_BR`.
    pub code: String,
}

/// A term joined with its translation rows for one locale.
///
/// A well-formed store yields zero or one translation per row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermRow {
    pub term: String,
    pub translations: Vec<String>,
}

impl TermRow {
    /// The single translation of this row, or `""` when there is none or
    /// more than one.
    pub fn translation(&self) -> &str {
        match self.translations.as_slice() {
            [only] => only,
            _ => "",
        }
    }
}

#[async_trait]
pub trait TermStore: Send + Sync {
    /// Locales configured for the project, in configuration order.
    async fn project_locales(&self, project_id: &str) -> Result<Vec<ProjectLocale>, Error>;

    /// Every term of the project with its translations for `locale`,
    /// ordered by term ascending.
    async fn terms_with_translations(
        &self,
        project_id: &str,
        locale: &ProjectLocale,
    ) -> Result<Vec<TermRow>, Error>;

    async fn find_project_locale(
        &self,
        project_id: &str,
        code: &str,
    ) -> Result<Option<ProjectLocale>, Error> {
        Ok(self
            .project_locales(project_id)
            .await?
            .into_iter()
            .find(|locale| locale.code == code))
    }
}

/// Serialized form of a [`MemoryStore`].
///
/// ```json
/// {
///   "projects": [{
///     "id": "1",
///     "locales": ["en", "fr"],
///     "terms": [{ "value": "hello", "translations": [{ "locale": "fr", "value": "Bonjour" }] }]
///   }]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub projects: Vec<ProjectCatalog>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectCatalog {
    pub id: String,
    #[serde(default)]
    pub locales: Vec<String>,
    #[serde(default)]
    pub terms: Vec<TermCatalog>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCatalog {
    pub value: String,
    #[serde(default)]
    pub translations: Vec<CatalogTranslation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTranslation {
    pub locale: String,
    pub value: String,
}

/// A [`TermStore`] backed by an in-memory [`Catalog`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    catalog: RwLock<Catalog>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_catalog(catalog: Catalog) -> Self {
        Self {
            catalog: RwLock::new(catalog),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        Ok(Self::from_catalog(serde_json::from_str(json)?))
    }

    /// Loads a catalog from a JSON file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await?;
        let store = Self::from_json_str(&json)?;
        debug!(path = ?path, "Loaded term catalog");
        Ok(store)
    }

    /// Adds a project with its locales, replacing any project with the same id.
    pub async fn add_project(&self, project_id: &str, locales: &[&str]) {
        let mut catalog = self.catalog.write().await;
        catalog.projects.retain(|p| p.id != project_id);
        catalog.projects.push(ProjectCatalog {
            id: project_id.to_string(),
            locales: locales.iter().map(|l| l.to_string()).collect(),
            terms: Vec::new(),
        });
    }

    /// Adds a translation row, creating the term when needed.
    ///
    /// An empty `value` only creates the term.
    pub async fn add_translation(
        &self,
        project_id: &str,
        term: &str,
        locale: &str,
        value: &str,
    ) -> Result<(), Error> {
        let mut catalog = self.catalog.write().await;
        let project = catalog
            .projects
            .iter_mut()
            .find(|p| p.id == project_id)
            .ok_or_else(|| Error::NotFound(format!("project `{}`", project_id)))?;

        let index = match project.terms.iter().position(|t| t.value == term) {
            Some(index) => index,
            None => {
                project.terms.push(TermCatalog {
                    value: term.to_string(),
                    translations: Vec::new(),
                });
                project.terms.len() - 1
            }
        };
        if !value.is_empty() {
            project.terms[index].translations.push(CatalogTranslation {
                locale: locale.to_string(),
                value: value.to_string(),
            });
        }
        Ok(())
    }

    pub async fn catalog(&self) -> Catalog {
        self.catalog.read().await.clone()
    }
}

#[async_trait]
impl TermStore for MemoryStore {
    async fn project_locales(&self, project_id: &str) -> Result<Vec<ProjectLocale>, Error> {
        let catalog = self.catalog.read().await;
        Ok(catalog
            .projects
            .iter()
            .find(|p| p.id == project_id)
            .map(|project| {
                project
                    .locales
                    .iter()
                    .map(|code| ProjectLocale {
                        id: format!("{}/{}", project.id, code),
                        project_id: project.id.clone(),
                        code: code.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn terms_with_translations(
        &self,
        project_id: &str,
        locale: &ProjectLocale,
    ) -> Result<Vec<TermRow>, Error> {
        let catalog = self.catalog.read().await;
        let Some(project) = catalog.projects.iter().find(|p| p.id == project_id) else {
            return Ok(Vec::new());
        };

        let mut rows: Vec<TermRow> = project
            .terms
            .iter()
            .map(|term| TermRow {
                term: term.value.clone(),
                translations: term
                    .translations
                    .iter()
                    .filter(|t| t.locale == locale.code)
                    .map(|t| t.value.clone())
                    .collect(),
            })
            .collect();
        rows.sort_by(|a, b| a.term.cmp(&b.term));
        Ok(rows)
    }
}
