//! Caller identity and project authorization.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;

/// Grants every project when listed in [`TokenGrant::projects`].
pub const ALL_PROJECTS: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallerKind {
    /// A person signed in to the web app.
    #[default]
    User,
    /// An API client acting for a project.
    Client,
}

/// The user or API client behind a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Caller {
    pub id: String,
    #[serde(default)]
    pub kind: CallerKind,
}

impl Caller {
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: CallerKind::User,
        }
    }

    pub fn client(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: CallerKind::Client,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectAction {
    ExportTranslation,
}

/// Proof that a caller may act on a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub project_id: String,
    pub caller: Caller,
}

#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Resolves a bearer token to a caller. Unknown tokens are [`Error::Authz`].
    async fn authenticate(&self, token: &str) -> Result<Caller, Error>;

    /// Checks that `caller` may perform `action` on the project.
    ///
    /// Fails with [`Error::Forbidden`] when the caller is not a member.
    async fn authorize(
        &self,
        caller: &Caller,
        project_id: &str,
        action: ProjectAction,
    ) -> Result<Membership, Error>;
}

/// One configured API token and the projects it may access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub token: String,
    pub caller: String,
    #[serde(default)]
    pub kind: CallerKind,
    #[serde(default)]
    pub projects: Vec<String>,
}

impl TokenGrant {
    fn allows(&self, project_id: &str) -> bool {
        self.projects
            .iter()
            .any(|p| p == ALL_PROJECTS || p == project_id)
    }
}

/// An [`Authorizer`] driven by a fixed list of token grants.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenAuthorizer {
    grants: Vec<TokenGrant>,
}

impl StaticTokenAuthorizer {
    pub fn new(grants: Vec<TokenGrant>) -> Self {
        Self { grants }
    }

    /// Adds a grant, builder style.
    pub fn with_grant(mut self, token: &str, caller: Caller, projects: &[&str]) -> Self {
        self.grants.push(TokenGrant {
            token: token.to_string(),
            caller: caller.id,
            kind: caller.kind,
            projects: projects.iter().map(|p| p.to_string()).collect(),
        });
        self
    }
}

#[async_trait]
impl Authorizer for StaticTokenAuthorizer {
    async fn authenticate(&self, token: &str) -> Result<Caller, Error> {
        self.grants
            .iter()
            .find(|grant| grant.token == token)
            .map(|grant| Caller {
                id: grant.caller.clone(),
                kind: grant.kind,
            })
            .ok_or_else(|| Error::Authz("unknown access token".to_string()))
    }

    async fn authorize(
        &self,
        caller: &Caller,
        project_id: &str,
        action: ProjectAction,
    ) -> Result<Membership, Error> {
        let is_member = self
            .grants
            .iter()
            .filter(|grant| grant.caller == caller.id && grant.kind == caller.kind)
            .any(|grant| grant.allows(project_id));

        if !is_member {
            debug!(caller = %caller.id, project_id, ?action, "Access denied");
            return Err(Error::Forbidden(format!(
                "`{}` is not a member of project `{}`",
                caller.id, project_id
            )));
        }

        Ok(Membership {
            project_id: project_id.to_string(),
            caller: caller.clone(),
        })
    }
}
