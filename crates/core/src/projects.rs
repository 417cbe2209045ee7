use async_trait::async_trait;
use thiserror::Error;

use crate::domain::project::{ProjectDefinition, ProjectId};

#[derive(Debug, Error)]
pub enum ProjectStoreError {
    #[error("no project definition for `{0}`")]
    NotFound(ProjectId),
    #[error("project store unavailable while reading `{project_id}`: {source}")]
    Unavailable {
        project_id: ProjectId,
        #[source]
        source: std::io::Error,
    },
    #[error("project definition `{project_id}` is corrupt: {source}")]
    Corrupt {
        project_id: ProjectId,
        #[source]
        source: serde_json::Error,
    },
}

impl ProjectStoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Keyed, read-only lookup of pricing project definitions.
#[async_trait]
pub trait ProjectResolver: Send + Sync {
    async fn resolve(&self, id: &ProjectId) -> Result<ProjectDefinition, ProjectStoreError>;
}
