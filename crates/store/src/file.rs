use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use swallow_core::projects::{ProjectResolver, ProjectStoreError};
use swallow_core::{ProjectDefinition, ProjectId};
use tracing::debug;

/// Project definitions stored as `<directory>/<project_id>.json`.
pub struct FileProjectStore {
    directory: PathBuf,
}

impl FileProjectStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into() }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn path_for(&self, id: &ProjectId) -> PathBuf {
        self.directory.join(format!("{}.json", id.as_str()))
    }
}

#[async_trait::async_trait]
impl ProjectResolver for FileProjectStore {
    async fn resolve(&self, id: &ProjectId) -> Result<ProjectDefinition, ProjectStoreError> {
        let path = self.path_for(id);
        debug!(
            event_name = "store.project.read",
            project_id = %id,
            path = %path.display(),
            "reading project definition"
        );

        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                return Err(ProjectStoreError::NotFound(id.clone()));
            }
            Err(source) => {
                return Err(ProjectStoreError::Unavailable { project_id: id.clone(), source });
            }
        };

        serde_json::from_slice(&raw)
            .map(ProjectDefinition)
            .map_err(|source| ProjectStoreError::Corrupt { project_id: id.clone(), source })
    }
}
