use std::collections::HashMap;

use tokio::sync::RwLock;

use swallow_core::projects::{ProjectResolver, ProjectStoreError};
use swallow_core::{ProjectDefinition, ProjectId};

#[derive(Default)]
pub struct InMemoryProjectStore {
    projects: RwLock<HashMap<String, ProjectDefinition>>,
}

impl InMemoryProjectStore {
    pub async fn insert(&self, id: ProjectId, definition: ProjectDefinition) {
        let mut projects = self.projects.write().await;
        projects.insert(id.as_str().to_string(), definition);
    }

    pub async fn remove(&self, id: &ProjectId) -> Option<ProjectDefinition> {
        let mut projects = self.projects.write().await;
        projects.remove(id.as_str())
    }
}

#[async_trait::async_trait]
impl ProjectResolver for InMemoryProjectStore {
    async fn resolve(&self, id: &ProjectId) -> Result<ProjectDefinition, ProjectStoreError> {
        let projects = self.projects.read().await;
        projects.get(id.as_str()).cloned().ok_or_else(|| ProjectStoreError::NotFound(id.clone()))
    }
}
