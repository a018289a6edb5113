use chrono::Utc;

use super::{OpError, Principal};
use crate::storage::models::ProjectRecord;
use crate::AppState;

#[derive(Debug, Default)]
pub struct ProjectCascade {
    pub files_deleted: u64,
    /// One entry per backing object that could not be removed. The entity
    /// rows are gone regardless; these are retry candidates for cleanup
    /// tooling.
    pub storage_warnings: Vec<String>,
}

pub fn create_project(
    state: &AppState,
    principal: &Principal,
    name: &str,
) -> Result<ProjectRecord, OpError> {
    if name.trim().is_empty() {
        return Err(OpError::Validation("name must not be empty".to_string()));
    }

    let project = ProjectRecord {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.to_string(),
        owner_id: principal.id.clone(),
        created_at: Utc::now(),
    };
    state.db.put_project(&project)?;

    tracing::debug!(project_id = %project.id, owner = %principal.id, "Created project");
    Ok(project)
}

/// Rename a project. Owner-only.
pub fn rename_project(
    state: &AppState,
    principal: &Principal,
    project_id: &str,
    name: &str,
) -> Result<ProjectRecord, OpError> {
    if name.trim().is_empty() {
        return Err(OpError::Validation("name must not be empty".to_string()));
    }

    let project = state
        .db
        .get_project(project_id)?
        .ok_or_else(|| OpError::NotFound("Project not found".to_string()))?;
    if project.owner_id != principal.id {
        return Err(OpError::Forbidden(
            "Only the project owner may rename it".to_string(),
        ));
    }

    state.db.rename_project(project_id, name)?;

    tracing::debug!(project_id = %project_id, "Renamed project");
    Ok(ProjectRecord {
        name: name.to_string(),
        ..project
    })
}

/// Delete a project and cascade to member files. Each file goes through the
/// full delete path -- row, grants, and backing object -- so the cascade
/// never leaks storage.
pub async fn delete_project(
    state: &AppState,
    principal: &Principal,
    project_id: &str,
) -> Result<ProjectCascade, OpError> {
    let project = state
        .db
        .get_project(project_id)?
        .ok_or_else(|| OpError::NotFound("Project not found".to_string()))?;
    if project.owner_id != principal.id {
        return Err(OpError::Forbidden(
            "Only the project owner may delete it".to_string(),
        ));
    }

    let mut cascade = ProjectCascade::default();
    for file in state.db.files_by_project(project_id)? {
        state.db.delete_file(&file.id)?;
        cascade.files_deleted += 1;

        if let Err(e) = state.object_store.delete(&file.key).await {
            tracing::warn!(file_id = %file.id, key = %file.key, error = %e,
                "Failed to delete backing object during project cascade");
            cascade
                .storage_warnings
                .push(format!("{}: {e}", file.key));
        }
    }

    state.db.delete_project(project_id)?;

    tracing::debug!(project_id = %project_id, files = cascade.files_deleted, "Deleted project");
    Ok(cascade)
}
