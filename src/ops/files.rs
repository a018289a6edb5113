use chrono::Utc;

use super::{OpError, Principal};
use crate::object_store::derive_key;
use crate::storage::models::FileRecord;
use crate::AppState;

pub struct CreateFileInput {
    pub name: String,
    pub mime_type: String,
    pub byte_size: u64,
    pub project_id: Option<String>,
}

pub struct CreatedFile {
    pub file: FileRecord,
    /// Pre-authorized write URL the client performs the actual transfer with.
    pub upload_url: String,
}

#[derive(Debug, Default)]
pub struct DeleteOutcome {
    /// Set when the entity row was removed but the backing object was not.
    /// Row deletion is the source of truth for "file is gone", so this is a
    /// warning, not a failure.
    pub storage_warning: Option<String>,
}

/// A file as seen by its owner or a grant recipient, annotated with sharing
/// metadata for the "shared by me" / "shared with me" views.
pub struct FileListing {
    pub file: FileRecord,
    /// Who shared this file with the caller (absent for owned files).
    pub shared_by_email: Option<String>,
    /// Everyone the caller shared this file with (empty for received files).
    pub shared_with_emails: Vec<String>,
}

/// Reserve an object key, issue an upload URL, and persist the file record.
/// The upload happens client-side afterwards and is not verified here.
pub async fn create_file(
    state: &AppState,
    principal: &Principal,
    input: CreateFileInput,
) -> Result<CreatedFile, OpError> {
    if input.name.trim().is_empty() {
        return Err(OpError::Validation("name must not be empty".to_string()));
    }
    if !input.mime_type.contains('/') {
        return Err(OpError::Validation(format!(
            "'{}' is not a valid MIME type",
            input.mime_type
        )));
    }

    if let Some(ref project_id) = input.project_id {
        let project = state
            .db
            .get_project(project_id)?
            .ok_or_else(|| OpError::NotFound("Project not found".to_string()))?;
        if project.owner_id != principal.id {
            return Err(OpError::Forbidden(
                "Only the project owner may add files to it".to_string(),
            ));
        }
    }

    let key = derive_key(&principal.id, &input.mime_type);
    let upload_url = state
        .object_store
        .issue_upload_url(&key, &input.mime_type)
        .map_err(|e| OpError::Upstream(e.to_string()))?;

    let file = FileRecord {
        id: uuid::Uuid::new_v4().to_string(),
        key,
        name: input.name,
        mime_type: input.mime_type,
        byte_size: input.byte_size,
        owner_id: principal.id.clone(),
        project_id: input.project_id,
        original_sender_email: None,
        created_at: Utc::now(),
    };
    state.db.put_file(&file)?;

    tracing::debug!(file_id = %file.id, key = %file.key, owner = %principal.id, "Created file");

    Ok(CreatedFile { file, upload_url })
}

/// Delete a file: entity row first (irreversible), then the backing object.
/// Owner-only.
pub async fn delete_file(
    state: &AppState,
    principal: &Principal,
    file_id: &str,
) -> Result<DeleteOutcome, OpError> {
    let file = state
        .db
        .get_file(file_id)?
        .ok_or_else(|| OpError::NotFound("File not found".to_string()))?;

    if file.owner_id != principal.id {
        return Err(OpError::Forbidden(
            "Only the file owner may delete it".to_string(),
        ));
    }

    state.db.delete_file(file_id)?;

    let mut outcome = DeleteOutcome::default();
    if let Err(e) = state.object_store.delete(&file.key).await {
        tracing::warn!(file_id = %file_id, key = %file.key, error = %e,
            "Failed to delete backing object after row removal");
        outcome.storage_warning = Some(format!(
            "file record removed, but storage cleanup failed: {e}"
        ));
    }

    tracing::debug!(file_id = %file_id, "Deleted file");
    Ok(outcome)
}

/// Union of files owned by the principal and files granted to them,
/// deduplicated and ordered by creation time descending.
pub fn list_files(state: &AppState, principal: &Principal) -> Result<Vec<FileListing>, OpError> {
    let mut listings = Vec::new();

    for file in state.db.files_by_owner(&principal.id)? {
        let mut shared_with_emails = Vec::new();
        for grant in state.db.grants_for_file(&file.id)? {
            if let Some(user) = state.db.get_user(&grant.shared_with)? {
                if !shared_with_emails.contains(&user.email) {
                    shared_with_emails.push(user.email);
                }
            }
        }
        listings.push(FileListing {
            file,
            shared_by_email: None,
            shared_with_emails,
        });
    }

    for grant in state.db.grants_for_user(&principal.id)? {
        let Some(file) = state.db.get_file(&grant.file_id)? else {
            continue;
        };
        if listings.iter().any(|l| l.file.id == file.id) {
            continue;
        }
        let shared_by_email = state
            .db
            .get_user(&grant.shared_by)?
            .map(|sharer| sharer.email);
        listings.push(FileListing {
            file,
            shared_by_email,
            shared_with_emails: Vec::new(),
        });
    }

    listings.sort_by(|a, b| b.file.created_at.cmp(&a.file.created_at));
    Ok(listings)
}

/// Issue a presigned read URL for a key. The entity store is the existence
/// check; the gateway itself never verifies the object.
pub fn get_download_url(
    state: &AppState,
    principal: &Principal,
    key: &str,
) -> Result<String, OpError> {
    let file = state
        .db
        .get_file_by_key(key)?
        .ok_or_else(|| OpError::NotFound("File not found".to_string()))?;

    let allowed = file.owner_id == principal.id || state.db.has_grant(&file.id, &principal.id)?;
    if !allowed {
        return Err(OpError::Forbidden(
            "You do not have access to this file".to_string(),
        ));
    }

    state
        .object_store
        .issue_download_url(key)
        .map_err(|e| OpError::Upstream(e.to_string()))
}
