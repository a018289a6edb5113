use redb::{ReadableTable, TableDefinition, WriteTransaction};

use super::db::{Database, DatabaseError};
use super::models::{FileRecord, ShareGrant};
use super::tables::*;

impl Database {
    // ========================================================================
    // File operations
    // ========================================================================

    /// Store a file record and update the key, owner, and project indexes.
    /// Fails with `Duplicate` if the object key is already claimed by a
    /// different record -- keys are globally unique.
    pub fn put_file(&self, file: &FileRecord) -> Result<(), DatabaseError> {
        debug_assert!(!file.id.is_empty(), "file id must not be empty");
        debug_assert!(!file.key.is_empty(), "file key must not be empty");

        let write_txn = self.begin_write()?;
        {
            let mut key_table = write_txn.open_table(FILE_KEYS)?;
            if let Some(existing) = key_table.get(file.key.as_str())? {
                if existing.value() != file.id {
                    return Err(DatabaseError::Duplicate(file.key.clone()));
                }
            }
            key_table.insert(file.key.as_str(), file.id.as_str())?;

            let mut table = write_txn.open_table(FILES)?;
            let data = rmp_serde::to_vec_named(file)?;
            table.insert(file.id.as_str(), data.as_slice())?;

            index_add(&write_txn, OWNER_FILES, &file.owner_id, &file.id)?;
            if let Some(ref project_id) = file.project_id {
                index_add(&write_txn, PROJECT_FILES, project_id, &file.id)?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get a file by its UUID
    pub fn get_file(&self, id: &str) -> Result<Option<FileRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(FILES)?;

        match table.get(id)? {
            Some(data) => {
                let file: FileRecord = rmp_serde::from_slice(data.value())?;
                Ok(Some(file))
            }
            None => Ok(None),
        }
    }

    /// Get a file by its object key (resolves key -> uuid -> file)
    pub fn get_file_by_key(&self, key: &str) -> Result<Option<FileRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let key_table = read_txn.open_table(FILE_KEYS)?;

        let id = match key_table.get(key)? {
            Some(data) => data.value().to_string(),
            None => return Ok(None),
        };

        let files_table = read_txn.open_table(FILES)?;
        match files_table.get(id.as_str())? {
            Some(data) => {
                let file: FileRecord = rmp_serde::from_slice(data.value())?;
                Ok(Some(file))
            }
            None => Ok(None),
        }
    }

    /// Check if an object key is already claimed
    pub fn key_exists(&self, key: &str) -> Result<bool, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(FILE_KEYS)?;
        Ok(table.get(key)?.is_some())
    }

    /// Get all files owned by a user
    pub fn files_by_owner(&self, owner_id: &str) -> Result<Vec<FileRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let owner_table = read_txn.open_table(OWNER_FILES)?;
        let files_table = read_txn.open_table(FILES)?;

        let file_ids: Vec<String> = match owner_table.get(owner_id)? {
            Some(data) => rmp_serde::from_slice(data.value())?,
            None => return Ok(Vec::new()),
        };

        let mut files = Vec::new();
        for file_id in file_ids {
            if let Some(data) = files_table.get(file_id.as_str())? {
                let file: FileRecord = rmp_serde::from_slice(data.value())?;
                files.push(file);
            }
        }

        Ok(files)
    }

    /// Get all files grouped under a project
    pub fn files_by_project(&self, project_id: &str) -> Result<Vec<FileRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let project_table = read_txn.open_table(PROJECT_FILES)?;
        let files_table = read_txn.open_table(FILES)?;

        let file_ids: Vec<String> = match project_table.get(project_id)? {
            Some(data) => rmp_serde::from_slice(data.value())?,
            None => return Ok(Vec::new()),
        };

        let mut files = Vec::new();
        for file_id in file_ids {
            if let Some(data) = files_table.get(file_id.as_str())? {
                let file: FileRecord = rmp_serde::from_slice(data.value())?;
                files.push(file);
            }
        }

        Ok(files)
    }

    /// Delete a file by its UUID, cleaning up the key, owner, and project
    /// indexes along with every grant that references it.
    pub fn delete_file(&self, id: &str) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;

        // Get the file for index cleanup
        let file_info: Option<(String, String, Option<String>)> = {
            let table = write_txn.open_table(FILES)?;
            let info = match table.get(id)? {
                Some(data) => {
                    let file: FileRecord = rmp_serde::from_slice(data.value())?;
                    Some((file.key, file.owner_id, file.project_id))
                }
                None => None,
            };
            info
        };

        let deleted = match file_info {
            Some((key, owner_id, project_id)) => {
                {
                    let mut table = write_txn.open_table(FILES)?;
                    table.remove(id)?;
                }
                {
                    let mut key_table = write_txn.open_table(FILE_KEYS)?;
                    key_table.remove(key.as_str())?;
                }
                index_remove(&write_txn, OWNER_FILES, &owner_id, id)?;
                if let Some(ref project_id) = project_id {
                    index_remove(&write_txn, PROJECT_FILES, project_id, id)?;
                }
                remove_grants_for_file(&write_txn, id)?;
                true
            }
            None => false,
        };

        write_txn.commit()?;
        Ok(deleted)
    }

    /// Get all files (for admin/reconciliation tooling)
    pub fn get_all_files(&self) -> Result<Vec<FileRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(FILES)?;

        let mut files = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let file: FileRecord = rmp_serde::from_slice(value.value())?;
            files.push(file);
        }

        Ok(files)
    }
}

// ============================================================================
// Index maintenance (shared with shares.rs)
// ============================================================================

/// Add an id to a msgpack Vec index entry, creating the entry if needed.
pub(super) fn index_add(
    txn: &WriteTransaction,
    def: TableDefinition<&str, &[u8]>,
    index_key: &str,
    id: &str,
) -> Result<(), DatabaseError> {
    let mut table = txn.open_table(def)?;
    let mut ids: Vec<String> = match table.get(index_key)? {
        Some(data) => rmp_serde::from_slice(data.value())?,
        None => Vec::new(),
    };

    if !ids.iter().any(|existing| existing == id) {
        ids.push(id.to_string());
        let data = rmp_serde::to_vec_named(&ids)?;
        table.insert(index_key, data.as_slice())?;
    }
    Ok(())
}

/// Remove an id from a msgpack Vec index entry, dropping the entry when it
/// becomes empty.
pub(super) fn index_remove(
    txn: &WriteTransaction,
    def: TableDefinition<&str, &[u8]>,
    index_key: &str,
    id: &str,
) -> Result<(), DatabaseError> {
    let ids: Option<Vec<String>> = {
        let table = txn.open_table(def)?;
        let ids = match table.get(index_key)? {
            Some(data) => Some(rmp_serde::from_slice(data.value())?),
            None => None,
        };
        ids
    };

    if let Some(mut ids) = ids {
        ids.retain(|existing| existing != id);
        let mut table = txn.open_table(def)?;
        if ids.is_empty() {
            table.remove(index_key)?;
        } else {
            let data = rmp_serde::to_vec_named(&ids)?;
            table.insert(index_key, data.as_slice())?;
        }
    }
    Ok(())
}

/// Delete every grant referencing a file, including recipient index entries.
fn remove_grants_for_file(txn: &WriteTransaction, file_id: &str) -> Result<(), DatabaseError> {
    let grant_ids: Vec<String> = {
        let table = txn.open_table(FILE_GRANTS)?;
        let ids = match table.get(file_id)? {
            Some(data) => rmp_serde::from_slice(data.value())?,
            None => return Ok(()),
        };
        ids
    };

    for grant_id in &grant_ids {
        let grant: Option<ShareGrant> = {
            let table = txn.open_table(GRANTS)?;
            let grant = match table.get(grant_id.as_str())? {
                Some(data) => Some(rmp_serde::from_slice(data.value())?),
                None => None,
            };
            grant
        };

        if let Some(grant) = grant {
            index_remove(txn, USER_GRANTS, &grant.shared_with, grant_id)?;
            let mut table = txn.open_table(GRANTS)?;
            table.remove(grant_id.as_str())?;
        }
    }

    let mut table = txn.open_table(FILE_GRANTS)?;
    table.remove(file_id)?;
    Ok(())
}
