use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::ProjectRecord;
use super::tables::*;

impl Database {
    // ========================================================================
    // Project operations
    // ========================================================================

    /// Store a project record
    pub fn put_project(&self, project: &ProjectRecord) -> Result<(), DatabaseError> {
        debug_assert!(!project.id.is_empty(), "project id must not be empty");

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(PROJECTS)?;
            let data = rmp_serde::to_vec_named(project)?;
            table.insert(project.id.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get a project by its UUID
    pub fn get_project(&self, id: &str) -> Result<Option<ProjectRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(PROJECTS)?;

        match table.get(id)? {
            Some(data) => {
                let project: ProjectRecord = rmp_serde::from_slice(data.value())?;
                Ok(Some(project))
            }
            None => Ok(None),
        }
    }

    /// Rename a project. Returns false if the project does not exist.
    pub fn rename_project(&self, id: &str, name: &str) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;

        let existing = {
            let table = write_txn.open_table(PROJECTS)?;
            let existing = match table.get(id)? {
                Some(data) => Some(rmp_serde::from_slice::<ProjectRecord>(data.value())?),
                None => None,
            };
            existing
        };

        let renamed = match existing {
            Some(mut project) => {
                project.name = name.to_string();
                let data = rmp_serde::to_vec_named(&project)?;
                let mut table = write_txn.open_table(PROJECTS)?;
                table.insert(id, data.as_slice())?;
                true
            }
            None => false,
        };

        write_txn.commit()?;
        Ok(renamed)
    }

    /// Delete a project row. Member files are the caller's responsibility --
    /// the lifecycle layer walks them through the per-file delete path first
    /// so backing objects are released.
    pub fn delete_project(&self, id: &str) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;

        let deleted = {
            let mut table = write_txn.open_table(PROJECTS)?;
            let removed = table.remove(id)?.is_some();
            removed
        };

        write_txn.commit()?;
        Ok(deleted)
    }
}
