use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::files::index_add;
use super::models::ShareGrant;
use super::tables::*;

impl Database {
    // ========================================================================
    // Share grant operations
    // ========================================================================

    /// Insert a share grant and update the file and recipient indexes.
    /// Duplicate grants (same file, same recipient) are an idempotent no-op:
    /// concurrent shares against the same file must tolerate the race.
    /// Returns false if an equivalent grant already existed.
    pub fn insert_grant(&self, grant: &ShareGrant) -> Result<bool, DatabaseError> {
        debug_assert!(!grant.id.is_empty(), "grant id must not be empty");

        let write_txn = self.begin_write()?;

        let duplicate = {
            let existing_ids: Vec<String> = {
                let table = write_txn.open_table(FILE_GRANTS)?;
                let ids = match table.get(grant.file_id.as_str())? {
                    Some(data) => rmp_serde::from_slice(data.value())?,
                    None => Vec::new(),
                };
                ids
            };

            let grants_table = write_txn.open_table(GRANTS)?;
            let mut found = false;
            for grant_id in &existing_ids {
                if let Some(data) = grants_table.get(grant_id.as_str())? {
                    let existing: ShareGrant = rmp_serde::from_slice(data.value())?;
                    if existing.shared_with == grant.shared_with {
                        found = true;
                        break;
                    }
                }
            }
            found
        };

        if !duplicate {
            let mut table = write_txn.open_table(GRANTS)?;
            let data = rmp_serde::to_vec_named(grant)?;
            table.insert(grant.id.as_str(), data.as_slice())?;
            drop(table);

            index_add(&write_txn, FILE_GRANTS, &grant.file_id, &grant.id)?;
            index_add(&write_txn, USER_GRANTS, &grant.shared_with, &grant.id)?;
        }

        write_txn.commit()?;
        Ok(!duplicate)
    }

    /// Get all grants on a file
    pub fn grants_for_file(&self, file_id: &str) -> Result<Vec<ShareGrant>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let index_table = read_txn.open_table(FILE_GRANTS)?;
        let grants_table = read_txn.open_table(GRANTS)?;

        let grant_ids: Vec<String> = match index_table.get(file_id)? {
            Some(data) => rmp_serde::from_slice(data.value())?,
            None => return Ok(Vec::new()),
        };

        let mut grants = Vec::new();
        for grant_id in grant_ids {
            if let Some(data) = grants_table.get(grant_id.as_str())? {
                let grant: ShareGrant = rmp_serde::from_slice(data.value())?;
                grants.push(grant);
            }
        }

        Ok(grants)
    }

    /// Get all grants naming a user as recipient
    pub fn grants_for_user(&self, user_id: &str) -> Result<Vec<ShareGrant>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let index_table = read_txn.open_table(USER_GRANTS)?;
        let grants_table = read_txn.open_table(GRANTS)?;

        let grant_ids: Vec<String> = match index_table.get(user_id)? {
            Some(data) => rmp_serde::from_slice(data.value())?,
            None => return Ok(Vec::new()),
        };

        let mut grants = Vec::new();
        for grant_id in grant_ids {
            if let Some(data) = grants_table.get(grant_id.as_str())? {
                let grant: ShareGrant = rmp_serde::from_slice(data.value())?;
                grants.push(grant);
            }
        }

        Ok(grants)
    }

    /// Check whether a user holds a grant on a file
    pub fn has_grant(&self, file_id: &str, user_id: &str) -> Result<bool, DatabaseError> {
        Ok(self
            .grants_for_file(file_id)?
            .iter()
            .any(|g| g.shared_with == user_id))
    }
}
