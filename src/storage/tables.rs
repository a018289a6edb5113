use redb::TableDefinition;

/// User records: uuid -> UserRecord (msgpack)
pub const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Email index: email -> user uuid (emails are unique)
pub const USER_EMAILS: TableDefinition<&str, &str> = TableDefinition::new("user_emails");

/// Project records: uuid -> ProjectRecord (msgpack)
pub const PROJECTS: TableDefinition<&str, &[u8]> = TableDefinition::new("projects");

/// File records: uuid -> FileRecord (msgpack)
pub const FILES: TableDefinition<&str, &[u8]> = TableDefinition::new("files");

/// Object key index: key -> file uuid (keys are unique)
pub const FILE_KEYS: TableDefinition<&str, &str> = TableDefinition::new("file_keys");

/// Owner index: owner uuid -> msgpack Vec of file UUIDs
pub const OWNER_FILES: TableDefinition<&str, &[u8]> = TableDefinition::new("owner_files");

/// Project index: project uuid -> msgpack Vec of file UUIDs
pub const PROJECT_FILES: TableDefinition<&str, &[u8]> = TableDefinition::new("project_files");

/// Share grants: uuid -> ShareGrant (msgpack)
pub const GRANTS: TableDefinition<&str, &[u8]> = TableDefinition::new("grants");

/// Grants by file: file uuid -> msgpack Vec of grant UUIDs
pub const FILE_GRANTS: TableDefinition<&str, &[u8]> = TableDefinition::new("file_grants");

/// Grants by recipient: user uuid -> msgpack Vec of grant UUIDs
pub const USER_GRANTS: TableDefinition<&str, &[u8]> = TableDefinition::new("user_grants");
