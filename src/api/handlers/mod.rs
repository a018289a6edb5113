mod admin;
mod files;
mod objects;
mod projects;
mod shares;
mod users;

pub use admin::{admin_purge, health};
pub use files::{create_file, delete_file, get_download_url, get_shared_access, list_files};
pub use objects::{get_object, put_object};
pub use projects::{create_project, delete_project, rename_project};
pub use shares::share_file;
pub use users::create_user;
