pub mod db;
mod files;
pub mod models;
mod projects;
mod shares;
mod tables;
mod users;

pub use db::{Database, DatabaseError};
pub use tables::*;
