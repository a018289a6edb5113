//! Domain operations behind the HTTP surface.
//!
//! Each operation takes the shared `AppState` plus an authenticated
//! `Principal` and returns either a success payload or an `OpError` from the
//! taxonomy below. Operations are short-lived request/response calls with no
//! shared in-process state; consistency comes from the entity store's
//! transactions.

pub mod files;
pub mod projects;
pub mod sharing;

use thiserror::Error;

use crate::storage::DatabaseError;

/// An authenticated identity. Resolution from credentials happens upstream;
/// operations only ever see a verified id/email pair.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: String,
    pub email: String,
}

/// Why a share target address was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareProblemKind {
    Malformed,
    SelfShare,
}

/// A per-address validation failure within a share request.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ShareProblem {
    pub email: String,
    pub kind: ShareProblemKind,
}

#[derive(Debug, Error)]
pub enum OpError {
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{}", describe_share_problems(.0))]
    InvalidShare(Vec<ShareProblem>),
    #[error("Upstream failure: {0}")]
    Upstream(String),
    #[error(transparent)]
    Storage(#[from] DatabaseError),
}

/// Aggregate every problem address into one user-facing message.
fn describe_share_problems(problems: &[ShareProblem]) -> String {
    let parts: Vec<String> = problems
        .iter()
        .map(|p| match p.kind {
            ShareProblemKind::Malformed => format!("'{}' is not a valid email address", p.email),
            ShareProblemKind::SelfShare => format!("'{}' is your own address", p.email),
        })
        .collect();
    format!("Share request rejected: {}", parts.join("; "))
}
