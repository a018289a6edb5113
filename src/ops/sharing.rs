use chrono::Utc;
use futures::future::join_all;

use super::{OpError, Principal, ShareProblem, ShareProblemKind};
use crate::storage::models::{Permission, ShareGrant};
use crate::AppState;

/// Outcome of a share request. Unregistered addresses are a soft result: no
/// grant is written, but an invitation email still goes out.
#[derive(Debug)]
pub struct ShareReport {
    pub file_name: String,
    pub granted: Vec<String>,
    pub already_shared: Vec<String>,
    pub unregistered: Vec<String>,
    /// Number of notification sends attempted (best-effort; failures are
    /// logged, never surfaced).
    pub notified: usize,
}

/// Who may see a file and through whom, for the "shared by me" vs
/// "shared with me" views.
#[derive(Debug)]
pub struct SharedAccess {
    pub is_owner: bool,
    pub shared_by_email: Option<String>,
    pub shared_to_emails: Vec<String>,
}

/// Share a file with a list of email addresses.
///
/// Validation is atomic: every address is checked first and any malformed or
/// self-share address fails the whole call before a single grant is written.
/// Grants are idempotent -- re-sharing with an existing recipient is a no-op.
pub async fn share_file(
    state: &AppState,
    principal: &Principal,
    file_key: &str,
    emails: &[String],
) -> Result<ShareReport, OpError> {
    let file = state
        .db
        .get_file_by_key(file_key)?
        .ok_or_else(|| OpError::NotFound("File not found".to_string()))?;

    // Owner-only re-share policy: recipients cannot extend the share chain.
    if file.owner_id != principal.id {
        return Err(OpError::Forbidden(
            "Only the file owner may share it".to_string(),
        ));
    }

    // Normalize and collapse duplicates, preserving request order
    let mut targets: Vec<String> = Vec::new();
    for email in emails {
        let normalized = email.trim().to_lowercase();
        if !normalized.is_empty() && !targets.contains(&normalized) {
            targets.push(normalized);
        }
    }
    if targets.is_empty() {
        return Err(OpError::Validation(
            "at least one email address is required".to_string(),
        ));
    }

    // Validate everything before committing anything
    let mut problems = Vec::new();
    for email in &targets {
        if !is_valid_email(email) {
            problems.push(ShareProblem {
                email: email.clone(),
                kind: ShareProblemKind::Malformed,
            });
        } else if email.eq_ignore_ascii_case(&principal.email) {
            problems.push(ShareProblem {
                email: email.clone(),
                kind: ShareProblemKind::SelfShare,
            });
        }
    }
    if !problems.is_empty() {
        return Err(OpError::InvalidShare(problems));
    }

    let mut report = ShareReport {
        file_name: file.name.clone(),
        granted: Vec::new(),
        already_shared: Vec::new(),
        unregistered: Vec::new(),
        notified: 0,
    };

    for email in &targets {
        match state.db.get_user_by_email(email)? {
            Some(user) => {
                let grant = ShareGrant {
                    id: uuid::Uuid::new_v4().to_string(),
                    file_id: file.id.clone(),
                    shared_with: user.id,
                    shared_by: principal.id.clone(),
                    permission: Permission::Read,
                    created_at: Utc::now(),
                };
                if state.db.insert_grant(&grant)? {
                    report.granted.push(email.clone());
                } else {
                    report.already_shared.push(email.clone());
                }
            }
            None => {
                tracing::debug!(email = %email, "Share target not registered; sending invitation only");
                report.unregistered.push(email.clone());
            }
        }
    }

    report.notified = notify_recipients(state, principal, &file.name, &targets).await;

    tracing::debug!(
        file_id = %file.id,
        granted = report.granted.len(),
        already_shared = report.already_shared.len(),
        unregistered = report.unregistered.len(),
        "Shared file"
    );

    Ok(report)
}

/// Unordered fan-out of one email per recipient. Each send swallows and logs
/// its own error so a slow or failing recipient never blocks the others.
async fn notify_recipients(
    state: &AppState,
    principal: &Principal,
    file_name: &str,
    targets: &[String],
) -> usize {
    let subject = "Files shared with you";
    let text = format!(
        "{} shared the following file with you: {file_name}",
        principal.email
    );
    let html = format!(
        "<p>The following file has been shared with you:</p>\
         <ul><li>{file_name} (shared by: {})</li></ul>",
        principal.email
    );

    let sends = targets.iter().map(|to| {
        let notifier = &state.notifier;
        let text = &text;
        let html = &html;
        async move {
            if let Err(e) = notifier.send(to, subject, text, html).await {
                tracing::warn!(to = %to, error = %e, "Failed to send share notification");
            }
        }
    });
    join_all(sends).await;

    targets.len()
}

/// Resolve a caller's relationship to a file and the full recipient list.
pub fn get_shared_access(
    state: &AppState,
    principal: &Principal,
    file_id: &str,
) -> Result<SharedAccess, OpError> {
    let file = state
        .db
        .get_file(file_id)?
        .ok_or_else(|| OpError::NotFound("File not found".to_string()))?;

    let grants = state.db.grants_for_file(file_id)?;
    let is_owner = file.owner_id == principal.id;
    let own_grant = grants.iter().find(|g| g.shared_with == principal.id);

    if !is_owner && own_grant.is_none() {
        return Err(OpError::Forbidden(
            "You do not have access to this file".to_string(),
        ));
    }

    let shared_by_email = match own_grant {
        Some(grant) => state.db.get_user(&grant.shared_by)?.map(|u| u.email),
        None => None,
    };

    let mut shared_to_emails = Vec::new();
    for grant in &grants {
        if let Some(user) = state.db.get_user(&grant.shared_with)? {
            if !shared_to_emails.contains(&user.email) {
                shared_to_emails.push(user.email);
            }
        }
    }

    Ok(SharedAccess {
        is_owner,
        shared_by_email,
        shared_to_emails,
    })
}

/// RFC-5322-ish shape check: one `@`, a non-empty local part, and a dotted
/// domain. Deliverability is the mail provider's problem.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() || local.len() > 64 || domain.len() < 3 {
        return false;
    }
    if email.chars().any(char::is_whitespace) || email.contains("..") {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') {
        return false;
    }
    domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.starts_with('-')
        && !domain.contains('@')
}

#[cfg(test)]
mod tests {
    use super::is_valid_email;

    #[test]
    fn accepts_common_addresses() {
        assert!(is_valid_email("b@example.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));
        assert!(is_valid_email("user+tag@example.co.uk"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@nodot"));
        assert!(!is_valid_email("user@.com"));
        assert!(!is_valid_email("user@domain."));
        assert!(!is_valid_email("us er@example.com"));
        assert!(!is_valid_email("user..dots@example.com"));
        assert!(!is_valid_email(".user@example.com"));
    }
}
