pub mod repo;
pub mod repo_types;

pub use repo::{AuditLog, PgAuditLog};
pub use repo_types::{AuditAction, LogEntry};

use tracing::{debug, error};

/// Writes the audit row for an already committed mutation.
///
/// A failure here never changes the outcome of the request: the primary
/// write has been committed, so the error is only logged.
pub async fn record_best_effort(audit: &dyn AuditLog, action: AuditAction) {
    match audit.record(action).await {
        Ok(entry) => debug!(log_id = entry.id, action = %action, "audit entry written"),
        Err(e) => error!(error = %e, action = %action, "audit entry lost"),
    }
}
