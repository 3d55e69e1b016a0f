use async_trait::async_trait;
use sqlx::PgPool;

use crate::audit::repo_types::{AuditAction, LogEntry};
use crate::error::StoreError;

#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Appends one row stamped with the current time.
    async fn record(&self, action: AuditAction) -> Result<LogEntry, StoreError>;
}

#[derive(Clone)]
pub struct PgAuditLog {
    db: PgPool,
}

impl PgAuditLog {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditLog for PgAuditLog {
    async fn record(&self, action: AuditAction) -> Result<LogEntry, StoreError> {
        let entry = sqlx::query_as::<_, LogEntry>(
            r#"
            INSERT INTO public.logs (action_taken, timestamp)
            VALUES ($1, now())
            RETURNING id, action_taken, timestamp
            "#,
        )
        .bind(action.as_str())
        .fetch_one(&self.db)
        .await?;
        Ok(entry)
    }
}
