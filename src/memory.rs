use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::audit::{AuditAction, AuditLog, LogEntry};
use crate::error::StoreError;
use crate::users::repo::UserStore;
use crate::users::repo_types::{NewUser, User, UserChanges};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    logs: Vec<LogEntry>,
    next_user_id: i32,
}

/// Process-local stand-in for both tables, used by `AppState::fake()`.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        // a poisoned lock only means a test thread panicked mid-write
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn logs(&self) -> Vec<LogEntry> {
        self.lock().logs.clone()
    }

    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }
}

fn email_taken(tables: &Tables, email: &str, except: Option<i32>) -> bool {
    tables
        .users
        .values()
        .any(|u| u.email == email && Some(u.id) != except)
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.lock();
        if email_taken(&tables, &new_user.email, None) {
            return Err(StoreError::DuplicateEmail);
        }
        tables.next_user_id += 1;
        let user = User {
            id: tables.next_user_id,
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get(&self, id: i32) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.values().find(|u| u.email == email).cloned())
    }

    async fn update(&self, id: i32, changes: UserChanges) -> Result<Option<User>, StoreError> {
        let mut tables = self.lock();
        if !tables.users.contains_key(&id) {
            return Ok(None);
        }
        if let Some(email) = &changes.email {
            if email_taken(&tables, email, Some(id)) {
                return Err(StoreError::DuplicateEmail);
            }
        }
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        Ok(self.lock().users.remove(&id).is_some())
    }
}

#[async_trait]
impl AuditLog for MemoryStore {
    async fn record(&self, action: AuditAction) -> Result<LogEntry, StoreError> {
        let mut tables = self.lock();
        let entry = LogEntry {
            id: tables.logs.len() as i32 + 1,
            action_taken: action.as_str().to_string(),
            timestamp: OffsetDateTime::now_utc(),
        };
        tables.logs.push(entry.clone());
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ada".into(),
            email: email.into(),
            password_hash: "hash".into(),
        }
    }

    #[tokio::test]
    async fn ids_are_assigned_and_not_reused() {
        let store = MemoryStore::new();
        let a = store.create(new_user("a@example.com")).await.unwrap();
        assert!(store.delete(a.id).await.unwrap());
        let b = store.create(new_user("b@example.com")).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_without_a_second_row() {
        let store = MemoryStore::new();
        store.create(new_user("a@example.com")).await.unwrap();
        let err = store.create(new_user("a@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn update_to_another_users_email_conflicts() {
        let store = MemoryStore::new();
        store.create(new_user("a@example.com")).await.unwrap();
        let b = store.create(new_user("b@example.com")).await.unwrap();
        let changes = UserChanges {
            name: None,
            email: Some("a@example.com".into()),
        };
        let err = store.update(b.id, changes).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[tokio::test]
    async fn update_missing_row_returns_none() {
        let store = MemoryStore::new();
        let out = store.update(42, UserChanges::default()).await.unwrap();
        assert!(out.is_none());
        assert!(!store.delete(42).await.unwrap());
    }
}
