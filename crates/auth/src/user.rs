//! User account record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stockline_core::{DomainError, DomainResult, UserId};

use crate::Role;

/// A user account as stored by the persistence collaborator.
///
/// # Invariants
/// - `username` and `api_key` are unique (enforced by the store).
/// - Role is the sole capability axis; users own nothing.
/// - Inactive accounts cannot authenticate but are never hard-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    /// Opaque API credential presented by upstream callers.
    pub api_key: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserAccount {
    /// Build a new account with a freshly generated API key.
    ///
    /// The id is a placeholder until the store assigns one.
    pub fn new(
        username: impl Into<String>,
        full_name: impl Into<String>,
        role: Role,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let username = username.into();
        let full_name = full_name.into();

        if username.trim().is_empty() {
            return Err(DomainError::validation("username cannot be empty"));
        }
        if full_name.trim().is_empty() {
            return Err(DomainError::validation("full name cannot be empty"));
        }

        Ok(Self {
            id: UserId::new(0),
            username: username.trim().to_string(),
            full_name: full_name.trim().to_string(),
            role,
            api_key: Uuid::new_v4().to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Pin the API key (seed fixtures with well-known demo keys).
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Change the account's role, bumping `updated_at`.
    pub fn with_role(mut self, role: Role, now: DateTime<Utc>) -> Self {
        self.role = role;
        self.updated_at = now;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_account_is_active_with_generated_key() {
        let now = Utc::now();
        let user = UserAccount::new("alice", "Alice Smith", Role::Manager, now).unwrap();
        assert!(user.is_active);
        assert!(!user.api_key.is_empty());
        assert_eq!(user.role, Role::Manager);
    }

    #[test]
    fn empty_username_rejected() {
        let err = UserAccount::new("  ", "Nobody", Role::Viewer, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn role_change_bumps_updated_at() {
        let created = Utc::now();
        let user = UserAccount::new("bob", "Bob", Role::Viewer, created).unwrap();
        let later = created + chrono::Duration::seconds(5);
        let promoted = user.with_role(Role::Manager, later);
        assert_eq!(promoted.role, Role::Manager);
        assert_eq!(promoted.updated_at, later);
    }
}
