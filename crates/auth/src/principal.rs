//! Request-scoped principal.

use serde::{Deserialize, Serialize};

use stockline_core::UserId;

use crate::{Role, UserAccount};

/// The authenticated actor behind one request.
///
/// Built by upstream (API-key resolution) and passed explicitly into every
/// core call; the core keeps no process-wide session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: UserId, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
        }
    }
}

impl From<&UserAccount> for Principal {
    fn from(user: &UserAccount) -> Self {
        Self::new(user.id, user.username.clone(), user.role)
    }
}
