//! JWT claims structure issued by the login service.

use serde::{Deserialize, Serialize};

use encore_core::types::id::UserId;

/// Claims payload embedded in every session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The user ID.
    pub id: UserId,
    /// Username at issuance time.
    #[serde(default)]
    pub username: Option<String>,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Issued-at timestamp (seconds since epoch).
    #[serde(default)]
    pub iat: Option<i64>,
}

impl Claims {
    /// Returns the user ID.
    pub fn user_id(&self) -> UserId {
        self.id
    }

    /// Username, or `user-{id}` when the token carries none.
    pub fn display_name(&self) -> String {
        match self.username.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("user-{}", self.id),
        }
    }
}
