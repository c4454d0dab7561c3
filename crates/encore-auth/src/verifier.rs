//! The credential verification seam.

use async_trait::async_trait;

use encore_core::result::AppResult;
use encore_core::types::id::UserId;

/// Identity proven by a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    /// Authenticated user.
    pub user_id: UserId,
    /// Name to show for the user.
    pub display_name: String,
}

/// Turns a raw bearer credential into a verified identity.
///
/// Implementations fail with an `Authentication` error for missing,
/// malformed, expired, or forged credentials.
#[async_trait]
pub trait CredentialVerifier: Send + Sync + 'static {
    /// Verify `raw` and return the identity it proves.
    async fn verify(&self, raw: &str) -> AppResult<VerifiedIdentity>;
}
