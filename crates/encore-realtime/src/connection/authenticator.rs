//! WebSocket handshake authentication.

use std::sync::Arc;

use encore_auth::credential::extract_credential;
use encore_auth::verifier::{CredentialVerifier, VerifiedIdentity};
use encore_core::error::AppError;

/// Credential material presented with an upgrade request.
#[derive(Debug, Clone, Default)]
pub struct HandshakeCredentials {
    /// Explicit token from the handshake (`?token=` query).
    pub auth_token: Option<String>,
    /// `Authorization: Bearer` value.
    pub bearer: Option<String>,
    /// Session cookie value.
    pub cookie: Option<String>,
}

/// Authenticates WebSocket connections before they are accepted.
#[derive(Clone)]
pub struct WsAuthenticator {
    verifier: Arc<dyn CredentialVerifier>,
}

impl std::fmt::Debug for WsAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsAuthenticator").finish()
    }
}

impl WsAuthenticator {
    /// Creates a new WebSocket authenticator.
    pub fn new(verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { verifier }
    }

    /// Picks the credential from the handshake and verifies it.
    pub async fn authenticate(
        &self,
        credentials: &HandshakeCredentials,
    ) -> Result<VerifiedIdentity, AppError> {
        let raw = extract_credential(
            credentials.auth_token.as_deref(),
            credentials.bearer.as_deref(),
            credentials.cookie.as_deref(),
        )
        .ok_or_else(|| AppError::authentication("No token"))?;

        self.verifier.verify(&raw).await
    }
}
