//! `AuthUser` extractor: pulls the credential from the Authorization header
//! or the session cookie, verifies it, and injects the identity.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};

use encore_auth::credential::extract_credential;
use encore_core::error::AppError;
use encore_core::types::id::UserId;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Verified user ID.
    pub user_id: UserId,
    /// Display name from the credential.
    pub display_name: String,
}

/// Bearer token from the `Authorization` header, if well-formed.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
}

/// Value of the named session cookie, if present.
pub fn session_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(name)
        .map(|cookie| cookie.value().to_string())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = bearer_token(&parts.headers);
        let cookie = session_cookie(&parts.headers, &state.config.auth.cookie_name);

        let token = extract_credential(None, bearer.as_deref(), cookie.as_deref())
            .ok_or_else(|| AppError::authentication("Missing credential"))?;

        let identity = state.verifier.verify(&token).await?;

        Ok(AuthUser {
            user_id: identity.user_id,
            display_name: identity.display_name,
        })
    }
}
