//! # encore-auth
//!
//! Credential verification for Encore. Token issuance lives with the login
//! service; this crate only turns a presented bearer credential into a
//! verified identity.
//!
//! ## Modules
//!
//! - `verifier`: the `CredentialVerifier` seam and the verified identity
//! - `jwt`: HS256 JWT verification
//! - `credential`: locating the credential in a handshake or request

pub mod credential;
pub mod jwt;
pub mod verifier;

pub use credential::extract_credential;
pub use jwt::{Claims, JwtVerifier};
pub use verifier::{CredentialVerifier, VerifiedIdentity};
