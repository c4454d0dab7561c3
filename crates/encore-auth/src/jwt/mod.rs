//! JWT verification and claims.

pub mod claims;
pub mod decoder;

pub use claims::Claims;
pub use decoder::JwtVerifier;
