//! Locating the bearer credential in a handshake or request.

/// Picks the credential to verify.
///
/// An explicit token (handshake auth payload / `?token=` query, then the
/// `Authorization: Bearer` header) wins over the session cookie. Blank
/// values count as absent.
pub fn extract_credential(
    auth_payload: Option<&str>,
    bearer_header: Option<&str>,
    cookie: Option<&str>,
) -> Option<String> {
    [auth_payload, bearer_header, cookie]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|token| !token.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_payload_wins() {
        assert_eq!(
            extract_credential(Some("a"), Some("b"), Some("c")).as_deref(),
            Some("a")
        );
    }

    #[test]
    fn test_falls_back_to_cookie() {
        assert_eq!(
            extract_credential(None, Some("  "), Some("cookie-token")).as_deref(),
            Some("cookie-token")
        );
    }

    #[test]
    fn test_nothing_presented() {
        assert_eq!(extract_credential(None, None, None), None);
        assert_eq!(extract_credential(Some(""), None, Some(" ")), None);
    }
}
