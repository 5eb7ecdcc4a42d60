//! API key validation
//!
//! Gates the explicit-path retrieval endpoint behind a single shared
//! secret. The key may arrive via the `X-API-Key` header or the
//! `api_key` query parameter; the guard is indifferent to the channel
//! and only compares values.

use crate::error::AuthError;

/// Compare a presented key against the configured secret.
///
/// An absent key and a mismatched key fail distinctly so callers can
/// tell "forgot to send a key" from "sent the wrong key". An empty
/// presented key counts as absent, so an unset secret never authorizes
/// anyone.
pub fn authorize(presented: Option<&str>, secret: &str) -> Result<(), AuthError> {
    let presented = presented.filter(|key| !key.is_empty()).ok_or(AuthError::MissingKey)?;
    if bytes_equal(presented.as_bytes(), secret.as_bytes()) {
        Ok(())
    } else {
        Err(AuthError::InvalidKey)
    }
}

/// Byte comparison that does not bail out at the first mismatch, so a
/// shared prefix does not shorten the comparison.
fn bytes_equal(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_key_is_missing() {
        assert!(matches!(
            authorize(None, "secret"),
            Err(AuthError::MissingKey)
        ));
        assert!(matches!(
            authorize(Some(""), "secret"),
            Err(AuthError::MissingKey)
        ));
    }

    #[test]
    fn wrong_key_is_invalid() {
        assert!(matches!(
            authorize(Some("nope"), "secret"),
            Err(AuthError::InvalidKey)
        ));
        // A shared prefix is still a mismatch.
        assert!(matches!(
            authorize(Some("secre"), "secret"),
            Err(AuthError::InvalidKey)
        ));
        assert!(matches!(
            authorize(Some("secret2"), "secret"),
            Err(AuthError::InvalidKey)
        ));
    }

    #[test]
    fn correct_key_is_authorized() {
        assert!(authorize(Some("secret"), "secret").is_ok());
    }

    #[test]
    fn empty_secret_authorizes_nobody() {
        // An unset secret locks the endpoint: an empty presented key is
        // treated as absent and anything else mismatches.
        assert!(matches!(authorize(Some(""), ""), Err(AuthError::MissingKey)));
        assert!(matches!(authorize(None, ""), Err(AuthError::MissingKey)));
        assert!(matches!(authorize(Some("x"), ""), Err(AuthError::InvalidKey)));
    }
}
