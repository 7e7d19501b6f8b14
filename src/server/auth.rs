//! Session token verification.
//!
//! The remote store trusts only the user id carried by a verified session token.
//! Tokens are HS256-signed JWTs whose `sub` claim is the user id.

use crate::errors::{Error, Result};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Resolves a bearer credential to the authenticated user id.
pub trait TokenVerifier: Send + Sync {
    /// Returns the user id the token was issued for.
    ///
    /// # Errors
    /// Returns [`Error::Auth`] for any token that is malformed, forged or expired.
    fn verify(&self, token: &str) -> Result<String>;
}

/// Claims stored in a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id
    pub sub: String,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// HMAC-SHA256 session tokens sharing one secret with the auth service.
#[derive(Clone)]
pub struct SessionVerifier {
    decoding: DecodingKey,
    encoding: EncodingKey,
}

impl SessionVerifier {
    /// Verifier for the given shared secret.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            encoding: EncodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Mints a token for `user_id` valid for `ttl`.
    ///
    /// Used by tests and local tooling; production tokens come from the auth service.
    ///
    /// # Errors
    /// Returns [`Error::Auth`] if the clock is before the epoch or signing fails.
    pub fn issue(&self, user_id: &str, ttl: Duration) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| Error::Auth {
                reason: format!("System time error: {e}"),
            })?
            .as_secs();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + ttl.as_secs(),
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(|e| Error::Auth {
            reason: format!("Failed to sign token: {e}"),
        })
    }
}

impl TokenVerifier for SessionVerifier {
    fn verify(&self, token: &str) -> Result<String> {
        match decode::<SessionClaims>(token, &self.decoding, &Validation::default()) {
            Ok(data) if !data.claims.sub.is_empty() => Ok(data.claims.sub),
            Ok(_) => Err(Error::Auth {
                reason: "Token has no subject".to_string(),
            }),
            Err(err) => {
                let reason = match err.kind() {
                    ErrorKind::ExpiredSignature => "Token expired",
                    ErrorKind::InvalidSignature => "Invalid signature",
                    ErrorKind::InvalidToken => "Invalid token",
                    _ => "Token validation failed",
                };
                Err(Error::Auth {
                    reason: reason.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_issued_token_verifies() {
        let verifier = SessionVerifier::new(SECRET);
        let token = verifier.issue("alice", Duration::from_secs(600)).unwrap();
        assert_eq!(verifier.verify(&token).unwrap(), "alice");
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let token = SessionVerifier::new("another-secret-another-secret-xx")
            .issue("alice", Duration::from_secs(600))
            .unwrap();
        let result = SessionVerifier::new(SECRET).verify(&token);
        assert!(matches!(result, Err(Error::Auth { .. })));
    }

    #[test]
    fn test_expired_token_rejected() {
        let verifier = SessionVerifier::new(SECRET);
        let claims = SessionClaims {
            sub: "alice".to_string(),
            iat: 1,
            exp: 2,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes()))
            .unwrap();
        let Err(Error::Auth { reason }) = verifier.verify(&token) else {
            panic!("expired token accepted");
        };
        assert_eq!(reason, "Token expired");
    }

    #[test]
    fn test_garbage_rejected() {
        let result = SessionVerifier::new(SECRET).verify("not-a-jwt");
        assert!(matches!(result, Err(Error::Auth { .. })));
    }
}
