//! JWT session token handling
//!
//! Tokens are stateless: validity is purely a function of signature and
//! expiry, so there is no revocation before expiry. Verification checks
//! the signature first, then `exp`; `jsonwebtoken`'s default 60-second
//! leeway on expiry is kept as the clock-skew window.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT configuration, loaded once at startup and immutable thereafter.
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token expiration time in hours
    pub expiration_hours: i64,
    /// Issuer claim
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "change-me-in-production".to_string()),
            expiration_hours: std::env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(24),
            issuer: "backstage".to_string(),
        }
    }
}

/// Claims embedded in a session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
    /// Token ID, unique per issuance
    pub jti: String,
}

impl TokenClaims {
    fn new(user_id: &str, config: &JwtConfig) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(config.expiration_hours);

        Self {
            sub: user_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: config.issuer.clone(),
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Failure modes of authentication and authorization.
///
/// Callers need to tell these apart to produce the right client-facing
/// message; the HTTP mapping lives in `auth::middleware`.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Missing authentication token")]
    MissingToken,
    #[error("Invalid authentication token")]
    InvalidToken,
    #[error("Token has expired")]
    ExpiredToken,
    /// Token verified but its subject no longer exists. An account deleted
    /// after issuance is expected, so this is unauthorized rather than a
    /// server fault.
    #[error("Invalid token, user not found")]
    UnknownSubject,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Access denied: Not a band member")]
    NotBandMember,
    #[error("Access denied: Not a band admin")]
    NotBandAdmin,
}

/// Create a signed session token for a user
pub fn issue_token(
    user_id: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = TokenClaims::new(user_id, config);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify a session token and return its claims.
///
/// Signature integrity is checked before expiry; a tampered token is
/// `InvalidToken` even when it is also stale.
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<TokenClaims, AuthError> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "unit-test-secret".to_string(),
            expiration_hours: 1,
            issuer: "backstage".to_string(),
        }
    }

    #[test]
    fn issue_and_verify_round_trip() {
        let config = test_config();
        let token = issue_token("user-123", &config).unwrap();

        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.iss, "backstage");
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn each_issuance_is_a_distinct_token() {
        let config = test_config();
        let a = issue_token("user-123", &config).unwrap();
        let b = issue_token("user-123", &config).unwrap();
        assert_ne!(a, b);
        assert_eq!(
            verify_token(&a, &config).unwrap().sub,
            verify_token(&b, &config).unwrap().sub
        );
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        // Expiry far enough in the past to clear the 60s leeway
        let config = JwtConfig {
            expiration_hours: -2,
            ..test_config()
        };
        let token = issue_token("user-123", &config).unwrap();

        let err = verify_token(&token, &test_config()).unwrap_err();
        assert!(matches!(err, AuthError::ExpiredToken));
    }

    #[test]
    fn tampered_payload_fails_as_invalid() {
        let config = test_config();
        let token = issue_token("user-123", &config).unwrap();

        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        assert_eq!(parts.len(), 3);
        let mut payload: Vec<u8> = parts[1].clone().into_bytes();
        payload[0] = if payload[0] == b'A' { b'B' } else { b'A' };
        parts[1] = String::from_utf8(payload).unwrap();
        let tampered = parts.join(".");

        let err = verify_token(&tampered, &config).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn tampered_signature_fails_as_invalid() {
        let config = test_config();
        let token = issue_token("user-123", &config).unwrap();

        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        let mut sig: Vec<u8> = parts[2].clone().into_bytes();
        sig[0] = if sig[0] == b'A' { b'B' } else { b'A' };
        parts[2] = String::from_utf8(sig).unwrap();
        let tampered = parts.join(".");

        assert!(matches!(
            verify_token(&tampered, &config).unwrap_err(),
            AuthError::InvalidToken
        ));
    }

    #[test]
    fn wrong_secret_fails_as_invalid() {
        let token = issue_token("user-123", &test_config()).unwrap();
        let other = JwtConfig {
            secret: "another-secret".to_string(),
            ..test_config()
        };
        assert!(matches!(
            verify_token(&token, &other).unwrap_err(),
            AuthError::InvalidToken
        ));
    }

    #[test]
    fn wrong_issuer_fails_as_invalid() {
        let issuer_config = JwtConfig {
            issuer: "someone-else".to_string(),
            ..test_config()
        };
        let token = issue_token("user-123", &issuer_config).unwrap();
        assert!(matches!(
            verify_token(&token, &test_config()).unwrap_err(),
            AuthError::InvalidToken
        ));
    }

    #[test]
    fn garbage_fails_as_invalid() {
        assert!(matches!(
            verify_token("not-a-token", &test_config()).unwrap_err(),
            AuthError::InvalidToken
        ));
    }
}
