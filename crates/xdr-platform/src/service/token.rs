//! Token Service
//!
//! Stateless HS256 bearer tokens carrying `{sub, role, iat, exp}`.
//! There is no revocation list: a token is valid until `exp`, and expiry is
//! checked against the local clock with no leeway.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Role;

#[derive(Debug, Error)]
pub enum TokenError {
    /// Bad signature, malformed encoding, or expired.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token has no subject")]
    MissingSubject,

    #[error("{0}")]
    Signing(String),
}

/// Claims embedded in every access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub role: Role,
    /// Issued-at (Unix seconds)
    pub iat: i64,
    /// Expiry (Unix seconds)
    pub exp: i64,
}

/// Identity recovered from a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub username: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, default_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is enforced by `verify_at` so the clock can be supplied.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Issue a token for `identity` valid for `ttl` from now.
    pub fn issue(&self, identity: &str, role: Role, ttl: Duration) -> Result<String, TokenError> {
        self.issue_at(identity, role, ttl, Utc::now())
    }

    /// Issue a token with the configured default lifetime.
    pub fn issue_default(&self, identity: &str, role: Role) -> Result<String, TokenError> {
        self.issue(identity, role, self.default_ttl)
    }

    pub fn issue_at(
        &self,
        identity: &str,
        role: Role,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = AccessTokenClaims {
            sub: Some(identity.to_string()),
            role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<VerifiedIdentity, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify signature and encoding, then reject when `now >= exp`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<VerifiedIdentity, TokenError> {
        let data = decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| TokenError::InvalidToken(e.to_string()))?;
        let claims = data.claims;

        if now.timestamp() >= claims.exp {
            return Err(TokenError::InvalidToken("token has expired".to_string()));
        }

        let username = claims
            .sub
            .filter(|s| !s.is_empty())
            .ok_or(TokenError::MissingSubject)?;

        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| TokenError::InvalidToken("exp out of range".to_string()))?;

        Ok(VerifiedIdentity {
            username,
            role: claims.role,
            expires_at,
        })
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn extract_bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", Duration::minutes(60))
    }

    #[test]
    fn test_issue_then_verify_round_trip() {
        let svc = service();
        for role in Role::ALL {
            let token = svc.issue("alice", *role, Duration::minutes(5)).unwrap();
            let identity = svc.verify(&token).unwrap();
            assert_eq!(identity.username, "alice");
            assert_eq!(identity.role, *role);
        }
    }

    #[test]
    fn test_valid_until_just_before_expiry() {
        let svc = service();
        let issued = Utc::now();
        let ttl = Duration::minutes(10);
        let token = svc.issue_at("bob", Role::Analyst, ttl, issued).unwrap();

        let just_before = issued + ttl - Duration::seconds(1);
        assert!(svc.verify_at(&token, just_before).is_ok());
    }

    #[test]
    fn test_rejected_at_and_after_expiry() {
        let svc = service();
        let issued = Utc::now();
        let ttl = Duration::minutes(10);
        let token = svc.issue_at("bob", Role::Analyst, ttl, issued).unwrap();

        for now in [issued + ttl, issued + ttl + Duration::hours(1)] {
            assert!(matches!(svc.verify_at(&token, now), Err(TokenError::InvalidToken(_))));
        }
    }

    #[test]
    fn test_already_expired_token_fails_verify() {
        let svc = service();
        let token = svc.issue("carol", Role::Viewer, Duration::seconds(-5)).unwrap();
        assert!(matches!(svc.verify(&token), Err(TokenError::InvalidToken(_))));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = service().issue("dave", Role::Admin, Duration::minutes(5)).unwrap();
        let other = TokenService::new("another-secret", Duration::minutes(60));
        assert!(matches!(other.verify(&token), Err(TokenError::InvalidToken(_))));
    }

    #[test]
    fn test_malformed_token_is_rejected() {
        let svc = service();
        assert!(matches!(svc.verify("not-a-jwt"), Err(TokenError::InvalidToken(_))));
        assert!(matches!(svc.verify(""), Err(TokenError::InvalidToken(_))));
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let svc = service();
        let viewer = svc.issue("erin", Role::Viewer, Duration::minutes(5)).unwrap();
        let admin = svc.issue("erin", Role::Admin, Duration::minutes(5)).unwrap();

        // admin payload with the viewer signature
        let viewer_parts: Vec<&str> = viewer.split('.').collect();
        let admin_payload = admin.split('.').nth(1).unwrap();
        let tampered = format!("{}.{}.{}", viewer_parts[0], admin_payload, viewer_parts[2]);

        assert!(matches!(svc.verify(&tampered), Err(TokenError::InvalidToken(_))));
    }

    #[test]
    fn test_missing_subject() {
        let svc = service();
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: None,
            role: Role::Viewer,
            iat: now.timestamp(),
            exp: (now + Duration::minutes(5)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(matches!(svc.verify(&token), Err(TokenError::MissingSubject)));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("Bearer"), None);
    }
}
