//! Session credential codec (signed cookie).
//!
//! Sessions are HS256-signed tokens carried in the `quill_session` cookie.
//! Resolution is a pure read: a missing, malformed, forged or expired
//! credential is indistinguishable from "no session" and yields `None`,
//! never an error. Session *issuance* lives here too so that operator
//! tooling and tests share one codec; interactive login is an external
//! collaborator.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use quill_core::UserId;

use crate::{Identity, Role};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "quill_session";

/// Claims carried inside the session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject / user identifier.
    pub sub: UserId,

    /// Email of the authenticated identity.
    pub email: String,

    /// Role tag granted to the identity.
    pub role: Role,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate session claims against a clock reading.
pub fn validate_claims(
    claims: &SessionClaims,
    now: DateTime<Utc>,
) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

/// Session issuance error.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to encode session token: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),
}

/// Symmetric key material for the session codec.
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl SessionKeys {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // The time window lives in our own claims (RFC 3339 timestamps) and
        // is checked by `validate_claims`, not by the numeric `exp` claim.
        validation.validate_exp = false;
        validation.required_spec_claims = Default::default();

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Mint a session token for an identity.
    pub fn issue(
        &self,
        identity: &Identity,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, SessionError> {
        let claims = SessionClaims {
            sub: identity.user_id,
            email: identity.email.clone(),
            role: identity.role.clone(),
            issued_at: now,
            expires_at: now + ttl,
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(token)
    }

    /// Resolve the current identity from a request's `Cookie` header value.
    ///
    /// Absence is a normal outcome: any failure along the way (no header, no
    /// session cookie, bad signature, expired window) yields `None`.
    pub fn resolve(&self, cookie_header: Option<&str>, now: DateTime<Utc>) -> Option<Identity> {
        let token = session_cookie_value(cookie_header?)?;
        let claims = self.decode(token)?;
        validate_claims(&claims, now).ok()?;

        Some(Identity {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }

    fn decode(&self, token: &str) -> Option<SessionClaims> {
        jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .ok()
    }
}

/// Extract the session cookie value from a `Cookie` header.
fn session_cookie_value(header: &str) -> Option<&str> {
    header.split(';').find_map(|pair| {
        let pair = pair.trim();
        let value = pair.strip_prefix(SESSION_COOKIE)?.strip_prefix('=')?;
        if value.is_empty() { None } else { Some(value) }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> SessionKeys {
        SessionKeys::new(b"test-secret")
    }

    fn alice() -> Identity {
        Identity::new(UserId::new(), "alice@example.com", Role::admin())
    }

    fn cookie_for(token: &str) -> String {
        format!("theme=dark; {SESSION_COOKIE}={token}; lang=en")
    }

    #[test]
    fn issue_then_resolve_roundtrip() {
        let keys = keys();
        let identity = alice();
        let now = Utc::now();

        let token = keys.issue(&identity, Duration::minutes(30), now).unwrap();
        let resolved = keys.resolve(Some(&cookie_for(&token)), now).unwrap();

        assert_eq!(resolved, identity);
    }

    #[test]
    fn missing_header_is_no_session() {
        assert_eq!(keys().resolve(None, Utc::now()), None);
    }

    #[test]
    fn unrelated_cookies_are_no_session() {
        assert_eq!(keys().resolve(Some("theme=dark; lang=en"), Utc::now()), None);
    }

    #[test]
    fn garbage_token_is_no_session() {
        let cookie = format!("{SESSION_COOKIE}=not-a-token");
        assert_eq!(keys().resolve(Some(&cookie), Utc::now()), None);
    }

    #[test]
    fn forged_signature_is_no_session() {
        let now = Utc::now();
        let token = SessionKeys::new(b"other-secret")
            .issue(&alice(), Duration::minutes(30), now)
            .unwrap();

        assert_eq!(keys().resolve(Some(&cookie_for(&token)), now), None);
    }

    #[test]
    fn expired_token_is_no_session() {
        let keys = keys();
        let issued = Utc::now() - Duration::hours(2);
        let token = keys.issue(&alice(), Duration::minutes(30), issued).unwrap();

        assert_eq!(keys.resolve(Some(&cookie_for(&token)), Utc::now()), None);
    }

    #[test]
    fn claims_window_validation() {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: UserId::new(),
            email: "a@example.com".to_string(),
            role: Role::new("editor"),
            issued_at: now,
            expires_at: now,
        };
        assert_eq!(
            validate_claims(&claims, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );

        let claims = SessionClaims {
            issued_at: now + Duration::minutes(5),
            expires_at: now + Duration::minutes(10),
            ..claims
        };
        assert_eq!(
            validate_claims(&claims, now),
            Err(TokenValidationError::NotYetValid)
        );
    }
}
