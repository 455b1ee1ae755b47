//! services/api/src/token.rs
//!
//! Minting and verification of the signed session credential.
//!
//! The credential is a JWT whose only payload is the subject user id plus the
//! standard issued-at/expiry claims. It is carried by the client in an
//! HTTP-only cookie and re-verified on every protected request; nothing is
//! stored server-side.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bhasha_core::{CoreError, CoreResult};

/// Fixed credential lifetime: 7 days from issuance.
pub const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// The signed claims inside a session credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's id.
    pub sub: Uuid,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Signs a new credential for `user_id` with the standard lifetime.
pub fn mint(user_id: Uuid, secret: &str) -> CoreResult<String> {
    mint_with_ttl(user_id, secret, Duration::seconds(SESSION_TTL_SECS))
}

fn mint_with_ttl(user_id: Uuid, secret: &str, ttl: Duration) -> CoreResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| CoreError::Storage(format!("failed to sign session token: {e}")))
}

/// Verifies a credential's signature and expiry, returning its claims.
///
/// Any tampering, expiry, or malformed token maps to
/// [`CoreError::Authentication`]; the caller cannot distinguish why a bad
/// token was rejected.
pub fn verify(token: &str, secret: &str) -> CoreResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| CoreError::Authentication("Invalid or expired session token".to_string()))
}
