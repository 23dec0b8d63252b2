//! Token issuance and verification
//!
//! Tokens are HS256 JWTs carrying `{id, email, type, isAdmin}` and are signed
//! with the shared secret from configuration.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::{Identity, Role};

/// Message returned for every rejected token
pub const INVALID_TOKEN: &str = "Invalid token!";

/// Default token lifetime
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Token payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub email: String,
    #[serde(rename = "type")]
    pub role: Role,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Identity {
            id: claims.id,
            email: claims.email,
            role: claims.role,
            is_admin: claims.is_admin,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Invalid token!")]
    Invalid,

    #[error("Failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Issues and verifies bearer tokens
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            ttl,
        }
    }

    /// Sign a token for the identity, valid from now
    pub fn issue(&self, identity: &Identity) -> Result<String, TokenError> {
        self.issue_at(identity, Utc::now())
    }

    /// Sign a token as if issued at `issued_at`
    pub fn issue_at(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            id: identity.id,
            email: identity.email.clone(),
            role: identity.role,
            is_admin: identity.is_admin,
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Verify the value of an `Authorization` header.
    ///
    /// The raw token is expected; a leading `Bearer ` is tolerated.
    pub fn verify(&self, authorization: Option<&str>) -> Result<Identity, TokenError> {
        let raw = authorization.map(str::trim).filter(|s| !s.is_empty()).ok_or(TokenError::Invalid)?;
        let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();

        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "Token rejected");
            TokenError::Invalid
        })?;

        Ok(data.claims.into())
    }
}
