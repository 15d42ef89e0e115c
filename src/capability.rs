//! Edit-permission checks supplied by the hosting environment
//!
//! The catalog never authenticates anyone itself. It asks an injected
//! [`CapabilityCheck`] whether the request may mutate books. The default
//! production check verifies a bearer token signed by the host.

use axum::http::request::Parts;
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;

/// Decides whether a request holds the "can edit content" capability.
pub trait CapabilityCheck: Send + Sync {
    fn can_edit(&self, parts: &Parts) -> bool;
}

impl<F> CapabilityCheck for F
where
    F: Fn(&Parts) -> bool + Send + Sync,
{
    fn can_edit(&self, parts: &Parts) -> bool {
        self(parts)
    }
}

/// Claims of a host-issued capability token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostClaims {
    pub sub: String,
    #[serde(default)]
    pub caps: Vec<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

impl HostClaims {
    /// Sign a token; the host normally does this, the admin console and tests
    /// use it to mint their own.
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse and verify a token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn has(&self, capability: &str) -> bool {
        self.caps.iter().any(|c| c == capability)
    }
}

/// `Authorization: Bearer <jwt>` check against the host's shared secret.
#[derive(Debug, Clone)]
pub struct BearerCapability {
    secret: String,
    capability: String,
}

impl BearerCapability {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            capability: config.edit_capability.clone(),
        }
    }
}

impl CapabilityCheck for BearerCapability {
    fn can_edit(&self, parts: &Parts) -> bool {
        let Some(Authorization(bearer)) = parts.headers.typed_get::<Authorization<Bearer>>() else {
            return false;
        };

        match HostClaims::from_token(bearer.token(), &self.secret) {
            Ok(claims) => claims.has(&self.capability),
            Err(e) => {
                tracing::debug!("Rejected capability token: {}", e);
                false
            }
        }
    }
}
