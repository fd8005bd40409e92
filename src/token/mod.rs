//! Signed session tokens.
//!
//! Access and refresh tokens share one claim shape and one constructor; they
//! differ in TTL and in the `kind` claim, which is checked on validation so a
//! refresh token is never accepted where an access token is expected (and
//! vice versa).

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Discriminates the two token lifetimes sharing the same claim shape.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject: the user id, stringified.
    pub sub: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub kind: TokenKind,
}

impl Claims {
    /// Parse the subject back into a user id.
    ///
    /// # Errors
    /// Returns [`Error::InvalidSubject`] if the claim is not a numeric id.
    pub fn user_id(&self) -> Result<i64, Error> {
        self.sub.parse().map_err(|_| Error::InvalidSubject)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("signing secret is empty")]
    EmptySecret,
    #[error("failed to sign token")]
    Signing,
    #[error("malformed token")]
    Malformed,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired or not yet valid")]
    Expired,
    #[error("invalid issuer or audience")]
    InvalidClaims,
    #[error("unexpected token kind")]
    WrongKind,
    #[error("subject is not a user id")]
    InvalidSubject,
}

/// Issues and validates HS256 tokens with a symmetric secret.
pub struct TokenSigner {
    secret: SecretString,
    issuer: String,
    audience: String,
}

impl TokenSigner {
    #[must_use]
    pub fn new(secret: SecretString, issuer: String, audience: String) -> Self {
        Self {
            secret,
            issuer,
            audience,
        }
    }

    /// Create a signed token for `subject` expiring `ttl_seconds` from now.
    ///
    /// # Errors
    /// Returns an error if the secret is empty or signing fails.
    pub fn issue(&self, subject: i64, ttl_seconds: i64, kind: TokenKind) -> Result<String, Error> {
        if self.secret.expose_secret().is_empty() {
            return Err(Error::EmptySecret);
        }

        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now,
            nbf: now,
            exp: now + ttl_seconds,
            kind,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes()),
        )
        .map_err(|_| Error::Signing)
    }

    /// Verify signature, temporal claims, issuer/audience, and token kind.
    ///
    /// # Errors
    /// Returns a typed error describing which check failed.
    pub fn validate(&self, token: &str, expected: TokenKind) -> Result<Claims, Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.validate_nbf = true;
        // No clock skew allowance: exp/nbf are compared against now as-is.
        validation.leeway = 0;

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
            &validation,
        )
        .map_err(|err| match err.kind() {
            ErrorKind::ExpiredSignature | ErrorKind::ImmatureSignature => Error::Expired,
            ErrorKind::InvalidSignature => Error::InvalidSignature,
            ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => Error::InvalidClaims,
            _ => Error::Malformed,
        })?;

        if decoded.claims.kind != expected {
            return Err(Error::WrongKind);
        }

        Ok(decoded.claims)
    }
}
