//! opskit-jwt: JSON Web Token validation helpers.
//!
//! [`validate`] checks a bearer authorization header: scheme, signature,
//! and (when configured) subject, audience, and time-bound assertions on
//! top of the baseline checks done by [`jsonwebtoken`].

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, Algorithm, DecodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

const BEARER_PREFIX: &str = "Bearer ";

/// Errors produced by token validation
#[derive(Error, Debug)]
pub enum JwtError {
    /// Authorization header does not carry a bearer token
    #[error("invalid authorization scheme")]
    InvalidScheme,

    /// Signature or baseline claim validation failed
    #[error("token validation failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Subject claim missing or not the expected one
    #[error("invalid token sub")]
    InvalidSubject,

    /// Audience claim missing an expected entry
    #[error("invalid token aud")]
    InvalidAudience,

    /// Expiration claim missing or too far in the future
    #[error("invalid token exp")]
    InvalidExpiration,

    /// Issued-at claim missing or too old
    #[error("invalid token iat")]
    InvalidIssuedAt,

    /// Not-before claim missing or too old
    #[error("invalid token nbf")]
    InvalidNotBefore,

    /// Claims did not deserialize into the requested type
    #[error("unable to parse claims: {0}")]
    Claims(#[from] serde_json::Error),

    /// Input is not a valid PEM block
    #[error("failed to decode pem block")]
    InvalidPem,
}

/// Assertions applied on top of signature validation.
/// Unset fields are not checked.
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    /// Full authorization header value, e.g. "Bearer eyJ..."
    pub authz: String,
    /// Require the subject claim to equal this value
    pub assert_subject: Option<String>,
    /// Require the audience claim to contain every listed entry
    pub assert_audience: Vec<String>,
    /// Reject tokens whose expiration lies further out than this
    pub max_expires_in: Option<Duration>,
    /// Reject tokens issued longer ago than this
    pub min_issued_within: Option<Duration>,
    /// Reject tokens whose not-before lies longer ago than this
    pub min_not_before_within: Option<Duration>,
}

/// A validated token: its header and the caller's claims type
#[derive(Debug, Clone)]
pub struct ValidatedToken<T> {
    pub header: Header,
    pub claims: T,
}

/// Validate a bearer token and its claims.
///
/// The signature and baseline expiry are verified by [`jsonwebtoken`];
/// the subject, audience, and time-window assertions from `opts` are then
/// checked against the raw claims before they are deserialized into `T`.
pub fn validate<T: DeserializeOwned>(
    opts: &ValidateOptions,
    key: &DecodingKey,
    algorithms: &[Algorithm],
) -> Result<ValidatedToken<T>, JwtError> {
    let token = bearer_token(&opts.authz).ok_or(JwtError::InvalidScheme)?;

    let mut validation = Validation::new(algorithms.first().copied().unwrap_or(Algorithm::HS256));
    validation.algorithms = algorithms.to_vec();
    // The audience assertion below requires every expected entry to be
    // present, which is stricter than the library's any-of matching
    validation.validate_aud = false;
    // Time-bound claims are only demanded by the assertions below; a token
    // without exp is acceptable unless max_expires_in is set
    validation.required_spec_claims = std::collections::HashSet::new();

    let decoded = decode::<Value>(token, key, &validation)?;
    let claims = &decoded.claims;
    let now = unix_now();

    if let Some(expected) = &opts.assert_subject {
        let subject = claims.get("sub").and_then(Value::as_str).unwrap_or_default();
        if subject.is_empty() || subject != expected {
            return Err(JwtError::InvalidSubject);
        }
    }

    if !opts.assert_audience.is_empty() {
        let audiences = audience_claim(claims);
        if audiences.is_empty() {
            return Err(JwtError::InvalidAudience);
        }

        for expected in &opts.assert_audience {
            if !audiences.iter().any(|aud| aud == expected) {
                return Err(JwtError::InvalidAudience);
            }
        }
    }

    if let Some(max) = opts.max_expires_in {
        let expires = claim_seconds(claims, "exp").ok_or(JwtError::InvalidExpiration)?;
        if expires > now + max.as_secs() as i64 {
            return Err(JwtError::InvalidExpiration);
        }
    }

    if let Some(min) = opts.min_issued_within {
        let issued = claim_seconds(claims, "iat").ok_or(JwtError::InvalidIssuedAt)?;
        if issued + (min.as_secs() as i64) < now {
            return Err(JwtError::InvalidIssuedAt);
        }
    }

    if let Some(min) = opts.min_not_before_within {
        let not_before = claim_seconds(claims, "nbf").ok_or(JwtError::InvalidNotBefore)?;
        if not_before + (min.as_secs() as i64) < now {
            return Err(JwtError::InvalidNotBefore);
        }
    }

    let claims: T = serde_json::from_value(decoded.claims)?;

    Ok(ValidatedToken {
        header: decoded.header,
        claims,
    })
}

/// A parsed public key: the DER contents of its PEM block and a stable
/// fingerprint usable as a key id
#[derive(Debug, Clone)]
pub struct ParsedKey {
    /// Lowercase hex SHA-256 of the DER contents
    pub kid: String,
    /// Raw DER contents
    pub der: Vec<u8>,
}

/// Parse a PEM-encoded public key and calculate its fingerprint
pub fn parse_public_key(key_pem: &[u8]) -> Result<ParsedKey, JwtError> {
    let block = pem::parse(key_pem).map_err(|_| JwtError::InvalidPem)?;
    let digest = Sha256::digest(block.contents());
    let kid = digest.iter().map(|b| format!("{b:02x}")).collect();

    Ok(ParsedKey {
        kid,
        der: block.contents().to_vec(),
    })
}

fn bearer_token(authz: &str) -> Option<&str> {
    let prefix = authz.get(..BEARER_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(BEARER_PREFIX) {
        return None;
    }

    let token = &authz[BEARER_PREFIX.len()..];
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

fn audience_claim(claims: &Value) -> Vec<&str> {
    match claims.get("aud") {
        Some(Value::String(aud)) => vec![aud.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn claim_seconds(claims: &Value, name: &str) -> Option<i64> {
    claims.get(name)?.as_i64()
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
