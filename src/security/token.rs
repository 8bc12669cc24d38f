use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::MIN_SECRET_BYTES;
use crate::error::{AppError, Result};

/// The registered claims carried by every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username). Defaults to empty when absent so extraction can
    /// report the blank subject instead of failing deserialization.
    #[serde(default)]
    pub sub: String,
    /// Issuer.
    #[serde(default)]
    pub iss: String,
    /// Issued at (seconds since epoch). Foreign tokens may omit it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Expiration time (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// Whether the token has expired. A token expiring exactly now is still
    /// accepted, matching the decode-level check.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// The result of issuing a token.
#[derive(Debug, Clone)]
pub struct TokenData {
    /// The signed, compact-encoded token.
    pub token: String,
    /// When the token was issued.
    pub issued_at: DateTime<Utc>,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
}

/// Issues and checks HS256 bearer tokens.
///
/// `validate` is total: every failure folds to `false`. `extract_username`
/// is partial and reports what went wrong, because its callers need to tell
/// a missing subject apart from an undecodable token.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    secret_len: usize,
    issuer: String,
    expiration_ms: i64,
}

impl TokenCodec {
    pub fn new(secret: &str, issuer: String, expiration_ms: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            secret_len: secret.len(),
            issuer,
            expiration_ms,
        }
    }

    /// Signature and expiry are checked at decode; issuer and issued-at are
    /// checked by hand afterwards.
    fn strict_validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.validate_nbf = false;
        validation
    }

    /// Issues a token for `username`.
    ///
    /// # Returns
    ///
    /// A `Result` containing the signed token with its issue and expiry
    /// instants.
    pub fn issue(&self, username: &str) -> Result<TokenData> {
        if username.trim().is_empty() {
            return Err(AppError::InvalidArgument(
                "Username cannot be null or empty".to_string(),
            ));
        }

        // Checked at startup too; re-checked here so a codec constructed
        // around the config can never sign with a weak secret.
        if self.secret_len < MIN_SECRET_BYTES {
            return Err(AppError::Configuration(format!(
                "JWT secret key must be at least {} bytes long",
                MIN_SECRET_BYTES
            )));
        }

        let issued_at = Utc::now();
        let expires_at = issued_at + Duration::milliseconds(self.expiration_ms);

        let claims = Claims {
            sub: username.to_string(),
            iss: self.issuer.clone(),
            iat: Some(issued_at.timestamp()),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))?;

        Ok(TokenData {
            token,
            issued_at,
            expires_at,
        })
    }

    /// Checks whether `token` is acceptable: well-formed, signed with our
    /// secret, from our issuer, unexpired, and not issued in the future.
    ///
    /// Never fails loudly; any problem answers `false`.
    pub fn validate(&self, token: &str) -> bool {
        if token.trim().is_empty() {
            return false;
        }

        let data = match decode::<Claims>(token, &self.decoding_key, &Self::strict_validation()) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Token rejected: {}", e);
                return false;
            }
        };

        let claims = data.claims;

        if claims.iss != self.issuer {
            tracing::warn!("Invalid issuer {}", claims.iss);
            return false;
        }

        if claims.is_expired() {
            return false;
        }

        let now = Utc::now().timestamp();
        match claims.iat {
            Some(issued_at) => issued_at <= now,
            None => true,
        }
    }

    /// Extracts the subject from a decodable token.
    ///
    /// Does not check the issuer; callers gate on [`TokenCodec::validate`]
    /// first.
    pub fn extract_username(&self, token: &str) -> Result<String> {
        if token.trim().is_empty() {
            return Err(AppError::InvalidArgument(
                "Token cannot be null or empty".to_string(),
            ));
        }

        let data = decode::<Claims>(token, &self.decoding_key, &Self::strict_validation())
            .map_err(|e| AppError::MalformedToken(format!("Token could not be decoded: {}", e)))?;

        let username = data.claims.sub;
        if username.trim().is_empty() {
            return Err(AppError::MalformedToken(
                "Token subject (username) is null or empty".to_string(),
            ));
        }

        Ok(username)
    }
}
