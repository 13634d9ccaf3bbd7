use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};

use crate::config::ResetConfig;

/// Payload of a password-reset token: the email it was issued for plus the
/// validity window. The salt goes into `aud` so a reset token can never pass
/// for a session token signed with the same secret.
#[derive(Debug, Serialize, Deserialize)]
struct ResetClaims {
    sub: String, // email
    iat: usize,
    exp: usize,
    aud: String, // reset salt
}

/// Single error for every decode failure. Callers must not be able to tell
/// a bad signature from an expired or malformed token.
#[derive(Debug, thiserror::Error)]
#[error("Invalid or expired token")]
pub struct InvalidResetToken;

/// Stateless signed-token codec for the password-reset flow. No server-side
/// token storage; validity is proven by signature and embedded timestamps.
#[derive(Clone)]
pub struct ResetTokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    salt: String,
    max_age: TimeDuration,
}

impl ResetTokenCodec {
    pub fn new(secret: &str, cfg: &ResetConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            salt: cfg.salt.clone(),
            max_age: TimeDuration::seconds(cfg.max_age_seconds),
        }
    }

    fn encode_at(&self, email: &str, now: OffsetDateTime) -> anyhow::Result<String> {
        let claims = ResetClaims {
            sub: email.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: (now + self.max_age).unix_timestamp() as usize,
            aud: self.salt.clone(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Produces a URL-safe token binding `email` to the current time.
    pub fn encode(&self, email: &str) -> anyhow::Result<String> {
        self.encode_at(email, OffsetDateTime::now_utc())
    }

    /// Returns the embedded email if the signature checks out and the token
    /// is within its validity window.
    pub fn decode(&self, token: &str) -> Result<String, InvalidResetToken> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.salt));
        let data =
            decode::<ResetClaims>(token, &self.decoding, &validation).map_err(|_| InvalidResetToken)?;
        Ok(data.claims.sub)
    }
}
