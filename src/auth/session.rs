//! Session token codecs.
//!
//! The cookie value is the only thing tying a browser to a user. The legacy
//! codec writes `user_<username>` in the clear, so anyone who can set a cookie
//! can claim any account; the signed codec wraps the username in an HS256
//! token instead. Handlers only ever see [`SessionCodec`], so the scheme is a
//! deployment switch (`SESSION_SCHEME`).

use std::{sync::Arc, time::Duration};

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::config::{SessionConfig, SessionScheme};

pub const SESSION_COOKIE: &str = "session_token";
const ISSUER: &str = "weight-tracker";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("signing session token: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),
    #[error("session secret is missing")]
    MissingSecret,
}

pub trait SessionCodec: Send + Sync {
    /// Produces the cookie value for `username`.
    fn encode(&self, username: &str) -> Result<String, SessionError>;

    /// Username carried by `token`, or `None` if the token is not one of ours.
    fn decode(&self, token: &str) -> Option<String>;
}

pub fn codec_from_config(cfg: &SessionConfig) -> Result<Arc<dyn SessionCodec>, SessionError> {
    match cfg.scheme {
        SessionScheme::Legacy => {
            warn!("SESSION_SCHEME=legacy: session cookies are unsigned and can be forged");
            Ok(Arc::new(LegacySessionCodec))
        }
        SessionScheme::Signed => {
            let secret = cfg.secret.as_deref().ok_or(SessionError::MissingSecret)?;
            let ttl = Duration::from_secs(cfg.ttl_hours.unsigned_abs() * 3600);
            Ok(Arc::new(SignedSessionCodec::new(secret, ttl)))
        }
    }
}

lazy_static! {
    static ref LEGACY_TOKEN_RE: Regex = Regex::new(r"^user_(.+)$").expect("valid regex");
}

/// `user_<username>`, exactly as the cookie has always looked.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacySessionCodec;

impl SessionCodec for LegacySessionCodec {
    fn encode(&self, username: &str) -> Result<String, SessionError> {
        Ok(format!("user_{username}"))
    }

    fn decode(&self, token: &str) -> Option<String> {
        LEGACY_TOKEN_RE
            .captures(token)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_owned())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String, // username
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
}

#[derive(Clone)]
pub struct SignedSessionCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SignedSessionCodec {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::default();
        validation.set_issuer(&[ISSUER]);
        validation
    }
}

impl SessionCodec for SignedSessionCodec {
    fn encode(&self, username: &str) -> Result<String, SessionError> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = SessionClaims {
            sub: username.to_owned(),
            iat: now as usize,
            exp: now.saturating_add(ttl) as usize,
            iss: ISSUER.to_owned(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(username, "session token signed");
        Ok(token)
    }

    fn decode(&self, token: &str) -> Option<String> {
        match decode::<SessionClaims>(token, &self.decoding, &Self::validation()) {
            Ok(data) => Some(data.claims.sub),
            Err(e) => {
                debug!(error = %e, "rejected session token");
                None
            }
        }
    }
}
