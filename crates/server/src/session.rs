use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use server_api::Session;
use shared::domain::UserId;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_seconds: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    username: String,
    iat: i64,
    exp: i64,
}

pub fn issue_token(
    cfg: &SessionConfig,
    user_id: UserId,
    username: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let exp = now + Duration::seconds(cfg.ttl_seconds);
    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(cfg.secret.as_bytes()),
    )
}

pub fn verify_token(
    cfg: &SessionConfig,
    token: &str,
) -> Result<Session, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(cfg.secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    let user_id = data
        .claims
        .sub
        .parse::<i64>()
        .map_err(|_| jsonwebtoken::errors::Error::from(ErrorKind::InvalidSubject))?;

    Ok(Session {
        user_id: UserId(user_id),
        username: data.claims.username,
    })
}

/// Resolves the bearer token on a request. Any failure means "no session";
/// the reason only reaches the debug log.
pub fn session_from_headers(cfg: &SessionConfig, headers: &HeaderMap) -> Option<Session> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }

    match verify_token(cfg, token) {
        Ok(session) => Some(session),
        Err(error) => {
            debug!(%error, "rejected session token");
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
