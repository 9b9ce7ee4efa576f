use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header::Header;
use actix_web::http::StatusCode;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse, ResponseError};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use chrono::Utc;
use hmac::{Hmac, Mac};
use jwt::VerifyWithKey;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::utils::config::Settings;

/// Claims issued by the external identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: i64,
}

/// The caller behind a verified bearer token. Use it as a handler argument
/// to require authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing or malformed bearer token")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    Expired,

    #[error("authentication is not configured")]
    NotConfigured,
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // The reason stays in the logs.
        tracing::debug!(error = %self, "rejecting request");
        let message = match self {
            AuthError::NotConfigured => "Internal server error",
            _ => "You must be signed in to do that",
        };
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "error": message
        }))
    }
}

fn signing_key(secret: &str) -> Result<Hmac<Sha256>, AuthError> {
    Hmac::new_from_slice(secret.as_bytes()).map_err(|e| AuthError::InvalidToken(e.to_string()))
}

pub fn verify_token(token: &str, secret: &str) -> Result<AuthUser, AuthError> {
    let key = signing_key(secret)?;
    let claims: Claims = token
        .verify_with_key(&key)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    if claims.exp <= Utc::now().timestamp() {
        return Err(AuthError::Expired);
    }
    if claims.sub.trim().is_empty() {
        return Err(AuthError::InvalidToken("empty subject".to_string()));
    }

    Ok(AuthUser {
        id: claims.sub,
        email: claims.email,
    })
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, AuthError> {
    let settings = req
        .app_data::<web::Data<Settings>>()
        .ok_or(AuthError::NotConfigured)?;
    let auth = Authorization::<Bearer>::parse(req).map_err(|_| AuthError::MissingToken)?;
    verify_token(auth.into_scheme().token(), &settings.jwt_secret)
}

impl FromRequest for AuthUser {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use jwt::SignWithKey;

    pub fn issue_token(secret: &str, user_id: &str, email: &str, ttl_secs: i64) -> String {
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            exp: Utc::now().timestamp() + ttl_secs,
        };
        let key = signing_key(secret).unwrap();
        claims.sign_with_key(&key).unwrap()
    }
}
