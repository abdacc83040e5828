// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity resolution middleware.
//!
//! Sessions are issued by the external auth provider as HS256 JWTs. A
//! request without a token is anonymous; a request with a bad token is
//! rejected.
//!
//! Every client also has a device id that scopes its local cache. Clients
//! that don't send one are issued a fresh id in the device cookie.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "nextgen_token";
/// Device cookie name; scopes the local cache.
pub const DEVICE_COOKIE: &str = "nextgen_device";
/// Device header name; takes precedence over the cookie.
pub const DEVICE_HEADER: &str = "x-device-id";

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (opaque user id)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Who is making the request.
#[derive(Debug, Clone)]
pub struct Identity {
    /// None for anonymous sessions
    pub user_id: Option<String>,
    pub device_id: String,
}

impl Identity {
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

/// Middleware that attaches an `Identity` to every request.
pub async fn resolve_identity(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = match jar.get(SESSION_COOKIE) {
        Some(cookie) => Some(cookie.value().to_string()),
        None => bearer_token(request.headers())?,
    };

    let user_id = match token {
        Some(token) => Some(verify_jwt(&token, &state.config.jwt_signing_key).ok_or_else(
            || {
                tracing::debug!("Rejected session token");
                AppError::InvalidToken
            },
        )?),
        None => None,
    };

    let presented = request
        .headers()
        .get(DEVICE_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| jar.get(DEVICE_COOKIE).map(|c| c.value().to_string()))
        .filter(|d| d.chars().any(|c| c.is_ascii_alphanumeric()));

    let (device_id, issued) = match presented {
        Some(device_id) => (device_id, false),
        None => (uuid::Uuid::new_v4().simple().to_string(), true),
    };
    if issued {
        tracing::debug!(device_id = %device_id, "Issued new device id");
    }

    request.extensions_mut().insert(Identity {
        user_id,
        device_id: device_id.clone(),
    });

    let response = next.run(request).await;
    if !issued {
        return Ok(response);
    }
    Ok((jar.add(device_cookie(device_id)), response).into_response())
}

/// Long-lived cookie that pins a client to its device scope.
fn device_cookie(device_id: String) -> Cookie<'static> {
    Cookie::build((DEVICE_COOKIE, device_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .permanent()
        .build()
}

/// `Some(token)` for a bearer header, `None` when absent, error when malformed.
fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, AppError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| AppError::InvalidToken)?;
    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
        _ => Err(AppError::InvalidToken),
    }
}

/// Verify a session token and return its subject.
pub fn verify_jwt(token: &str, signing_key: &[u8]) -> Option<String> {
    let key = DecodingKey::from_secret(signing_key);
    let mut validation = Validation::new(Algorithm::HS256);
    // Provider tokens carry an audience we don't pin.
    validation.validate_aud = false;

    decode::<Claims>(token, &key, &validation)
        .ok()
        .map(|data| data.claims.sub)
        .filter(|sub| !sub.is_empty())
}

/// Create a JWT for a user session (tests and local tooling).
pub fn create_jwt(user_id: &str, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + 60 * 60, // 1 hour
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}
