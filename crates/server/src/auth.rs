//! Bearer-token authentication.
//!
//! Tokens are HS256 JWTs carrying the user id in `sub` and the caller's roles.
//! The middleware turns a valid token into a `Principal` request extension.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header::AUTHORIZATION, HeaderMap};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use service::Principal;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::ApiError;

#[derive(Clone)]
pub struct AuthSettings {
    jwt_secret: Arc<String>,
    elevated_roles: Arc<Vec<String>>,
}

impl AuthSettings {
    pub fn new(jwt_secret: &str, elevated_roles: Vec<String>) -> Self {
        Self { jwt_secret: Arc::new(jwt_secret.to_string()), elevated_roles: Arc::new(elevated_roles) }
    }

    pub fn principal_from_token(&self, token: &str) -> Result<Principal, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(token, &DecodingKey::from_secret(self.jwt_secret.as_bytes()), &Validation::default())?;
        Ok(Principal::new(data.claims.sub, data.claims.roles, &self.elevated_roles))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default)]
    pub roles: Vec<String>,
    pub exp: usize,
}

/// Sign a token for `user_id`, valid for `ttl`.
pub fn issue_token(secret: &str, user_id: Uuid, roles: Vec<String>, ttl: Duration) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = (Utc::now() + ttl).timestamp().max(0) as usize;
    let claims = Claims { sub: user_id, roles, exp };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").or_else(|| value.strip_prefix("bearer "))?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Reject requests without a valid bearer token; attach the `Principal` otherwise.
pub async fn require_bearer(State(auth): State<AuthSettings>, mut req: Request, next: Next) -> Response {
    let Some(token) = bearer_token(req.headers()) else {
        debug!(path = %req.uri().path(), "missing_bearer_token");
        return ApiError::unauthenticated("Unauthenticated.").into_response();
    };
    match auth.principal_from_token(&token) {
        Ok(principal) => {
            debug!(principal = %principal.id, elevated = principal.is_elevated(), "principal_authenticated");
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(e) => {
            warn!(path = %req.uri().path(), error = %e, "invalid_bearer_token");
            ApiError::unauthenticated("Invalid or expired token.").into_response()
        }
    }
}
