//! Authentication middleware: bearer token → claims → request extensions.

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use stockroom_auth::{Claims, TokenError, TokenVerification};

use crate::context::ClaimsContext;
use crate::errors::ApiError;

#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub verification: TokenVerification,
    /// Reject tokens whose `exp` has passed. Off by default.
    pub enforce_expiry: bool,
}

impl AuthState {
    /// Decode the bearer token carried by `headers`.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Claims, TokenError> {
        let token = extract_bearer(headers)?;
        let claims = self.verification.decode(token)?;

        if self.enforce_expiry && claims.is_expired_at(Utc::now().timestamp()) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let claims = match state.authenticate(req.headers()) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::debug!(error = %err, path = %req.uri().path(), "authentication failed");
            return ApiError::from(err).into_response();
        }
    };

    req.extensions_mut().insert(ClaimsContext::new(claims));

    next.run(req).await
}

pub(crate) fn extract_bearer(headers: &HeaderMap) -> Result<&str, TokenError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(TokenError::NoToken)?;

    let header = header
        .to_str()
        .map_err(|_| TokenError::Malformed("authorization header is not ASCII".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .ok_or(TokenError::NoToken)?
        .trim();

    if token.is_empty() {
        return Err(TokenError::NoToken);
    }

    Ok(token)
}
