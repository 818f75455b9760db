//! Request identity: bearer-token authentication.
//!
//! [`identify`] runs on every API route and attaches an [`Identity`] to the
//! request. Anonymous requests are allowed through; a malformed or unknown
//! token is rejected outright. Handlers that need an owner extract
//! [`CurrentUser`], which rejects anonymous requests with 401.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts, Request, StatusCode},
    middleware::Next,
    response::Response,
};

use super::AppState;
use crate::models::User;

/// The caller's identity, if any.
#[derive(Debug, Clone, Default)]
pub struct Identity(pub Option<User>);

impl Identity {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }
}

/// Extractor for routes that require an authenticated user.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Identity>() {
            Some(Identity(Some(user))) => Ok(CurrentUser(user.clone())),
            _ => Err((
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
            )),
        }
    }
}

/// Resolve the `Authorization: Bearer` header into an [`Identity`].
pub async fn identify(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, String)> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .map(|h| h.to_str().unwrap_or_default().to_string());

    let user = match auth_header {
        None => None,
        Some(header) => {
            let Some(token) = header.strip_prefix("Bearer ").map(str::trim) else {
                tracing::warn!("Invalid Authorization header format");
                return Err(unauthorized());
            };

            match state.db.find_user_by_token(token) {
                Ok(Some(user)) => Some(user),
                Ok(None) => {
                    tracing::warn!("Invalid API token provided");
                    return Err(unauthorized());
                }
                Err(e) => {
                    tracing::error!("Failed to resolve API token: {}", e);
                    return Err((
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    ));
                }
            }
        }
    };

    request.extensions_mut().insert(Identity(user));
    Ok(next.run(request).await)
}

fn unauthorized() -> (StatusCode, String) {
    (
        StatusCode::UNAUTHORIZED,
        "Invalid or missing API token".to_string(),
    )
}
