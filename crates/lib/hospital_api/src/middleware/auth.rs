//! Access guard and role gate.
//!
//! `require_auth` verifies the bearer token; `require_role` must be layered
//! inside it and checks the caller's stored role.

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use hospital_core::auth::AuthError;
use hospital_core::models::auth::Role;

use crate::AppState;
use crate::error::AppError;

/// Identity of the verified caller, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
}

/// Role that passed the gate, stored in request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizedRole(pub Role);

/// Axum middleware: extracts `Authorization: Bearer <token>`, verifies the JWT,
/// and injects `AuthenticatedUser` into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)?;

    let identity = state.auth.verify_token(token)?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: identity.user_id,
        email: identity.email,
    });

    Ok(next.run(request).await)
}

/// State for [`require_role`]: the app state plus the roles let through.
#[derive(Clone)]
pub struct RoleGate {
    state: AppState,
    allowed: Arc<[Role]>,
}

impl RoleGate {
    pub fn new(state: AppState, allowed: impl Into<Arc<[Role]>>) -> Self {
        Self {
            state,
            allowed: allowed.into(),
        }
    }
}

/// Axum middleware: rejects callers whose stored role is not allowed.
/// Without a preceding `require_auth` every request is rejected.
pub async fn require_role(
    State(gate): State<RoleGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = request
        .extensions()
        .get::<AuthenticatedUser>()
        .map(|u| u.user_id.clone())
        .ok_or(AuthError::MissingToken)?;

    let role = gate.state.auth.authorize(&user_id, &gate.allowed).await?;
    request.extensions_mut().insert(AuthorizedRole(role));

    Ok(next.run(request).await)
}
