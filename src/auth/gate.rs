use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, Method},
    middleware::Next,
    response::Response,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

use crate::{error::ApiError, state::AppState, users::repo::User};

/// Resolved identity of the caller, attached to the request by the gate.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub i64);

lazy_static! {
    /// Endpoints reachable without a credential.
    static ref OPEN_ENDPOINTS: Vec<(Method, Regex)> = vec![
        (Method::GET, Regex::new(r"^/api/users/?$").unwrap()),
        (Method::POST, Regex::new(r"^/api/users/login/?$").unwrap()),
        (Method::POST, Regex::new(r"^/api/users/register/?$").unwrap()),
    ];
}

fn is_open_endpoint(method: &Method, path: &str) -> bool {
    OPEN_ENDPOINTS
        .iter()
        .any(|(m, re)| m == method && re.is_match(path))
}

/// Per-request token validation. Runs before every route.
///
/// A bearer token that fails verification is terminal. A missing token, or a
/// valid token whose subject no longer exists, falls through to the open
/// endpoint list instead of failing hard.
pub async fn token_gate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let mut subject = None;
    if let Some(value) = header {
        if let Some(token) = value.strip_prefix("Bearer ") {
            subject = Some(state.jwt.verify(token)?);
        }
    }

    let user = match subject {
        Some(username) => User::find_by_username(&state.db, &username)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "user lookup failed during token validation");
                None
            }),
        None => None,
    };

    match user {
        Some(user) => {
            req.extensions_mut().insert(AuthUser(user.id));
            Ok(next.run(req).await)
        }
        None if is_open_endpoint(req.method(), req.uri().path()) => Ok(next.run(req).await),
        None => {
            warn!(method = %req.method(), path = %req.uri().path(), "request blocked");
            Err(ApiError::Blocked)
        }
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or(ApiError::Blocked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_endpoints_match() {
        assert!(is_open_endpoint(&Method::GET, "/api/users"));
        assert!(is_open_endpoint(&Method::GET, "/api/users/"));
        assert!(is_open_endpoint(&Method::POST, "/api/users/login"));
        assert!(is_open_endpoint(&Method::POST, "/api/users/register"));
    }

    #[test]
    fn secured_endpoints_do_not_match() {
        assert!(!is_open_endpoint(&Method::POST, "/api/users"));
        assert!(!is_open_endpoint(&Method::GET, "/api/users/login"));
        assert!(!is_open_endpoint(
            &Method::POST,
            "/api/classifications/identify"
        ));
        assert!(!is_open_endpoint(
            &Method::GET,
            "/api/classifications/mushroom-instances"
        ));
    }
}
