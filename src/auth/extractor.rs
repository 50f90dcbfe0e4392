// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated accounts.
//!
//! Use the `Auth` extractor in handlers to require a session:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(account): Auth) -> impl IntoResponse {
//!     // account is AuthenticatedAccount
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::{AuthError, AuthenticatedAccount};
use crate::state::AppState;

/// Legacy header carrying the raw token without a scheme.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Pull the session token out of the request headers.
///
/// `Authorization: Bearer <token>` wins; `x-auth-token: <token>` is accepted
/// when no `Authorization` header is sent.
pub fn session_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    if let Some(value) = headers.get(AUTHORIZATION) {
        let value = value.to_str().map_err(|_| AuthError::InvalidAuthHeader)?;
        let token = value
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?
            .trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        return Ok(token);
    }

    match headers.get(AUTH_TOKEN_HEADER) {
        Some(value) => {
            let token = value
                .to_str()
                .map_err(|_| AuthError::InvalidAuthHeader)?
                .trim();
            if token.is_empty() {
                Err(AuthError::MissingToken)
            } else {
                Ok(token)
            }
        }
        None => Err(AuthError::MissingToken),
    }
}

/// Extractor for authenticated accounts.
///
/// Reuses the account placed in request extensions by the session middleware;
/// otherwise verifies the token itself.
pub struct Auth(pub AuthenticatedAccount);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(account) = parts.extensions.get::<AuthenticatedAccount>().cloned() {
            return Ok(Auth(account));
        }

        let token = session_token(&parts.headers)?;
        let account = state.sessions.verify(token)?;
        Ok(Auth(account))
    }
}

/// Extractor that requires the admin flag.
pub struct AdminOnly(pub AuthenticatedAccount);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Auth(account) = Auth::from_request_parts(parts, state).await?;

        if !account.is_admin {
            return Err(AuthError::AccessDenied);
        }

        Ok(AdminOnly(account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_state;
    use axum::http::Request;

    fn parts_with(header: Option<(&str, String)>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some((name, value)) = header {
            builder = builder.header(name, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn member() -> AuthenticatedAccount {
        AuthenticatedAccount {
            account_id: "acc-1".to_string(),
            is_business: false,
            is_admin: false,
        }
    }

    #[tokio::test]
    async fn auth_requires_a_token() {
        let (state, _dir) = test_state();
        let mut parts = parts_with(None);
        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingToken)));
    }

    #[tokio::test]
    async fn auth_accepts_bearer_token() {
        let (state, _dir) = test_state();
        let token = state.sessions.issue(&member()).unwrap();
        let mut parts = parts_with(Some(("Authorization", format!("Bearer {token}"))));
        let Auth(account) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(account, member());
    }

    #[tokio::test]
    async fn auth_accepts_legacy_header() {
        let (state, _dir) = test_state();
        let token = state.sessions.issue(&member()).unwrap();
        let mut parts = parts_with(Some((AUTH_TOKEN_HEADER, token)));
        assert!(Auth::from_request_parts(&mut parts, &state).await.is_ok());
    }

    #[tokio::test]
    async fn auth_rejects_other_schemes() {
        let (state, _dir) = test_state();
        let mut parts = parts_with(Some(("Authorization", "Basic abc".to_string())));
        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }

    #[tokio::test]
    async fn auth_prefers_extensions() {
        let (state, _dir) = test_state();
        let mut parts = parts_with(None);
        parts.extensions.insert(member());
        let Auth(account) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(account.account_id, "acc-1");
    }

    #[tokio::test]
    async fn admin_only_rejects_non_admin() {
        let (state, _dir) = test_state();
        let mut parts = parts_with(None);
        parts.extensions.insert(member());
        let result = AdminOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::AccessDenied)));
    }
}
