// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session middleware for Axum.
//!
//! Gate for every protected route: the request only reaches a handler once a
//! valid session token has been found and its account placed in request
//! extensions. A missing or invalid token is answered with 401 here, so
//! handlers never see anonymous callers.
//!
//! ```rust,ignore
//! let protected = Router::new()
//!     .route("/cards/my-cards", get(cards::my_cards))
//!     .route_layer(axum::middleware::from_fn_with_state(
//!         state.clone(),
//!         require_session,
//!     ));
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::extractor::session_token;
use crate::state::AppState;

pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let verified = session_token(request.headers()).and_then(|token| state.sessions.verify(token));

    match verified {
        Ok(account) => {
            tracing::debug!(account_id = %account.account_id, "session verified");
            request.extensions_mut().insert(account);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(error_code = e.error_code(), "session rejected");
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Auth, AuthenticatedAccount};
    use crate::state::test_state;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    async fn whoami(Auth(account): Auth) -> String {
        account.account_id
    }

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .route_layer(from_fn_with_state(state.clone(), require_session))
            .with_state(state)
    }

    #[tokio::test]
    async fn rejects_missing_token_before_handler() {
        let (state, _dir) = test_state();
        let response = app(state)
            .oneshot(Request::get("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn rejects_forged_token() {
        let (state, _dir) = test_state();
        let response = app(state)
            .oneshot(
                Request::get("/whoami")
                    .header("Authorization", "Bearer a.b.c")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn passes_claims_to_handler() {
        let (state, _dir) = test_state();
        let token = state
            .sessions
            .issue(&AuthenticatedAccount {
                account_id: "acc-9".to_string(),
                is_business: false,
                is_admin: false,
            })
            .unwrap();

        let response = app(state)
            .oneshot(
                Request::get("/whoami")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"acc-9");
    }
}
