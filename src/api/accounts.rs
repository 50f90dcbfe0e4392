// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account registration, login and account management.
//!
//! Registration and login are public. Everything else sits behind the
//! session middleware; handlers then apply the self / admin rules.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::{service, AdminOnly, Auth},
    error::ApiError,
    models::{AccountSummary, AccountView, LoginRequest, RegisterRequest, UpdateAccountRequest},
    state::AppState,
    storage::StoreError,
    validation::Validate,
};

const ACCOUNT_NOT_FOUND: &str = "User not found.";

fn account_not_found(e: StoreError) -> ApiError {
    match e {
        StoreError::NotFound(_) => ApiError::not_found(ACCOUNT_NOT_FOUND),
        other => other.into(),
    }
}

#[utoipa::path(
    post,
    path = "/accounts",
    request_body = RegisterRequest,
    tag = "Accounts",
    responses(
        (status = 201, description = "Account created", body = AccountSummary),
        (status = 400, description = "Invalid body or email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AccountSummary>), ApiError> {
    let Json(request) = body?;
    request.validate()?;

    let account = service::register(&state.db, request).await?;
    Ok((StatusCode::CREATED, Json(AccountSummary::from(&account))))
}

/// Exchange credentials for a session token.
///
/// The token is returned as the raw response body.
#[utoipa::path(
    post,
    path = "/accounts/login",
    request_body = LoginRequest,
    tag = "Accounts",
    responses(
        (status = 200, description = "Session token", body = String, content_type = "text/plain"),
        (status = 400, description = "Invalid body or invalid email or password"),
        (status = 403, description = "Account locked after repeated failures")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<String, ApiError> {
    let Json(request) = body?;
    request.validate()?;

    let token = service::login(&state.db, &state.sessions, &request.email, &request.password).await?;
    Ok(token)
}

#[utoipa::path(
    get,
    path = "/accounts",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All accounts", body = [AccountView]),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)")
    )
)]
pub async fn list_accounts(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<Vec<AccountView>>, ApiError> {
    let accounts = state
        .db
        .list_accounts()?
        .into_iter()
        .map(AccountView::from)
        .collect();
    Ok(Json(accounts))
}

#[utoipa::path(
    get,
    path = "/accounts/{account_id}",
    params(("account_id" = String, Path, description = "Account identifier")),
    tag = "Accounts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = AccountView),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Neither the account itself nor an admin"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn get_account(
    Auth(caller): Auth,
    Path(account_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<AccountView>, ApiError> {
    caller.require_self_or_admin(&account_id)?;

    let account = state
        .db
        .get_account(&account_id)?
        .ok_or_else(|| ApiError::not_found(ACCOUNT_NOT_FOUND))?;
    Ok(Json(account.into()))
}

/// Replace the caller's own profile fields.
#[utoipa::path(
    put,
    path = "/accounts/{account_id}",
    params(("account_id" = String, Path, description = "Account identifier")),
    request_body = UpdateAccountRequest,
    tag = "Accounts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = AccountView),
        (status = 400, description = "Invalid body"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the account itself"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn update_account(
    Auth(caller): Auth,
    Path(account_id): Path<String>,
    State(state): State<AppState>,
    body: Result<Json<UpdateAccountRequest>, JsonRejection>,
) -> Result<Json<AccountView>, ApiError> {
    caller.require_self(&account_id)?;
    let Json(request) = body?;
    request.validate()?;

    let (account, ()) = state
        .db
        .update_account(&account_id, |account| {
            account.name = request.name;
            account.phone = request.phone;
            account.image = request.image;
            account.address = request.address;
        })
        .map_err(account_not_found)?;

    tracing::info!(account_id = %account.id, "account profile updated");
    Ok(Json(account.into()))
}

/// Flip the business flag.
#[utoipa::path(
    patch,
    path = "/accounts/{account_id}",
    params(("account_id" = String, Path, description = "Account identifier")),
    tag = "Accounts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = AccountView),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Neither the account itself nor an admin"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn toggle_business(
    Auth(caller): Auth,
    Path(account_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<AccountView>, ApiError> {
    caller.require_self_or_admin(&account_id)?;

    let (account, is_business) = state
        .db
        .update_account(&account_id, |account| {
            account.is_business = !account.is_business;
            account.is_business
        })
        .map_err(account_not_found)?;

    tracing::info!(account_id = %account.id, is_business, changed_by = %caller.account_id, "business status changed");
    Ok(Json(account.into()))
}

#[utoipa::path(
    delete,
    path = "/accounts/{account_id}",
    params(("account_id" = String, Path, description = "Account identifier")),
    tag = "Accounts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Deleted account", body = AccountView),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Neither the account itself nor an admin"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn delete_account(
    Auth(caller): Auth,
    Path(account_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<AccountView>, ApiError> {
    caller.require_self_or_admin(&account_id)?;

    let account = state
        .db
        .delete_account(&account_id)
        .map_err(account_not_found)?;

    tracing::info!(account_id = %account.id, deleted_by = %caller.account_id, "account deleted");
    Ok(Json(account.into()))
}

#[cfg(test)]
mod tests {
    use crate::api::router;
    use crate::api::test_support::{register_body, send, signup, signup_admin, PASSWORD};
    use crate::state::test_state;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn register_returns_summary_without_secret() {
        let (state, _dir) = test_state();
        let app = router(state);

        let (status, body) = send(
            &app,
            Method::POST,
            "/accounts",
            None,
            Some(register_body("New@Test.com", false)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["email"], "new@test.com");
        assert!(body.get("password").is_none());
        assert!(body["_id"].is_string());
    }

    #[tokio::test]
    async fn register_rejects_duplicates_and_bad_bodies() {
        let (state, _dir) = test_state();
        let app = router(state);
        signup(&app, "dup@test.com", false).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/accounts",
            None,
            Some(register_body("DUP@test.com", false)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "email_taken");

        let mut short_password = register_body("short@test.com", false);
        short_password["password"] = json!("abc");
        let (status, body) = send(&app, Method::POST, "/accounts", None, Some(short_password)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "validation_error");

        let mut self_promoted = register_body("sneaky@test.com", false);
        self_promoted["isAdmin"] = json!(true);
        let (status, _) = send(&app, Method::POST, "/accounts", None, Some(self_promoted)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn register_rejects_email_that_normalizes_to_two_ats() {
        let (state, _dir) = test_state();
        let app = router(state.clone());

        let (status, body) = send(
            &app,
            Method::POST,
            "/accounts",
            None,
            Some(register_body("a\u{FF20}b@test.com", false)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "validation_error");
        assert!(state.db.list_accounts().unwrap().is_empty());
    }

    #[tokio::test]
    async fn third_failure_is_invalid_and_fourth_is_locked() {
        let (state, _dir) = test_state();
        let app = router(state);
        signup(&app, "locked@test.com", false).await;

        let wrong = json!({ "email": "locked@test.com", "password": "Wrong123!" });
        for attempt in 1..=3 {
            let (status, body) =
                send(&app, Method::POST, "/accounts/login", None, Some(wrong.clone())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "attempt {attempt}");
            assert_eq!(body["error"], "Invalid email or password.");
        }

        let right = json!({ "email": "locked@test.com", "password": PASSWORD });
        let (status, body) = send(&app, Method::POST, "/accounts/login", None, Some(right)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error_code"], "account_locked");
    }

    #[tokio::test]
    async fn unknown_email_looks_like_wrong_password() {
        let (state, _dir) = test_state();
        let app = router(state);
        let (status, body) = send(
            &app,
            Method::POST,
            "/accounts/login",
            None,
            Some(json!({ "email": "ghost@test.com", "password": PASSWORD })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid email or password.");
    }

    #[tokio::test]
    async fn non_owner_fetch_of_another_account_is_forbidden() {
        let (state, _dir) = test_state();
        let app = router(state.clone());
        let (alice_id, alice) = signup(&app, "alice@test.com", false).await;
        let (bob_id, _) = signup(&app, "bob@test.com", false).await;

        let (status, body) =
            send(&app, Method::GET, &format!("/accounts/{bob_id}"), Some(&alice), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Access denied.");

        // Authorization is decided before existence.
        let (status, _) = send(&app, Method::GET, "/accounts/missing", Some(&alice), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) =
            send(&app, Method::GET, &format!("/accounts/{alice_id}"), Some(&alice), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "alice@test.com");
        assert!(body.get("password").is_none());

        let (_, admin) = signup_admin(&app, &state, "admin@test.com").await;
        let (status, _) =
            send(&app, Method::GET, &format!("/accounts/{bob_id}"), Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, Method::GET, "/accounts/missing", Some(&admin), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn listing_accounts_is_admin_only() {
        let (state, _dir) = test_state();
        let app = router(state.clone());
        let (_, member) = signup(&app, "member@test.com", false).await;
        let (_, admin) = signup_admin(&app, &state, "admin@test.com").await;

        let (status, _) = send(&app, Method::GET, "/accounts", Some(&member), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(&app, Method::GET, "/accounts", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_is_self_only_and_keeps_credentials() {
        let (state, _dir) = test_state();
        let app = router(state.clone());
        let (id, token) = signup(&app, "self@test.com", false).await;
        let (_, admin) = signup_admin(&app, &state, "admin@test.com").await;

        let update = json!({
            "name": { "first": "Renamed", "middle": "", "last": "Person" },
            "phone": "0509999999",
            "image": { "url": "https://example.com/new.png", "alt": "new" },
            "address": {
                "state": "",
                "country": "Israel",
                "city": "Eilat",
                "street": "Harbour",
                "houseNumber": 5,
                "zip": 88000
            }
        });

        let uri = format!("/accounts/{id}");
        let (status, _) = send(&app, Method::PUT, &uri, Some(&admin), Some(update.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(&app, Method::PUT, &uri, Some(&token), Some(update)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"]["first"], "Renamed");
        assert_eq!(body["email"], "self@test.com");

        // Password unchanged.
        crate::api::test_support::login(&app, "self@test.com").await;
    }

    #[tokio::test]
    async fn toggle_business_and_delete() {
        let (state, _dir) = test_state();
        let app = router(state.clone());
        let (id, token) = signup(&app, "flip@test.com", false).await;
        let uri = format!("/accounts/{id}");

        let (status, body) = send(&app, Method::PATCH, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isBusiness"], true);

        let (status, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(state.db.get_account(&id).unwrap().is_none());

        // The token still verifies, but the account is gone.
        let (status, _) = send(&app, Method::PATCH, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
