// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::{header, HeaderName, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::require_session,
    models::{
        AccountSummary, AccountView, Address, Card, CardRequest, Image, LoginRequest, PersonName,
        ReassignBizNumberRequest, RegisterRequest, UpdateAccountRequest,
    },
    state::AppState,
    telemetry::{log_error_responses, make_span},
};

pub mod accounts;
pub mod cards;
pub mod health;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(state.cors_origins.iter().cloned()))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-auth-token"),
        ]);

    let public_routes = Router::new()
        .route("/health", get(health::health))
        .route("/accounts", post(accounts::register))
        .route("/accounts/login", post(accounts::login))
        .route("/cards", get(cards::list_cards))
        .route("/cards/{card_id}", get(cards::get_card));

    let protected_routes = Router::new()
        .route("/accounts", get(accounts::list_accounts))
        .route(
            "/accounts/{account_id}",
            get(accounts::get_account)
                .put(accounts::update_account)
                .patch(accounts::toggle_business)
                .delete(accounts::delete_account),
        )
        .route("/cards", post(cards::create_card))
        .route("/cards/my-cards", get(cards::my_cards))
        .route(
            "/cards/{card_id}",
            put(cards::update_card)
                .patch(cards::toggle_like)
                .delete(cards::delete_card),
        )
        .route(
            "/cards/{card_id}/bizNumber",
            patch(cards::reassign_biz_number),
        )
        .route_layer(from_fn_with_state(state.clone(), require_session));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(from_fn(log_error_responses))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors)
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        accounts::register,
        accounts::login,
        accounts::list_accounts,
        accounts::get_account,
        accounts::update_account,
        accounts::toggle_business,
        accounts::delete_account,
        cards::list_cards,
        cards::my_cards,
        cards::get_card,
        cards::create_card,
        cards::update_card,
        cards::toggle_like,
        cards::reassign_biz_number,
        cards::delete_card
    ),
    components(
        schemas(
            PersonName,
            Image,
            Address,
            AccountView,
            AccountSummary,
            RegisterRequest,
            LoginRequest,
            UpdateAccountRequest,
            Card,
            CardRequest,
            ReassignBizNumberRequest,
            health::HealthResponse,
            health::HealthChecks
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Accounts", description = "Registration, login and account management"),
        (name = "Cards", description = "Business cards")
    )
)]
struct ApiDoc;
