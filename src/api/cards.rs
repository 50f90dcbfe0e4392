// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Business card endpoints.
//!
//! Listing and fetching are public. Creating requires a business account,
//! editing requires ownership, deleting requires ownership or admin, and
//! bizNumber reassignment is admin only.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::{
    auth::{AdminOnly, Auth},
    biz_number::{BizNumber, BIZ_NUMBER_MAX, BIZ_NUMBER_MIN},
    error::ApiError,
    models::{Card, CardRequest, ReassignBizNumberRequest},
    state::AppState,
    storage::{OwnedResource, OwnershipCheck, StoreError},
    validation::Validate,
};

const CARD_NOT_FOUND: &str = "Card not found";

fn card_not_found(e: StoreError) -> ApiError {
    match e {
        StoreError::NotFound(_) => ApiError::not_found(CARD_NOT_FOUND),
        other => other.into(),
    }
}

#[utoipa::path(
    get,
    path = "/cards",
    tag = "Cards",
    responses((status = 200, body = [Card]))
)]
pub async fn list_cards(State(state): State<AppState>) -> Result<Json<Vec<Card>>, ApiError> {
    Ok(Json(state.db.list_cards()?))
}

#[utoipa::path(
    get,
    path = "/cards/my-cards",
    tag = "Cards",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Cards owned by the caller", body = [Card]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_cards(
    Auth(caller): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Card>>, ApiError> {
    Ok(Json(state.db.list_cards_by_owner(&caller.account_id)?))
}

#[utoipa::path(
    get,
    path = "/cards/{card_id}",
    params(("card_id" = String, Path, description = "Card identifier")),
    tag = "Cards",
    responses(
        (status = 200, body = Card),
        (status = 404, description = "Card not found")
    )
)]
pub async fn get_card(
    Path(card_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Card>, ApiError> {
    let card = state
        .db
        .get_card(&card_id)?
        .ok_or_else(|| ApiError::not_found(CARD_NOT_FOUND))?;
    Ok(Json(card))
}

/// Create a card with a freshly allocated bizNumber.
#[utoipa::path(
    post,
    path = "/cards",
    request_body = CardRequest,
    tag = "Cards",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, body = Card),
        (status = 400, description = "Invalid body or caller is not a business account"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_card(
    Auth(caller): Auth,
    State(state): State<AppState>,
    body: Result<Json<CardRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Card>), ApiError> {
    if !caller.is_business {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "business_only",
            "Access denied. Business users only.",
        ));
    }
    let Json(request) = body?;
    request.validate()?;

    let draft = Card {
        id: uuid::Uuid::new_v4().to_string(),
        title: request.title,
        subtitle: request.subtitle,
        description: request.description,
        phone: request.phone,
        email: request.email,
        web: request.web,
        image: request.image,
        address: request.address,
        // Replaced by the allocator before the card is stored.
        biz_number: BizNumber::MIN,
        likes: Vec::new(),
        user_id: caller.account_id.clone(),
        created_at: Utc::now(),
    };

    let card = state
        .allocator
        .create_card(&state.db, &mut rand::thread_rng(), draft)?;

    tracing::info!(card_id = %card.id, biz_number = %card.biz_number, owner = %card.user_id, "card created");
    Ok((StatusCode::CREATED, Json(card)))
}

/// Replace the content of a card the caller owns.
///
/// A card owned by someone else is reported exactly like a missing one.
#[utoipa::path(
    put,
    path = "/cards/{card_id}",
    params(("card_id" = String, Path, description = "Card identifier")),
    request_body = CardRequest,
    tag = "Cards",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = Card),
        (status = 400, description = "Invalid body"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Card not found or caller is not the owner")
    )
)]
pub async fn update_card(
    Auth(caller): Auth,
    Path(card_id): Path<String>,
    State(state): State<AppState>,
    body: Result<Json<CardRequest>, JsonRejection>,
) -> Result<Json<Card>, ApiError> {
    let Json(request) = body?;
    request.validate()?;

    let not_owned = || ApiError::not_found("Card not found or you are not the owner.");

    state
        .db
        .get_card(&card_id)?
        .owned_by(&caller)
        .ok_or_else(not_owned)?;

    let (card, ()) = state
        .db
        .update_card(&card_id, |card| card.apply(request))
        .map_err(|e| match e {
            StoreError::NotFound(_) => not_owned(),
            other => other.into(),
        })?;

    tracing::info!(card_id = %card.id, "card updated");
    Ok(Json(card))
}

/// Like the card, or remove the caller's like if already present.
#[utoipa::path(
    patch,
    path = "/cards/{card_id}",
    params(("card_id" = String, Path, description = "Card identifier")),
    tag = "Cards",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = Card),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Card not found")
    )
)]
pub async fn toggle_like(
    Auth(caller): Auth,
    Path(card_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Card>, ApiError> {
    let (card, liked) = state
        .db
        .update_card(&card_id, |card| card.toggle_like(&caller.account_id))
        .map_err(card_not_found)?;

    tracing::debug!(card_id = %card.id, account_id = %caller.account_id, liked, "card like toggled");
    Ok(Json(card))
}

/// Move a card to a specific bizNumber.
#[utoipa::path(
    patch,
    path = "/cards/{card_id}/bizNumber",
    params(("card_id" = String, Path, description = "Card identifier")),
    request_body = ReassignBizNumberRequest,
    tag = "Cards",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = Card),
        (status = 400, description = "Out of range or already taken"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)"),
        (status = 404, description = "Card not found")
    )
)]
pub async fn reassign_biz_number(
    AdminOnly(admin): AdminOnly,
    Path(card_id): Path<String>,
    State(state): State<AppState>,
    body: Result<Json<ReassignBizNumberRequest>, JsonRejection>,
) -> Result<Json<Card>, ApiError> {
    let Json(request) = body?;

    let number = request
        .biz_number
        .and_then(BizNumber::new)
        .ok_or_else(|| {
            ApiError::new(
                StatusCode::BAD_REQUEST,
                "invalid_biz_number",
                format!("bizNumber must be a number between {BIZ_NUMBER_MIN} and {BIZ_NUMBER_MAX}"),
            )
        })?;

    let card = state
        .db
        .reassign_biz_number(&card_id, number)
        .map_err(|e| match e {
            StoreError::BizNumberTaken(_) => ApiError::new(
                StatusCode::BAD_REQUEST,
                "biz_number_taken",
                "This BizNumber is already taken.",
            ),
            other => card_not_found(other),
        })?;

    tracing::info!(card_id = %card.id, biz_number = %number, admin_id = %admin.account_id, "bizNumber reassigned");
    Ok(Json(card))
}

#[utoipa::path(
    delete,
    path = "/cards/{card_id}",
    params(("card_id" = String, Path, description = "Card identifier")),
    tag = "Cards",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Deleted card", body = Card),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Neither the owner nor an admin"),
        (status = 404, description = "Card not found")
    )
)]
pub async fn delete_card(
    Auth(caller): Auth,
    Path(card_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Card>, ApiError> {
    let card = state
        .db
        .get_card(&card_id)?
        .ok_or_else(|| ApiError::not_found(CARD_NOT_FOUND))?;
    card.verify_owner_or_admin(&caller)?;

    let card = state.db.delete_card(&card_id).map_err(card_not_found)?;

    tracing::info!(card_id = %card.id, deleted_by = %caller.account_id, "card deleted");
    Ok(Json(card))
}
