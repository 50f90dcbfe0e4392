// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Data Models
//!
//! Stored records and the request/response shapes of the REST API. JSON
//! field names are camelCase (`isBusiness`, `bizNumber`, `houseNumber`),
//! record identifiers serialize as `_id` and a card's owner as `user_id`.
//!
//! ## Model Categories
//!
//! - **Shared**: name, image and address blocks used by accounts and cards
//! - **Accounts**: the stored [`Account`] and its public views
//! - **Cards**: the stored [`Card`] and its request types

use chrono::{DateTime, Utc};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::auth::lockout::LockoutState;
use crate::biz_number::BizNumber;

// =============================================================================
// Shared Blocks
// =============================================================================

/// A person's name.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PersonName {
    pub first: String,
    #[serde(default)]
    pub middle: String,
    pub last: String,
}

/// Picture reference with alternate text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Image {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub alt: String,
}

/// Postal address. Card forms send `"zip": ""` for "no zip", which reads
/// as `None`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub state: String,
    pub country: String,
    pub city: String,
    pub street: String,
    pub house_number: u32,
    #[serde(default, deserialize_with = "zip_or_empty")]
    pub zip: Option<u32>,
}

fn zip_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Zip {
        Number(u32),
        Text(String),
    }

    match Option::<Zip>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Zip::Number(zip)) => Ok(Some(zip)),
        Some(Zip::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Zip::Text(text)) => Err(D::Error::custom(format!(
            "invalid zip {text:?}, expected a number or an empty string"
        ))),
    }
}

// =============================================================================
// Accounts
// =============================================================================

/// Account record as persisted in the credential store.
///
/// `password` holds the Argon2 PHC digest, never the plaintext. The lockout
/// counters are flattened so they sit next to the other fields in storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: PersonName,
    pub phone: String,
    /// Canonical (trimmed, NFKC, lower-cased) email; unique lookup key.
    pub email: String,
    pub password: String,
    pub image: Image,
    pub address: Address,
    pub is_business: bool,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(flatten)]
    pub lockout: LockoutState,
    pub created_at: DateTime<Utc>,
}

/// Account as returned by the API (secret omitted).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: PersonName,
    pub phone: String,
    pub email: String,
    pub image: Image,
    pub address: Address,
    pub is_business: bool,
    pub is_admin: bool,
    pub login_attempts: u32,
    /// Epoch milliseconds; 0 when the account is not locked.
    pub lock_until: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountView {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            name: account.name,
            phone: account.phone,
            email: account.email,
            image: account.image,
            address: account.address,
            is_business: account.is_business,
            is_admin: account.is_admin,
            login_attempts: account.lockout.login_attempts,
            lock_until: account.lockout.lock_until,
            created_at: account.created_at,
        }
    }
}

/// Minimal public summary returned on registration.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AccountSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: PersonName,
    pub email: String,
}

impl From<&Account> for AccountSummary {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            name: account.name.clone(),
            email: account.email.clone(),
        }
    }
}

/// Request body for `POST /accounts`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    pub name: PersonName,
    pub phone: String,
    pub email: String,
    pub password: String,
    pub image: Image,
    pub address: Address,
    pub is_business: bool,
}

/// Request body for `POST /accounts/login`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `PUT /accounts/{id}`. Email, password and role flags are
/// not editable through this route.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateAccountRequest {
    pub name: PersonName,
    pub phone: String,
    pub image: Image,
    pub address: Address,
}

// =============================================================================
// Cards
// =============================================================================

/// A business card.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub web: String,
    pub image: Image,
    pub address: Address,
    pub biz_number: BizNumber,
    /// Account ids that liked this card.
    #[serde(default)]
    pub likes: Vec<String>,
    /// Owning account id.
    #[serde(rename = "user_id")]
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl Card {
    /// Overwrite the editable content, leaving identity, owner, likes and
    /// `bizNumber` untouched.
    pub fn apply(&mut self, request: CardRequest) {
        self.title = request.title;
        self.subtitle = request.subtitle;
        self.description = request.description;
        self.phone = request.phone;
        self.email = request.email;
        self.web = request.web;
        self.image = request.image;
        self.address = request.address;
    }

    /// Add `account_id` to the likes, or remove it if already present.
    /// Returns `true` when the card is now liked by that account.
    pub fn toggle_like(&mut self, account_id: &str) -> bool {
        if let Some(pos) = self.likes.iter().position(|id| id == account_id) {
            self.likes.remove(pos);
            false
        } else {
            self.likes.push(account_id.to_string());
            true
        }
    }
}

/// Request body for `POST /cards` and `PUT /cards/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CardRequest {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub web: String,
    pub image: Image,
    pub address: Address,
}

/// Request body for `PATCH /cards/{id}/bizNumber`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReassignBizNumberRequest {
    #[serde(default)]
    pub biz_number: Option<i64>,
}

#[cfg(test)]
pub(crate) fn test_address() -> Address {
    Address {
        state: String::new(),
        country: "Israel".to_string(),
        city: "Tel Aviv".to_string(),
        street: "Rothschild".to_string(),
        house_number: 10,
        zip: Some(12345),
    }
}

#[cfg(test)]
pub(crate) fn test_card(id: &str, owner: &str) -> Card {
    Card {
        id: id.to_string(),
        title: "Coffee Corner".to_string(),
        subtitle: "Espresso bar".to_string(),
        description: "Fresh beans every morning".to_string(),
        phone: "0501234567".to_string(),
        email: "coffee@example.com".to_string(),
        web: String::new(),
        image: Image::default(),
        address: test_address(),
        biz_number: BizNumber::new(1_000_000).expect("valid"),
        likes: Vec::new(),
        user_id: owner.to_string(),
        created_at: Utc::now(),
    }
}
