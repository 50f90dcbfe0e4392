// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Demo data for local development.
//!
//! Seeds three accounts sharing the password `Aa123456!` (a regular user, a
//! business user and an admin) and three cards owned by the business user.
//! Nothing is written if the store already holds an account.

use chrono::Utc;

use crate::auth::lockout::LockoutState;
use crate::auth::password::{hash_password_blocking, PasswordError};
use crate::biz_number::BizNumber;
use crate::models::{Account, Address, Card, Image, PersonName};
use crate::storage::{Database, StoreError};

pub const DEMO_PASSWORD: &str = "Aa123456!";

const PROFILE_PICTURE: &str =
    "https://cdn.pixabay.com/photo/2015/10/05/22/37/blank-profile-picture-973460_960_720.png";

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("invalid seed bizNumber {0}")]
    BizNumber(u32),
}

struct DemoAccount {
    first: &'static str,
    last: &'static str,
    email: &'static str,
    phone: &'static str,
    city: &'static str,
    street: &'static str,
    house_number: u32,
    zip: u32,
    is_business: bool,
    is_admin: bool,
}

const DEMO_ACCOUNTS: [DemoAccount; 3] = [
    DemoAccount {
        first: "John",
        last: "Doe",
        email: "user@test.com",
        phone: "0500000001",
        city: "Tel Aviv",
        street: "Rothschild",
        house_number: 1,
        zip: 12345,
        is_business: false,
        is_admin: false,
    },
    DemoAccount {
        first: "Biz",
        last: "Man",
        email: "business@test.com",
        phone: "0500000002",
        city: "Haifa",
        street: "Herzl",
        house_number: 2,
        zip: 67890,
        is_business: true,
        is_admin: false,
    },
    DemoAccount {
        first: "Admin",
        last: "User",
        email: "admin@test.com",
        phone: "0500000003",
        city: "Jerusalem",
        street: "Jaffa",
        house_number: 3,
        zip: 54321,
        is_business: true,
        is_admin: true,
    },
];

/// Index into `DEMO_ACCOUNTS` of the account owning the demo cards.
const CARD_OWNER: usize = 1;

const DEMO_BIZ_NUMBERS: [u32; 3] = [1_000_001, 1_000_002, 1_000_003];

/// Seed the demo data into an empty store.
///
/// Returns `false` without writing anything when accounts already exist.
pub async fn seed_demo_data(db: &Database) -> Result<bool, SeedError> {
    if db.account_count()? > 0 {
        tracing::debug!("store not empty, skipping demo seed");
        return Ok(false);
    }

    let password = hash_password_blocking(DEMO_PASSWORD.to_string()).await?;

    let mut account_ids = Vec::with_capacity(DEMO_ACCOUNTS.len());
    for demo in &DEMO_ACCOUNTS {
        let account = Account {
            id: uuid::Uuid::new_v4().to_string(),
            name: PersonName {
                first: demo.first.to_string(),
                middle: String::new(),
                last: demo.last.to_string(),
            },
            phone: demo.phone.to_string(),
            email: demo.email.to_string(),
            password: password.clone(),
            image: Image {
                url: PROFILE_PICTURE.to_string(),
                alt: "pic".to_string(),
            },
            address: Address {
                state: String::new(),
                country: "Israel".to_string(),
                city: demo.city.to_string(),
                street: demo.street.to_string(),
                house_number: demo.house_number,
                zip: Some(demo.zip),
            },
            is_business: demo.is_business,
            is_admin: demo.is_admin,
            lockout: LockoutState::default(),
            created_at: Utc::now(),
        };
        db.create_account(&account)?;
        account_ids.push(account.id);
    }

    let owner = &account_ids[CARD_OWNER];
    for (i, raw) in DEMO_BIZ_NUMBERS.into_iter().enumerate() {
        let n = i + 1;
        let card = Card {
            id: uuid::Uuid::new_v4().to_string(),
            title: format!("Card {n}"),
            subtitle: format!("Subtitle {n}"),
            description: format!("Description {n}"),
            phone: "0500000000".to_string(),
            email: format!("c{n}@test.com"),
            web: String::new(),
            image: Image {
                url: PROFILE_PICTURE.to_string(),
                alt: "alt".to_string(),
            },
            address: Address {
                state: String::new(),
                country: "Israel".to_string(),
                city: "TA".to_string(),
                street: "St".to_string(),
                house_number: 1,
                zip: Some(123),
            },
            biz_number: BizNumber::new(raw.into()).ok_or(SeedError::BizNumber(raw))?,
            likes: Vec::new(),
            user_id: owner.clone(),
            created_at: Utc::now(),
        };
        db.insert_card(&card)?;
    }

    tracing::info!(
        accounts = DEMO_ACCOUNTS.len(),
        cards = DEMO_BIZ_NUMBERS.len(),
        "demo data seeded"
    );
    Ok(true)
}
