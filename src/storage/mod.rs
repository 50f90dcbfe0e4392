// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent storage for accounts and business cards in a single redb file
//! under `DATA_DIR`.
//!
//! ## Storage Layout
//!
//! ```text
//! {DATA_DIR}/
//!   bizcards.redb    # accounts, cards and their unique indexes
//! ```
//!
//! Uniqueness of account emails and card bizNumbers is enforced by index
//! tables written in the same transaction as the record they point to.

pub mod database;
pub mod ownership;

pub use database::{Database, StoreError, StoreResult};
pub use ownership::{OwnedResource, OwnershipCheck};

/// File name of the store inside the data directory.
pub const DATABASE_FILE: &str = "bizcards.redb";
