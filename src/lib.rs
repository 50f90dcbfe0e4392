// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Business Card Service
//!
//! Accounts and business cards behind an HTTP API. The interesting parts are
//! the identity core (password login with progressive lockout, signed session
//! tokens, request authorization) and the unique `bizNumber` allocator used
//! when a card is created.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Password hashing, lockout, session tokens, request authorization
//! - `biz_number` - 7-digit business identifier type and allocator
//! - `storage` - Embedded ACID store for accounts and cards (redb)
//! - `telemetry` - Logging setup and request tracing helpers

pub mod api;
pub mod auth;
pub mod biz_number;
pub mod config;
pub mod error;
pub mod models;
pub mod seed;
pub mod state;
pub mod storage;
pub mod telemetry;
pub mod validation;
