// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Local account authentication for the business card API.
//!
//! ## Auth Flow
//!
//! 1. Client posts email and password to `/accounts/login`
//! 2. Server checks the lockout window, verifies the Argon2 digest and
//!    updates the failure counter in one store transaction
//! 3. On success the server returns an HS256 session token carrying
//!    `_id`, `isBusiness` and `isAdmin`
//! 4. Client sends `Authorization: Bearer <token>` (or the legacy
//!    `x-auth-token` header) on protected routes
//!
//! ## Security
//!
//! - Three consecutive failures lock the account for 24 hours
//! - Unknown emails and wrong passwords produce the same response
//! - Token verification is pinned to HS256
//! - The signing secret is loaded once at startup and never logged

pub mod claims;
pub mod error;
pub mod extractor;
pub mod lockout;
pub mod middleware;
pub mod password;
pub mod service;
pub mod session;

pub use claims::AuthenticatedAccount;
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth};
pub use middleware::require_session;
pub use session::SessionKeys;
