// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership enforcement for card mutations.
//!
//! Every edit or delete of a stored card passes through one of these checks
//! after the record has been loaded.

use crate::auth::{AuthError, AuthenticatedAccount};
use crate::models::Card;

/// Trait for resources that have an owning account.
pub trait OwnedResource {
    /// Get the owner's account ID.
    fn owner_account_id(&self) -> &str;

    /// Allow only the owning account.
    ///
    /// # Errors
    /// Returns `AuthError::AccessDenied` if the caller doesn't own the resource.
    fn verify_owner(&self, caller: &AuthenticatedAccount) -> Result<(), AuthError> {
        if self.owner_account_id() == caller.account_id {
            Ok(())
        } else {
            Err(AuthError::AccessDenied)
        }
    }

    /// Allow the owning account or any admin.
    fn verify_owner_or_admin(&self, caller: &AuthenticatedAccount) -> Result<(), AuthError> {
        if caller.is_admin {
            return Ok(());
        }
        self.verify_owner(caller)
    }
}

impl OwnedResource for Card {
    fn owner_account_id(&self) -> &str {
        &self.user_id
    }
}

/// Ownership check on a lookup result.
pub trait OwnershipCheck<T> {
    /// Return the resource if it exists and the caller owns it.
    ///
    /// A missing resource and a resource owned by someone else both come
    /// back as `None`, so callers can answer 404 for either.
    fn owned_by(self, caller: &AuthenticatedAccount) -> Option<T>;
}

impl<T: OwnedResource> OwnershipCheck<T> for Option<T> {
    fn owned_by(self, caller: &AuthenticatedAccount) -> Option<T> {
        self.filter(|resource| resource.verify_owner(caller).is_ok())
    }
}
