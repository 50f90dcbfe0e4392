// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session claims and the authenticated account representation.

use serde::{Deserialize, Serialize};

use super::AuthError;

/// Claims carried inside a session token.
///
/// There is deliberately no `exp`: a token stays valid until the signing key
/// is rotated. `iat` is informational and never validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(rename = "_id")]
    pub sub: String,
    #[serde(rename = "isBusiness")]
    pub is_business: bool,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
    #[serde(default)]
    pub iat: i64,
}

/// The caller behind a verified session token.
///
/// Inserted into request extensions by the session middleware and handed to
/// handlers through the `Auth` extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedAccount {
    pub account_id: String,
    pub is_business: bool,
    pub is_admin: bool,
}

impl AuthenticatedAccount {
    pub fn from_claims(claims: SessionClaims) -> Self {
        Self {
            account_id: claims.sub,
            is_business: claims.is_business,
            is_admin: claims.is_admin,
        }
    }

    pub fn to_claims(&self, issued_at: i64) -> SessionClaims {
        SessionClaims {
            sub: self.account_id.clone(),
            is_business: self.is_business,
            is_admin: self.is_admin,
            iat: issued_at,
        }
    }

    pub fn is_self(&self, account_id: &str) -> bool {
        self.account_id == account_id
    }

    /// Only the account itself.
    pub fn require_self(&self, account_id: &str) -> Result<(), AuthError> {
        if self.is_self(account_id) {
            Ok(())
        } else {
            Err(AuthError::AccessDenied)
        }
    }

    /// The account itself or any admin.
    pub fn require_self_or_admin(&self, account_id: &str) -> Result<(), AuthError> {
        if self.is_self(account_id) || self.is_admin {
            Ok(())
        } else {
            Err(AuthError::AccessDenied)
        }
    }
}
