// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration and login.
//!
//! ## Login Flow
//!
//! 1. Look the account up by canonical email
//! 2. Refuse immediately if the account is locked (no hashing, no counting)
//! 3. Verify the password on the blocking pool
//! 4. Apply the lockout transition in one store write transaction
//! 5. On success, mint a session token
//!
//! An unknown email and a wrong password produce the same error.

use chrono::Utc;

use super::lockout::{FailureOutcome, LockStatus, LockoutState};
use super::password::{hash_password_blocking, verify_password_blocking, PasswordError};
use super::{AuthError, AuthenticatedAccount, SessionKeys};
use crate::models::{Account, RegisterRequest};
use crate::storage::{Database, StoreError};
use crate::validation::canonical_email;

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("User already registered.")]
    EmailTaken,
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for RegisterError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::EmailTaken => RegisterError::EmailTaken,
            other => RegisterError::Store(other),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("Account is locked for 24 hours due to too many failed attempts.")]
    Locked { until: i64 },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Session(#[from] AuthError),
}

/// Create an account from a validated registration request.
pub async fn register(db: &Database, request: RegisterRequest) -> Result<Account, RegisterError> {
    let email = canonical_email(&request.email);
    if db.find_account_by_email(&email)?.is_some() {
        return Err(RegisterError::EmailTaken);
    }

    let password = hash_password_blocking(request.password).await?;

    let account = Account {
        id: uuid::Uuid::new_v4().to_string(),
        name: request.name,
        phone: request.phone,
        email,
        password,
        image: request.image,
        address: request.address,
        is_business: request.is_business,
        is_admin: false,
        lockout: LockoutState::default(),
        created_at: Utc::now(),
    };

    // The unique email index re-checks inside the insert transaction.
    db.create_account(&account)?;
    tracing::info!(account_id = %account.id, is_business = account.is_business, "account registered");

    Ok(account)
}

/// Verify credentials and return a session token.
pub async fn login(
    db: &Database,
    sessions: &SessionKeys,
    email: &str,
    password: &str,
) -> Result<String, LoginError> {
    let email = canonical_email(email);
    let Some(account) = db.find_account_by_email(&email)? else {
        tracing::info!("login failed: unknown email");
        return Err(LoginError::InvalidCredentials);
    };

    if let LockStatus::Locked { until } = account.lockout.status(Utc::now().timestamp_millis()) {
        tracing::warn!(account_id = %account.id, lock_until = until, "login refused: account locked");
        return Err(LoginError::Locked { until });
    }

    let matched = verify_password_blocking(password.to_string(), account.password.clone()).await;

    if !matched {
        let now = Utc::now().timestamp_millis();
        let outcome = match db.update_account(&account.id, |a| a.lockout.record_failure(now)) {
            Ok((_, outcome)) => outcome,
            Err(StoreError::NotFound(_)) => return Err(LoginError::InvalidCredentials),
            Err(e) => return Err(e.into()),
        };

        match outcome {
            FailureOutcome::Counted { attempts } => {
                tracing::info!(account_id = %account.id, attempts, "login failed: wrong password");
            }
            FailureOutcome::Locked { until } => {
                tracing::warn!(account_id = %account.id, lock_until = until, "account locked after repeated failures");
            }
            FailureOutcome::AlreadyLocked { until } => {
                tracing::debug!(account_id = %account.id, lock_until = until, "failure raced an existing lock, not counted");
            }
        }
        return Err(LoginError::InvalidCredentials);
    }

    let updated = match db.update_account(&account.id, |a| a.lockout.record_success()) {
        Ok((updated, ())) => updated,
        Err(StoreError::NotFound(_)) => return Err(LoginError::InvalidCredentials),
        Err(e) => return Err(e.into()),
    };

    let token = sessions.issue(&AuthenticatedAccount {
        account_id: updated.id,
        is_business: updated.is_business,
        is_admin: updated.is_admin,
    })?;

    tracing::info!(account_id = %account.id, "login succeeded");
    Ok(token)
}
