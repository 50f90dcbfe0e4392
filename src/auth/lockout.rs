// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Progressive account lockout.
//!
//! Each account carries a failed-attempt counter and a lock deadline:
//!
//! ```text
//! OPEN   --failure, attempts + 1 < 3-->  OPEN    (attempts += 1)
//! OPEN   --failure, attempts reaches 3-> LOCKED  (lockUntil = now + 24h)
//! any    --success-->                    OPEN    (attempts = 0, lockUntil = 0)
//! LOCKED --lockUntil passes-->           OPEN
//! ```
//!
//! While locked, login is refused before the password is even hashed and the
//! attempt is not counted. The machine has no terminal state.
//!
//! All transitions are pure; the caller runs them inside a single store write
//! transaction so concurrent attempts against one account are serialized.

use serde::{Deserialize, Serialize};

/// Failed verifications allowed before the account locks.
pub const MAX_FAILED_ATTEMPTS: u32 = 3;

/// How long a lock lasts, in milliseconds (24 hours).
pub const LOCK_DURATION_MS: i64 = 24 * 60 * 60 * 1000;

/// Per-account lockout counters, persisted with the account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockoutState {
    /// Consecutive failed verifications since the last success.
    #[serde(default)]
    pub login_attempts: u32,
    /// Epoch milliseconds until which logins are refused; 0 = not locked.
    #[serde(default)]
    pub lock_until: i64,
}

/// Whether authentication may proceed right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockStatus {
    Open,
    Locked { until: i64 },
}

/// Result of recording a failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// Counter incremented, account still open.
    Counted { attempts: u32 },
    /// This failure reached the limit and locked the account.
    Locked { until: i64 },
    /// Another attempt locked the account first; nothing changed.
    AlreadyLocked { until: i64 },
}

impl LockoutState {
    pub fn status(&self, now_ms: i64) -> LockStatus {
        if self.lock_until > now_ms {
            LockStatus::Locked {
                until: self.lock_until,
            }
        } else {
            LockStatus::Open
        }
    }

    /// Record a failed verification at `now_ms`.
    ///
    /// The counter saturates at [`MAX_FAILED_ATTEMPTS`]; once a lock has
    /// expired, the next failure locks again immediately.
    pub fn record_failure(&mut self, now_ms: i64) -> FailureOutcome {
        if let LockStatus::Locked { until } = self.status(now_ms) {
            return FailureOutcome::AlreadyLocked { until };
        }

        self.login_attempts = self
            .login_attempts
            .saturating_add(1)
            .min(MAX_FAILED_ATTEMPTS);

        if self.login_attempts >= MAX_FAILED_ATTEMPTS {
            self.lock_until = now_ms + LOCK_DURATION_MS;
            FailureOutcome::Locked {
                until: self.lock_until,
            }
        } else {
            FailureOutcome::Counted {
                attempts: self.login_attempts,
            }
        }
    }

    /// Full reset after a successful verification.
    pub fn record_success(&mut self) {
        self.login_attempts = 0;
        self.lock_until = 0;
    }
}
