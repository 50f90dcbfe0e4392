// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Business identifiers for cards.
//!
//! Every card carries a 7-digit `bizNumber` that is unique across all cards.
//! New numbers are drawn uniformly at random and checked against the card
//! store. The check is only a hint: the insert itself re-checks the unique
//! index inside its write transaction, and a lost race simply triggers a
//! fresh draw.
//!
//! ## Termination
//!
//! The retry loop has no upper bound and no backoff. With 9,000,000 possible
//! values and a sparsely populated store a collision is rare, so termination
//! is probabilistic. That is an accepted limitation; capping the loop would
//! turn a rare slow path into a spurious failure.

use std::fmt;
use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Card;
use crate::storage::{Database, StoreError, StoreResult};

/// Smallest valid business number.
pub const BIZ_NUMBER_MIN: u32 = 1_000_000;

/// Largest valid business number.
pub const BIZ_NUMBER_MAX: u32 = 9_999_999;

/// A 7-digit business identifier in `[1_000_000, 9_999_999]`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct BizNumber(u32);

impl BizNumber {
    /// The smallest business number.
    pub const MIN: BizNumber = BizNumber(BIZ_NUMBER_MIN);

    /// Validate a raw value. Returns `None` when it falls outside the range.
    pub fn new(value: i64) -> Option<Self> {
        let value = u32::try_from(value).ok()?;
        (BIZ_NUMBER_MIN..=BIZ_NUMBER_MAX)
            .contains(&value)
            .then_some(Self(value))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for BizNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Draws unused business numbers and persists new cards under them.
#[derive(Debug, Clone)]
pub struct BizNumberAllocator {
    range: RangeInclusive<u32>,
}

impl Default for BizNumberAllocator {
    fn default() -> Self {
        Self {
            range: BIZ_NUMBER_MIN..=BIZ_NUMBER_MAX,
        }
    }
}

impl BizNumberAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Narrow the draw range. Used by tests to force collisions.
    ///
    /// The range is clamped to the valid business number range.
    pub fn with_range(range: RangeInclusive<u32>) -> Self {
        let start = (*range.start()).max(BIZ_NUMBER_MIN);
        let end = (*range.end()).min(BIZ_NUMBER_MAX);
        Self { range: start..=end }
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> BizNumber {
        BizNumber(rng.gen_range(self.range.clone()))
    }

    /// Draw a number that no card currently uses.
    ///
    /// The number is not reserved; callers persist it as part of the card and
    /// must handle [`StoreError::BizNumberTaken`] if another writer got there
    /// first. Store failures while probing are returned as-is.
    pub fn allocate<R: Rng + ?Sized>(&self, db: &Database, rng: &mut R) -> StoreResult<BizNumber> {
        loop {
            let candidate = self.draw(rng);
            if !db.biz_number_exists(candidate)? {
                return Ok(candidate);
            }
            tracing::debug!(biz_number = %candidate, "bizNumber collision while probing, redrawing");
        }
    }

    /// Assign a fresh business number to `card` and insert it.
    ///
    /// Retries with a new draw whenever the insert loses a race on the unique
    /// index. Any other store error is returned.
    pub fn create_card<R: Rng + ?Sized>(
        &self,
        db: &Database,
        rng: &mut R,
        mut card: Card,
    ) -> StoreResult<Card> {
        loop {
            card.biz_number = self.allocate(db, rng)?;
            match db.insert_card(&card) {
                Ok(()) => return Ok(card),
                Err(StoreError::BizNumberTaken(number)) => {
                    tracing::debug!(biz_number = %number, "bizNumber taken at insert, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }
}
