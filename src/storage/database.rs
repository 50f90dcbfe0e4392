// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded account and card store backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `accounts`: account_id → serialized Account (JSON bytes)
//! - `account_emails`: canonical email → account_id (unique index)
//! - `cards`: card_id → serialized Card (JSON bytes)
//! - `card_biz_numbers`: bizNumber → card_id (unique index)
//!
//! ## Concurrency
//!
//! redb runs one write transaction at a time. Every mutation here reads,
//! checks and writes inside a single write transaction, so a read-modify-write
//! such as a lockout transition or a bizNumber reassignment is atomic with
//! respect to every other writer. Unique indexes are checked in the same
//! transaction that writes the record.

use std::path::Path;

use redb::{ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};

use crate::biz_number::BizNumber;
use crate::models::{Account, Card};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: account_id → serialized Account (JSON bytes).
const ACCOUNTS: TableDefinition<&str, &[u8]> = TableDefinition::new("accounts");

/// Unique index: canonical email → account_id.
const ACCOUNT_EMAILS: TableDefinition<&str, &str> = TableDefinition::new("account_emails");

/// Primary table: card_id → serialized Card (JSON bytes).
const CARDS: TableDefinition<&str, &[u8]> = TableDefinition::new("cards");

/// Unique index: bizNumber → card_id.
const CARD_BIZ_NUMBERS: TableDefinition<u32, &str> = TableDefinition::new("card_biz_numbers");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("email already registered")]
    EmailTaken,

    #[error("bizNumber {0} is already assigned")]
    BizNumberTaken(BizNumber),
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Database
// =============================================================================

/// Embedded ACID store for accounts and cards.
pub struct Database {
    db: redb::Database,
}

impl Database {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = redb::Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ACCOUNTS)?;
            let _ = write_txn.open_table(ACCOUNT_EMAILS)?;
            let _ = write_txn.open_table(CARDS)?;
            let _ = write_txn.open_table(CARD_BIZ_NUMBERS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Cheap read used by the health check.
    pub fn ping(&self) -> StoreResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(ACCOUNTS)?;
        Ok(())
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Insert a new account. Fails with [`StoreError::EmailTaken`] if the
    /// email index already holds `account.email`.
    pub fn create_account(&self, account: &Account) -> StoreResult<()> {
        let json = serde_json::to_vec(account)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut emails = write_txn.open_table(ACCOUNT_EMAILS)?;
            if emails.get(account.email.as_str())?.is_some() {
                return Err(StoreError::EmailTaken);
            }
            emails.insert(account.email.as_str(), account.id.as_str())?;

            let mut accounts = write_txn.open_table(ACCOUNTS)?;
            accounts.insert(account.id.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get_account(&self, account_id: &str) -> StoreResult<Option<Account>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACCOUNTS)?;
        match table.get(account_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Look up an account by canonical email.
    pub fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let read_txn = self.db.begin_read()?;
        let emails = read_txn.open_table(ACCOUNT_EMAILS)?;
        let Some(account_id) = emails.get(email)?.map(|v| v.value().to_string()) else {
            return Ok(None);
        };

        let accounts = read_txn.open_table(ACCOUNTS)?;
        match accounts.get(account_id.as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn list_accounts(&self) -> StoreResult<Vec<Account>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACCOUNTS)?;
        let mut accounts = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            accounts.push(serde_json::from_slice(value.value())?);
        }
        Ok(accounts)
    }

    pub fn account_count(&self) -> StoreResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACCOUNTS)?;
        Ok(table.len()?)
    }

    /// Atomically read, modify and write one account.
    ///
    /// `update` runs inside the write transaction, so no other writer can
    /// interleave between the read and the write. Returns the stored account
    /// and whatever `update` returned. A changed email is re-checked against
    /// the unique index.
    pub fn update_account<T>(
        &self,
        account_id: &str,
        update: impl FnOnce(&mut Account) -> T,
    ) -> StoreResult<(Account, T)> {
        let write_txn = self.db.begin_write()?;
        let (account, output) = {
            let mut accounts = write_txn.open_table(ACCOUNTS)?;

            let existing_bytes = {
                let existing = accounts
                    .get(account_id)?
                    .ok_or_else(|| StoreError::NotFound(format!("Account {account_id}")))?;
                existing.value().to_vec()
            };

            let mut account: Account = serde_json::from_slice(&existing_bytes)?;
            let previous_email = account.email.clone();
            let output = update(&mut account);
            account.id = account_id.to_string();

            if account.email != previous_email {
                let mut emails = write_txn.open_table(ACCOUNT_EMAILS)?;
                if emails.get(account.email.as_str())?.is_some() {
                    return Err(StoreError::EmailTaken);
                }
                emails.remove(previous_email.as_str())?;
                emails.insert(account.email.as_str(), account_id)?;
            }

            let json = serde_json::to_vec(&account)?;
            accounts.insert(account_id, json.as_slice())?;
            (account, output)
        };
        write_txn.commit()?;
        Ok((account, output))
    }

    /// Remove an account and its email index entry. Cards are left in place.
    pub fn delete_account(&self, account_id: &str) -> StoreResult<Account> {
        let write_txn = self.db.begin_write()?;
        let account = {
            let mut accounts = write_txn.open_table(ACCOUNTS)?;
            let removed: Account = {
                let removed = accounts
                    .remove(account_id)?
                    .ok_or_else(|| StoreError::NotFound(format!("Account {account_id}")))?;
                serde_json::from_slice(removed.value())?
            };

            let mut emails = write_txn.open_table(ACCOUNT_EMAILS)?;
            emails.remove(removed.email.as_str())?;
            removed
        };
        write_txn.commit()?;
        Ok(account)
    }

    // =========================================================================
    // Cards
    // =========================================================================

    /// Insert a new card. Fails with [`StoreError::BizNumberTaken`] if another
    /// card already holds `card.biz_number`.
    pub fn insert_card(&self, card: &Card) -> StoreResult<()> {
        let json = serde_json::to_vec(card)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut numbers = write_txn.open_table(CARD_BIZ_NUMBERS)?;
            if numbers.get(card.biz_number.get())?.is_some() {
                return Err(StoreError::BizNumberTaken(card.biz_number));
            }
            numbers.insert(card.biz_number.get(), card.id.as_str())?;

            let mut cards = write_txn.open_table(CARDS)?;
            cards.insert(card.id.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get_card(&self, card_id: &str) -> StoreResult<Option<Card>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CARDS)?;
        match table.get(card_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn list_cards(&self) -> StoreResult<Vec<Card>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CARDS)?;
        let mut cards = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            cards.push(serde_json::from_slice(value.value())?);
        }
        Ok(cards)
    }

    pub fn list_cards_by_owner(&self, owner_id: &str) -> StoreResult<Vec<Card>> {
        Ok(self
            .list_cards()?
            .into_iter()
            .filter(|card| card.user_id == owner_id)
            .collect())
    }

    pub fn biz_number_exists(&self, number: BizNumber) -> StoreResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CARD_BIZ_NUMBERS)?;
        Ok(table.get(number.get())?.is_some())
    }

    /// Atomically read, modify and write one card.
    ///
    /// If `update` changes the bizNumber, the new value is checked against the
    /// unique index in the same transaction; when another card holds it the
    /// transaction is abandoned with [`StoreError::BizNumberTaken`] and the
    /// card is left unchanged.
    pub fn update_card<T>(
        &self,
        card_id: &str,
        update: impl FnOnce(&mut Card) -> T,
    ) -> StoreResult<(Card, T)> {
        let write_txn = self.db.begin_write()?;
        let (card, output) = {
            let mut cards = write_txn.open_table(CARDS)?;

            let existing_bytes = {
                let existing = cards
                    .get(card_id)?
                    .ok_or_else(|| StoreError::NotFound(format!("Card {card_id}")))?;
                existing.value().to_vec()
            };

            let mut card: Card = serde_json::from_slice(&existing_bytes)?;
            let previous_number = card.biz_number;
            let output = update(&mut card);
            card.id = card_id.to_string();

            if card.biz_number != previous_number {
                let mut numbers = write_txn.open_table(CARD_BIZ_NUMBERS)?;
                let holder = numbers
                    .get(card.biz_number.get())?
                    .map(|v| v.value().to_string());
                if holder.is_some_and(|holder| holder != card_id) {
                    return Err(StoreError::BizNumberTaken(card.biz_number));
                }
                numbers.remove(previous_number.get())?;
                numbers.insert(card.biz_number.get(), card_id)?;
            }

            let json = serde_json::to_vec(&card)?;
            cards.insert(card_id, json.as_slice())?;
            (card, output)
        };
        write_txn.commit()?;
        Ok((card, output))
    }

    /// Move a card to a new bizNumber.
    ///
    /// Fails with [`StoreError::NotFound`] for an unknown card and
    /// [`StoreError::BizNumberTaken`] when another card holds `number`.
    pub fn reassign_biz_number(&self, card_id: &str, number: BizNumber) -> StoreResult<Card> {
        self.update_card(card_id, |card| card.biz_number = number)
            .map(|(card, ())| card)
    }

    /// Remove a card and release its bizNumber.
    pub fn delete_card(&self, card_id: &str) -> StoreResult<Card> {
        let write_txn = self.db.begin_write()?;
        let card = {
            let mut cards = write_txn.open_table(CARDS)?;
            let removed: Card = {
                let removed = cards
                    .remove(card_id)?
                    .ok_or_else(|| StoreError::NotFound(format!("Card {card_id}")))?;
                serde_json::from_slice(removed.value())?
            };

            let mut numbers = write_txn.open_table(CARD_BIZ_NUMBERS)?;
            numbers.remove(removed.biz_number.get())?;
            removed
        };
        write_txn.commit()?;
        Ok(card)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::lockout::LockoutState;
    use crate::models::{test_address, test_card, Image, PersonName};
    use chrono::Utc;
    use tempfile::TempDir;

    fn temp_db() -> (Database, TempDir) {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&dir.path().join("test.redb")).unwrap();
        (db, dir)
    }

    fn sample_account(id: &str, email: &str) -> Account {
        Account {
            id: id.to_string(),
            name: PersonName {
                first: "John".to_string(),
                middle: String::new(),
                last: "Doe".to_string(),
            },
            phone: "0500000001".to_string(),
            email: email.to_string(),
            password: "digest".to_string(),
            image: Image::default(),
            address: test_address(),
            is_business: false,
            is_admin: false,
            lockout: LockoutState::default(),
            created_at: Utc::now(),
        }
    }

    fn number(n: u32) -> BizNumber {
        BizNumber::new(n.into()).unwrap()
    }

    #[test]
    fn create_and_find_account_by_email() {
        let (db, _dir) = temp_db();
        let account = sample_account("acc-1", "user@test.com");
        db.create_account(&account).unwrap();

        assert_eq!(db.find_account_by_email("user@test.com").unwrap(), Some(account.clone()));
        assert_eq!(db.get_account("acc-1").unwrap(), Some(account));
        assert_eq!(db.find_account_by_email("other@test.com").unwrap(), None);
        assert_eq!(db.account_count().unwrap(), 1);
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let (db, _dir) = temp_db();
        db.create_account(&sample_account("acc-1", "user@test.com")).unwrap();
        let err = db
            .create_account(&sample_account("acc-2", "user@test.com"))
            .unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken));
        assert!(db.get_account("acc-2").unwrap().is_none());
    }

    #[test]
    fn update_account_is_applied_and_returned() {
        let (db, _dir) = temp_db();
        db.create_account(&sample_account("acc-1", "user@test.com")).unwrap();

        let (updated, previous) = db
            .update_account("acc-1", |a| {
                let previous = a.is_business;
                a.is_business = !a.is_business;
                previous
            })
            .unwrap();
        assert!(!previous);
        assert!(updated.is_business);
        assert!(db.get_account("acc-1").unwrap().unwrap().is_business);
    }

    #[test]
    fn update_account_cannot_steal_an_email() {
        let (db, _dir) = temp_db();
        db.create_account(&sample_account("acc-1", "one@test.com")).unwrap();
        db.create_account(&sample_account("acc-2", "two@test.com")).unwrap();

        let err = db
            .update_account("acc-2", |a| a.email = "one@test.com".to_string())
            .unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken));
        assert_eq!(db.get_account("acc-2").unwrap().unwrap().email, "two@test.com");
    }

    #[test]
    fn update_missing_account_is_not_found() {
        let (db, _dir) = temp_db();
        let err = db.update_account("ghost", |_| ()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn delete_account_frees_email() {
        let (db, _dir) = temp_db();
        db.create_account(&sample_account("acc-1", "user@test.com")).unwrap();
        db.delete_account("acc-1").unwrap();
        assert!(db.find_account_by_email("user@test.com").unwrap().is_none());
        db.create_account(&sample_account("acc-2", "user@test.com")).unwrap();
    }

    #[test]
    fn insert_card_enforces_unique_biz_number() {
        let (db, _dir) = temp_db();
        let mut first = test_card("card-1", "owner-1");
        first.biz_number = number(1_000_001);
        db.insert_card(&first).unwrap();

        let mut second = test_card("card-2", "owner-1");
        second.biz_number = number(1_000_001);
        let err = db.insert_card(&second).unwrap_err();
        assert!(matches!(err, StoreError::BizNumberTaken(n) if n == number(1_000_001)));
        assert!(db.get_card("card-2").unwrap().is_none());
        assert!(db.biz_number_exists(number(1_000_001)).unwrap());
    }

    #[test]
    fn reassign_moves_index_entry() {
        let (db, _dir) = temp_db();
        let mut card = test_card("card-1", "owner-1");
        card.biz_number = number(1_000_001);
        db.insert_card(&card).unwrap();

        let updated = db.reassign_biz_number("card-1", number(2_000_002)).unwrap();
        assert_eq!(updated.biz_number, number(2_000_002));
        assert!(!db.biz_number_exists(number(1_000_001)).unwrap());
        assert!(db.biz_number_exists(number(2_000_002)).unwrap());
    }

    #[test]
    fn reassign_to_taken_number_leaves_card_unchanged() {
        let (db, _dir) = temp_db();
        let mut a = test_card("card-a", "owner-1");
        a.biz_number = number(1_000_001);
        let mut b = test_card("card-b", "owner-2");
        b.biz_number = number(1_000_002);
        db.insert_card(&a).unwrap();
        db.insert_card(&b).unwrap();

        let err = db.reassign_biz_number("card-b", number(1_000_001)).unwrap_err();
        assert!(matches!(err, StoreError::BizNumberTaken(_)));
        assert_eq!(db.get_card("card-b").unwrap().unwrap(), b);
        assert_eq!(db.get_card("card-a").unwrap().unwrap(), a);
    }

    #[test]
    fn reassign_unknown_card_is_not_found() {
        let (db, _dir) = temp_db();
        let err = db.reassign_biz_number("ghost", number(1_000_001)).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn list_cards_by_owner_filters() {
        let (db, _dir) = temp_db();
        for (i, owner) in ["owner-1", "owner-1", "owner-2"].iter().enumerate() {
            let mut card = test_card(&format!("card-{i}"), owner);
            card.biz_number = number(1_000_000 + i as u32);
            db.insert_card(&card).unwrap();
        }
        assert_eq!(db.list_cards().unwrap().len(), 3);
        assert_eq!(db.list_cards_by_owner("owner-1").unwrap().len(), 2);
        assert!(db.list_cards_by_owner("owner-3").unwrap().is_empty());
    }

    #[test]
    fn delete_card_releases_biz_number() {
        let (db, _dir) = temp_db();
        let card = test_card("card-1", "owner-1");
        db.insert_card(&card).unwrap();
        db.delete_card("card-1").unwrap();
        assert!(!db.biz_number_exists(card.biz_number).unwrap());
        assert!(matches!(db.delete_card("card-1"), Err(StoreError::NotFound(_))));
    }
}
