//! Account-related types for the balance engine
//!
//! This module defines the Account record, its owner, and the DTO shape
//! handed back to callers of the account operations.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Account owner identifier
pub type UserId = u64;

/// Lifecycle status of an account
///
/// An account starts in `InUse` and transitions to `Unregistered` exactly
/// once, when it is deleted. The transition is never reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// Account is open and may transact
    InUse,

    /// Account has been closed; balance-changing operations are rejected
    Unregistered,
}

/// A registered account owner
///
/// Owner equality throughout the engine is identity comparison on `id`
/// only; the name is informational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountUser {
    /// Stable owner identifier
    pub id: UserId,

    /// Display name
    pub name: String,
}

impl AccountUser {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        AccountUser {
            id,
            name: name.into(),
        }
    }
}

/// Account state
///
/// The balance is held in minor currency units and is mutated only through
/// the balance engine (`core::balance`), which preserves the invariant that
/// it never goes negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Stable external identifier, unique and immutable
    pub account_number: String,

    /// Identity of the owning user
    pub user_id: UserId,

    /// Lifecycle status
    pub status: AccountStatus,

    /// Current balance in minor currency units, never negative
    pub balance: i64,

    /// When the account was opened
    pub registered_at: DateTime<Utc>,

    /// When the account was closed, if it has been
    pub unregistered_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Create a new open account
    ///
    /// # Arguments
    ///
    /// * `account_number` - The unique external identifier
    /// * `user_id` - The owning user's identity
    /// * `balance` - The opening balance in minor units
    pub fn new(account_number: impl Into<String>, user_id: UserId, balance: i64) -> Self {
        Account {
            account_number: account_number.into(),
            user_id,
            status: AccountStatus::InUse,
            balance,
            registered_at: Utc::now(),
            unregistered_at: None,
        }
    }

    /// Whether the account has been closed
    pub fn is_unregistered(&self) -> bool {
        self.status == AccountStatus::Unregistered
    }
}

/// Outward-facing account representation
///
/// Returned by the account operations instead of the `Account` record
/// itself, so the persistence shape stays internal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountDto {
    pub user_id: UserId,
    pub account_number: String,
    pub balance: i64,
    pub registered_at: DateTime<Utc>,
    pub unregistered_at: Option<DateTime<Utc>>,
}

impl From<&Account> for AccountDto {
    fn from(account: &Account) -> Self {
        AccountDto {
            user_id: account.user_id,
            account_number: account.account_number.clone(),
            balance: account.balance,
            registered_at: account.registered_at,
            unregistered_at: account.unregistered_at,
        }
    }
}
