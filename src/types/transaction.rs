//! Transaction-related types for the balance engine
//!
//! A transaction is the immutable record of one attempted balance-changing
//! operation, successful or not. Records are append-only: once written by
//! the recorder they are never updated or deleted, and they reference their
//! account by number only (deleting an account leaves its history intact).

use chrono::{DateTime, Utc};
use serde::Serialize;

/// The two balance-changing operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// A debit reducing the account balance
    Use,

    /// A full-amount reversal of a prior use, crediting the balance
    Cancel,
}

/// Outcome of an attempted operation
///
/// Failed attempts are recorded too, and remain queryable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionResult {
    Success,
    Fail,
}

/// Immutable record of one attempted operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Globally unique identifier, generated at creation
    pub transaction_id: String,

    /// Account number this record belongs to (weak reference)
    pub account_number: String,

    /// Which operation was attempted
    pub kind: TransactionKind,

    /// Whether the operation succeeded
    pub result: TransactionResult,

    /// Operation amount in minor units, always positive
    pub amount: i64,

    /// Account balance at the moment the record was produced
    ///
    /// For a successful operation this is the post-mutation balance; for a
    /// failed one it is the unchanged balance.
    pub balance_snapshot: i64,

    /// When the operation was attempted
    pub transacted_at: DateTime<Utc>,
}

/// Outward-facing transaction representation
///
/// Mirrors the record field for field; this is what the transaction
/// operations return to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionDto {
    pub account_number: String,
    pub kind: TransactionKind,
    pub result: TransactionResult,
    pub amount: i64,
    pub balance_snapshot: i64,
    pub transaction_id: String,
    pub transacted_at: DateTime<Utc>,
}

impl From<&Transaction> for TransactionDto {
    fn from(transaction: &Transaction) -> Self {
        TransactionDto {
            account_number: transaction.account_number.clone(),
            kind: transaction.kind,
            result: transaction.result,
            amount: transaction.amount,
            balance_snapshot: transaction.balance_snapshot,
            transaction_id: transaction.transaction_id.clone(),
            transacted_at: transaction.transacted_at,
        }
    }
}
