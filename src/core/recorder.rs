//! Transaction recorder
//!
//! Persists the outcome of every attempted operation, successful or failed,
//! as an immutable transaction record carrying a balance snapshot. Records
//! are created exactly once and never touched again.

use crate::core::traits::TransactionStore;
use crate::types::{Account, Transaction, TransactionKind, TransactionResult};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Generate a fresh transaction identifier
///
/// A random v4 uuid rendered as 32 hex characters. Collision probability is
/// negligible; the identifier is treated as globally unique without an
/// external uniqueness check.
pub fn new_transaction_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Writes immutable transaction records with balance snapshots
#[derive(Clone)]
pub struct TransactionRecorder {
    transactions: Arc<dyn TransactionStore>,
}

impl TransactionRecorder {
    pub fn new(transactions: Arc<dyn TransactionStore>) -> Self {
        TransactionRecorder { transactions }
    }

    /// Record one attempted operation against `account`
    ///
    /// Generates a fresh identifier, stamps the current time, captures
    /// `balance_snapshot` from the account's balance at call time, persists
    /// the record and returns it. The snapshot convention is therefore set
    /// by the caller: pass the post-mutation account for a success, the
    /// untouched account for a failure.
    pub fn record(
        &self,
        kind: TransactionKind,
        result: TransactionResult,
        account: &Account,
        amount: i64,
    ) -> Transaction {
        let transaction = Transaction {
            transaction_id: new_transaction_id(),
            account_number: account.account_number.clone(),
            kind,
            result,
            amount,
            balance_snapshot: account.balance,
            transacted_at: Utc::now(),
        };

        self.transactions.save(transaction.clone());
        transaction
    }
}
