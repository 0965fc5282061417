//! Error types for the balance engine
//!
//! This module defines the domain error taxonomy for account and transaction
//! operations. Every variant is a synchronous, non-retryable domain failure:
//! the operation is abandoned, the account lock (if held) is released, and
//! for use/cancel the façade writes a FAIL transaction record before the
//! error surfaces to the caller.

use crate::types::account::UserId;
use thiserror::Error;

/// Main error type for the balance engine
///
/// Each variant carries the context needed to diagnose the failure without
/// consulting external state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    /// No user exists with the given identifier
    #[error("User {user_id} not found")]
    UserNotFound {
        /// The user identifier that was not found
        user_id: UserId,
    },

    /// No account exists with the given account number
    #[error("Account {account_number} not found")]
    AccountNotFound {
        /// The account number that was not found
        account_number: String,
    },

    /// No transaction exists with the given identifier
    #[error("Transaction {transaction_id} not found")]
    TransactionNotFound {
        /// The transaction identifier that was not found
        transaction_id: String,
    },

    /// The requesting user does not own the account
    #[error("User {user_id} does not own account {account_number}")]
    UserAccountMismatch {
        /// The requesting user
        user_id: UserId,
        /// The account they tried to operate on
        account_number: String,
    },

    /// The account has already been unregistered
    #[error("Account {account_number} is already unregistered")]
    AccountAlreadyUnregistered {
        /// The closed account
        account_number: String,
    },

    /// The requested amount exceeds the current balance
    #[error("Amount {requested} exceeds balance {balance} of account {account_number}")]
    AmountExceedsBalance {
        /// The account whose balance was insufficient
        account_number: String,
        /// Balance at validation time
        balance: i64,
        /// Requested debit amount
        requested: i64,
    },

    /// The request is malformed (e.g. a negative amount)
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of what was invalid
        message: String,
    },

    /// The referenced transaction belongs to a different account
    #[error("Transaction {transaction_id} does not belong to account {account_number}")]
    TransactionAccountMismatch {
        /// The transaction being cancelled
        transaction_id: String,
        /// The account supplied with the cancel request
        account_number: String,
    },

    /// Partial cancels are not supported
    #[error("Cancel amount {requested} must equal the original transaction amount {original}")]
    CancelMustBeFull {
        /// Amount of the original transaction
        original: i64,
        /// Amount supplied with the cancel request
        requested: i64,
    },

    /// The original transaction is more than one year old
    #[error("Transaction {transaction_id} is too old to cancel")]
    TooOldToCancel {
        /// The transaction that can no longer be cancelled
        transaction_id: String,
    },

    /// Crediting the amount would overflow the balance representation
    #[error("Balance overflow on account {account_number}")]
    BalanceOverflow {
        /// The account whose balance would overflow
        account_number: String,
    },

    /// The user already holds the maximum number of accounts
    #[error("User {user_id} already holds the maximum of {max} accounts")]
    MaxAccountsPerUser {
        /// The user at the limit
        user_id: UserId,
        /// The per-user account limit
        max: usize,
    },

    /// The account still holds a balance and cannot be deleted
    #[error("Account {account_number} still holds a balance of {balance}")]
    BalanceNotEmpty {
        /// The non-empty account
        account_number: String,
        /// Remaining balance
        balance: i64,
    },
}

// Helper functions for creating common errors

impl AccountError {
    /// Create a UserNotFound error
    pub fn user_not_found(user_id: UserId) -> Self {
        AccountError::UserNotFound { user_id }
    }

    /// Create an AccountNotFound error
    pub fn account_not_found(account_number: &str) -> Self {
        AccountError::AccountNotFound {
            account_number: account_number.to_string(),
        }
    }

    /// Create a TransactionNotFound error
    pub fn transaction_not_found(transaction_id: &str) -> Self {
        AccountError::TransactionNotFound {
            transaction_id: transaction_id.to_string(),
        }
    }

    /// Create a UserAccountMismatch error
    pub fn user_account_mismatch(user_id: UserId, account_number: &str) -> Self {
        AccountError::UserAccountMismatch {
            user_id,
            account_number: account_number.to_string(),
        }
    }

    /// Create an AccountAlreadyUnregistered error
    pub fn account_already_unregistered(account_number: &str) -> Self {
        AccountError::AccountAlreadyUnregistered {
            account_number: account_number.to_string(),
        }
    }

    /// Create an AmountExceedsBalance error
    pub fn amount_exceeds_balance(account_number: &str, balance: i64, requested: i64) -> Self {
        AccountError::AmountExceedsBalance {
            account_number: account_number.to_string(),
            balance,
            requested,
        }
    }

    /// Create an InvalidRequest error
    pub fn invalid_request(message: &str) -> Self {
        AccountError::InvalidRequest {
            message: message.to_string(),
        }
    }

    /// Create a TransactionAccountMismatch error
    pub fn transaction_account_mismatch(transaction_id: &str, account_number: &str) -> Self {
        AccountError::TransactionAccountMismatch {
            transaction_id: transaction_id.to_string(),
            account_number: account_number.to_string(),
        }
    }

    /// Create a CancelMustBeFull error
    pub fn cancel_must_be_full(original: i64, requested: i64) -> Self {
        AccountError::CancelMustBeFull {
            original,
            requested,
        }
    }

    /// Create a TooOldToCancel error
    pub fn too_old_to_cancel(transaction_id: &str) -> Self {
        AccountError::TooOldToCancel {
            transaction_id: transaction_id.to_string(),
        }
    }

    /// Create a BalanceOverflow error
    pub fn balance_overflow(account_number: &str) -> Self {
        AccountError::BalanceOverflow {
            account_number: account_number.to_string(),
        }
    }

    /// Create a MaxAccountsPerUser error
    pub fn max_accounts_per_user(user_id: UserId, max: usize) -> Self {
        AccountError::MaxAccountsPerUser { user_id, max }
    }

    /// Create a BalanceNotEmpty error
    pub fn balance_not_empty(account_number: &str, balance: i64) -> Self {
        AccountError::BalanceNotEmpty {
            account_number: account_number.to_string(),
            balance,
        }
    }
}
