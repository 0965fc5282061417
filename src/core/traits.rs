//! Store seams for the persistence collaborators
//!
//! The engine treats user, account and transaction persistence as external
//! collaborators behind these traits; the services hold them as
//! `Arc<dyn …>`. `core::memory` supplies in-memory implementations used by
//! the tests and by embeddings that need no real database.

use crate::types::{Account, AccountUser, Transaction, UserId};

/// Lookup of registered account owners
pub trait UserStore: Send + Sync {
    /// Resolve a user by identity
    fn find_by_id(&self, user_id: UserId) -> Option<AccountUser>;

    /// Persist a user
    fn save(&self, user: AccountUser);
}

/// Account persistence keyed by account number
pub trait AccountStore: Send + Sync {
    /// Resolve an account by its account number
    fn find_by_number(&self, account_number: &str) -> Option<Account>;

    /// All accounts owned by the given user
    fn find_by_user(&self, user_id: UserId) -> Vec<Account>;

    /// Number of accounts owned by the given user
    fn count_by_user(&self, user_id: UserId) -> usize {
        self.find_by_user(user_id).len()
    }

    /// Persist an account, overwriting any previous state under the same
    /// account number (write-back after a balance or status mutation)
    fn save(&self, account: Account);
}

/// Append-only transaction persistence
///
/// Records are never updated or deleted once saved.
pub trait TransactionStore: Send + Sync {
    /// Resolve a transaction by its identifier
    fn find_by_id(&self, transaction_id: &str) -> Option<Transaction>;

    /// Full history of the given account, failed attempts included
    fn find_by_account(&self, account_number: &str) -> Vec<Transaction>;

    /// Append a record
    fn save(&self, transaction: Transaction);
}
