//! In-memory store implementations
//!
//! DashMap-backed implementations of the store seams in [`super::traits`].
//! DashMap shards its entries, so reads and writes to different keys
//! proceed in parallel without a global lock, and a read hands back a clone
//! rather than a reference into the map.
//!
//! These stores are infallible; durable persistence belongs to the excluded
//! collaborators and is out of scope here.

use crate::core::traits::{AccountStore, TransactionStore, UserStore};
use crate::types::{Account, AccountUser, Transaction, UserId};
use dashmap::DashMap;

/// Thread-safe in-memory user store
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: DashMap<UserId, AccountUser>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for InMemoryUserStore {
    fn find_by_id(&self, user_id: UserId) -> Option<AccountUser> {
        self.users.get(&user_id).map(|entry| entry.value().clone())
    }

    fn save(&self, user: AccountUser) {
        self.users.insert(user.id, user);
    }
}

/// Thread-safe in-memory account store keyed by account number
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: DashMap<String, Account>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for InMemoryAccountStore {
    fn find_by_number(&self, account_number: &str) -> Option<Account> {
        self.accounts
            .get(account_number)
            .map(|entry| entry.value().clone())
    }

    fn find_by_user(&self, user_id: UserId) -> Vec<Account> {
        self.accounts
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect()
    }

    fn save(&self, account: Account) {
        self.accounts
            .insert(account.account_number.clone(), account);
    }
}

/// Thread-safe in-memory transaction store keyed by transaction identifier
#[derive(Debug, Default)]
pub struct InMemoryTransactionStore {
    transactions: DashMap<String, Transaction>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransactionStore for InMemoryTransactionStore {
    fn find_by_id(&self, transaction_id: &str) -> Option<Transaction> {
        self.transactions
            .get(transaction_id)
            .map(|entry| entry.value().clone())
    }

    fn find_by_account(&self, account_number: &str) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|entry| entry.value().account_number == account_number)
            .map(|entry| entry.value().clone())
            .collect()
    }

    fn save(&self, transaction: Transaction) {
        self.transactions
            .insert(transaction.transaction_id.clone(), transaction);
    }
}
