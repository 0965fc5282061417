//! Core business logic module
//!
//! This module contains the balance-management components:
//! - `traits` - Store seams for the persistence collaborators
//! - `memory` - DashMap-backed in-memory store implementations
//! - `balance` - Pure debit/credit logic over account values
//! - `lock` - Per-account-number mutual exclusion
//! - `recorder` - Immutable transaction records with balance snapshots
//! - `transaction_service` - The use/cancel/query façade
//! - `account_service` - Account open/close/list

pub mod account_service;
pub mod balance;
pub mod lock;
pub mod memory;
pub mod recorder;
pub mod traits;
pub mod transaction_service;

pub use account_service::{AccountService, MAX_ACCOUNTS_PER_USER};
pub use lock::AccountLockManager;
pub use memory::{InMemoryAccountStore, InMemoryTransactionStore, InMemoryUserStore};
pub use recorder::TransactionRecorder;
pub use traits::{AccountStore, TransactionStore, UserStore};
pub use transaction_service::TransactionService;
