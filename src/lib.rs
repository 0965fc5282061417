//! Balance Engine Library
//! # Overview
//!
//! This library implements a balance-management service: accounts hold a
//! monetary balance, and transactions debit ("use") or credit ("cancel")
//! that balance under strict per-account serialization.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, Transaction, errors, DTOs)
//! - [`core`] - Business logic components:
//!   - [`core::lock`] - At most one in-flight balance mutation per account
//!   - [`core::balance`] - Pure debit/credit validation and application
//!   - [`core::recorder`] - Append-only transaction records with snapshots
//!   - [`core::transaction_service`] - Use/cancel/query orchestration
//!   - [`core::account_service`] - Account open/close/list
//!   - [`core::traits`] / [`core::memory`] - Persistence seams and the
//!     in-memory implementations backing them
//!
//! # Protocol
//!
//! Every use/cancel runs its full resolve-validate-mutate-record sequence
//! while holding the lock for its account number, so concurrent operations
//! against one account are serialized while distinct accounts proceed in
//! parallel. Failed attempts are recorded as FAIL transactions with the
//! unchanged balance and stay queryable.

// Module declarations
pub mod core;
pub mod types;

pub use crate::core::{
    AccountLockManager, AccountService, AccountStore, InMemoryAccountStore,
    InMemoryTransactionStore, InMemoryUserStore, TransactionRecorder, TransactionService,
    TransactionStore, UserStore,
};
pub use types::{
    Account, AccountDto, AccountError, AccountStatus, AccountUser, Transaction, TransactionDto,
    TransactionKind, TransactionResult, UserId,
};
