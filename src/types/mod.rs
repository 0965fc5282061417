//! Types module
//!
//! Contains core data structures used throughout the engine.
//! This module organizes types into logical submodules:
//! - `account`: Account-related types and the account DTO
//! - `transaction`: Transaction records, kinds, results and the DTO
//! - `error`: The domain error taxonomy

pub mod account;
pub mod error;
pub mod transaction;

pub use account::{Account, AccountDto, AccountStatus, AccountUser, UserId};
pub use error::AccountError;
pub use transaction::{Transaction, TransactionDto, TransactionKind, TransactionResult};
