//! Balance engine
//!
//! Pure debit/credit logic over `Account` values. No I/O happens here: both
//! functions take the account by reference and return an updated copy, so a
//! failed validation can never leave a half-applied mutation behind. The
//! transaction service guarantees the amount is a positive integer for valid
//! use/cancel calls; the guards below hold independently of that contract.

use crate::types::{Account, AccountError};

/// Debit `amount` from the account balance
///
/// # Errors
///
/// Returns `AmountExceedsBalance` when `amount` is greater than the current
/// balance. Together with the non-negative amount contract this keeps the
/// balance from ever going negative.
pub fn debit(account: &Account, amount: i64) -> Result<Account, AccountError> {
    if amount > account.balance {
        return Err(AccountError::amount_exceeds_balance(
            &account.account_number,
            account.balance,
            amount,
        ));
    }

    let mut updated = account.clone();
    updated.balance -= amount;
    Ok(updated)
}

/// Credit `amount` to the account balance
///
/// # Errors
///
/// Returns `InvalidRequest` when `amount` is negative and `BalanceOverflow`
/// when the addition would overflow the balance representation.
pub fn credit(account: &Account, amount: i64) -> Result<Account, AccountError> {
    if amount < 0 {
        return Err(AccountError::invalid_request(
            "cancel amount must not be negative",
        ));
    }

    let balance = account
        .balance
        .checked_add(amount)
        .ok_or_else(|| AccountError::balance_overflow(&account.account_number))?;

    let mut updated = account.clone();
    updated.balance = balance;
    Ok(updated)
}
