//! Transaction service
//!
//! Orchestrates the use/cancel protocol: acquire the account lock, resolve
//! the collaborators, validate, mutate through the balance engine, persist,
//! record. The whole validate-mutate-record sequence runs under the
//! per-account lock so two concurrent uses can never both pass validation
//! against a stale balance.
//!
//! # Failure recording
//!
//! A failure during validation or mutation is written to the transaction
//! history as a FAIL record with the unchanged balance before the error
//! surfaces. Failures to even resolve the user, account or original
//! transaction produce no record — there is nothing consistent to attach
//! one to.

use crate::core::balance;
use crate::core::lock::AccountLockManager;
use crate::core::recorder::TransactionRecorder;
use crate::core::traits::{AccountStore, TransactionStore, UserStore};
use crate::types::{
    Account, AccountError, AccountUser, Transaction, TransactionDto, TransactionKind,
    TransactionResult, UserId,
};
use chrono::{Months, Utc};
use std::sync::Arc;
use tracing::warn;

/// Façade for balance-changing operations and transaction queries
pub struct TransactionService {
    users: Arc<dyn UserStore>,
    accounts: Arc<dyn AccountStore>,
    transactions: Arc<dyn TransactionStore>,
    recorder: TransactionRecorder,
    locks: AccountLockManager,
}

impl TransactionService {
    pub fn new(
        users: Arc<dyn UserStore>,
        accounts: Arc<dyn AccountStore>,
        transactions: Arc<dyn TransactionStore>,
    ) -> Self {
        let recorder = TransactionRecorder::new(Arc::clone(&transactions));
        TransactionService {
            users,
            accounts,
            transactions,
            recorder,
            locks: AccountLockManager::new(),
        }
    }

    /// Debit `amount` from the account
    ///
    /// Runs entirely under the account lock: resolve user and account,
    /// validate ownership, status and balance, debit, persist, record a
    /// SUCCESS/USE transaction with the post-debit balance snapshot.
    ///
    /// # Errors
    ///
    /// `UserNotFound`, `AccountNotFound` if resolution fails (no record is
    /// written); `InvalidRequest` for a non-positive amount;
    /// `UserAccountMismatch`, `AccountAlreadyUnregistered`,
    /// `AmountExceedsBalance` from validation — these leave a FAIL/USE
    /// record behind before surfacing.
    pub fn use_balance(
        &self,
        user_id: UserId,
        account_number: &str,
        amount: i64,
    ) -> Result<TransactionDto, AccountError> {
        self.locks.with_lock(account_number, || {
            if amount <= 0 {
                return Err(AccountError::invalid_request("use amount must be positive"));
            }

            let user = self
                .users
                .find_by_id(user_id)
                .ok_or_else(|| AccountError::user_not_found(user_id))?;
            let account = self
                .accounts
                .find_by_number(account_number)
                .ok_or_else(|| AccountError::account_not_found(account_number))?;

            self.execute_use(&user, account, amount).map_err(|err| {
                warn!(account_number, error = %err, "use balance failed");
                self.record_failure(TransactionKind::Use, account_number, amount);
                err
            })
        })
    }

    fn execute_use(
        &self,
        user: &AccountUser,
        account: Account,
        amount: i64,
    ) -> Result<TransactionDto, AccountError> {
        validate_use(user, &account, amount)?;

        let updated = balance::debit(&account, amount)?;
        self.accounts.save(updated.clone());

        let transaction = self.recorder.record(
            TransactionKind::Use,
            TransactionResult::Success,
            &updated,
            amount,
        );
        Ok(TransactionDto::from(&transaction))
    }

    /// Record a FAIL/USE transaction for an attempt that did not go through
    ///
    /// Resolves the account and snapshots its current, unchanged balance.
    /// No re-validation happens here.
    pub fn save_failed_use_transaction(
        &self,
        account_number: &str,
        amount: i64,
    ) -> Result<(), AccountError> {
        let account = self
            .accounts
            .find_by_number(account_number)
            .ok_or_else(|| AccountError::account_not_found(account_number))?;

        self.recorder.record(
            TransactionKind::Use,
            TransactionResult::Fail,
            &account,
            amount,
        );
        Ok(())
    }

    /// Reverse a prior use in full, crediting the account
    ///
    /// Runs entirely under the account lock: resolve the original
    /// transaction and the account, validate that the transaction belongs
    /// to the account, that the cancel is for the full original amount and
    /// that the original is at most one year old, credit, persist, record a
    /// SUCCESS/CANCEL transaction with the post-credit balance snapshot.
    ///
    /// # Errors
    ///
    /// `TransactionNotFound`, `AccountNotFound` if resolution fails (no
    /// record is written); `InvalidRequest` for a non-positive amount;
    /// `TransactionAccountMismatch`, `CancelMustBeFull`, `TooOldToCancel`
    /// from validation — these leave a FAIL/CANCEL record behind before
    /// surfacing.
    pub fn cancel_balance(
        &self,
        transaction_id: &str,
        account_number: &str,
        amount: i64,
    ) -> Result<TransactionDto, AccountError> {
        self.locks.with_lock(account_number, || {
            if amount <= 0 {
                return Err(AccountError::invalid_request(
                    "cancel amount must be positive",
                ));
            }

            let original = self
                .transactions
                .find_by_id(transaction_id)
                .ok_or_else(|| AccountError::transaction_not_found(transaction_id))?;
            let account = self
                .accounts
                .find_by_number(account_number)
                .ok_or_else(|| AccountError::account_not_found(account_number))?;

            self.execute_cancel(&original, account, amount).map_err(|err| {
                warn!(account_number, error = %err, "cancel balance failed");
                self.record_failure(TransactionKind::Cancel, account_number, amount);
                err
            })
        })
    }

    fn execute_cancel(
        &self,
        original: &Transaction,
        account: Account,
        amount: i64,
    ) -> Result<TransactionDto, AccountError> {
        validate_cancel(original, &account, amount)?;

        let updated = balance::credit(&account, amount)?;
        self.accounts.save(updated.clone());

        let transaction = self.recorder.record(
            TransactionKind::Cancel,
            TransactionResult::Success,
            &updated,
            amount,
        );
        Ok(TransactionDto::from(&transaction))
    }

    /// Record a FAIL/CANCEL transaction for an attempt that did not go
    /// through, analogous to [`Self::save_failed_use_transaction`]
    pub fn save_failed_cancel_transaction(
        &self,
        account_number: &str,
        amount: i64,
    ) -> Result<(), AccountError> {
        let account = self
            .accounts
            .find_by_number(account_number)
            .ok_or_else(|| AccountError::account_not_found(account_number))?;

        self.recorder.record(
            TransactionKind::Cancel,
            TransactionResult::Fail,
            &account,
            amount,
        );
        Ok(())
    }

    /// Look up one transaction by identifier
    ///
    /// Failed attempts are queryable like successful ones. Takes no lock
    /// and may run concurrently with in-flight mutations.
    pub fn query_transaction(&self, transaction_id: &str) -> Result<TransactionDto, AccountError> {
        self.transactions
            .find_by_id(transaction_id)
            .map(|transaction| TransactionDto::from(&transaction))
            .ok_or_else(|| AccountError::transaction_not_found(transaction_id))
    }

    /// Best-effort FAIL record for a failed use/cancel
    ///
    /// If the record itself cannot be written the original domain error
    /// still surfaces; masking it with a bookkeeping error would hide the
    /// real failure from the caller.
    fn record_failure(&self, kind: TransactionKind, account_number: &str, amount: i64) {
        let outcome = match kind {
            TransactionKind::Use => self.save_failed_use_transaction(account_number, amount),
            TransactionKind::Cancel => self.save_failed_cancel_transaction(account_number, amount),
        };
        if let Err(record_err) = outcome {
            warn!(account_number, error = %record_err, "could not record failed transaction");
        }
    }
}

fn validate_use(user: &AccountUser, account: &Account, amount: i64) -> Result<(), AccountError> {
    if user.id != account.user_id {
        return Err(AccountError::user_account_mismatch(
            user.id,
            &account.account_number,
        ));
    }

    if account.is_unregistered() {
        return Err(AccountError::account_already_unregistered(
            &account.account_number,
        ));
    }

    if amount > account.balance {
        return Err(AccountError::amount_exceeds_balance(
            &account.account_number,
            account.balance,
            amount,
        ));
    }

    Ok(())
}

fn validate_cancel(
    original: &Transaction,
    account: &Account,
    amount: i64,
) -> Result<(), AccountError> {
    if original.account_number != account.account_number {
        return Err(AccountError::transaction_account_mismatch(
            &original.transaction_id,
            &account.account_number,
        ));
    }

    if original.amount != amount {
        return Err(AccountError::cancel_must_be_full(original.amount, amount));
    }

    // strictly more than one calendar year old; the exact boundary may
    // still be cancelled
    if original.transacted_at < Utc::now() - Months::new(12) {
        return Err(AccountError::too_old_to_cancel(&original.transaction_id));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::memory::{InMemoryAccountStore, InMemoryTransactionStore, InMemoryUserStore};
    use crate::core::recorder::new_transaction_id;
    use chrono::Duration;

    struct Fixture {
        service: TransactionService,
        users: Arc<InMemoryUserStore>,
        accounts: Arc<InMemoryAccountStore>,
        transactions: Arc<InMemoryTransactionStore>,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(InMemoryUserStore::new());
        let accounts = Arc::new(InMemoryAccountStore::new());
        let transactions = Arc::new(InMemoryTransactionStore::new());
        let service = TransactionService::new(
            Arc::clone(&users) as Arc<dyn UserStore>,
            Arc::clone(&accounts) as Arc<dyn AccountStore>,
            Arc::clone(&transactions) as Arc<dyn TransactionStore>,
        );
        Fixture {
            service,
            users,
            accounts,
            transactions,
        }
    }

    fn seed_account(fix: &Fixture, user_id: UserId, account_number: &str, balance: i64) {
        fix.users.save(AccountUser::new(user_id, "yez"));
        fix.accounts
            .save(Account::new(account_number, user_id, balance));
    }

    fn seed_use_transaction(
        fix: &Fixture,
        account_number: &str,
        amount: i64,
        transacted_at: chrono::DateTime<Utc>,
    ) -> String {
        let transaction = Transaction {
            transaction_id: new_transaction_id(),
            account_number: account_number.to_string(),
            kind: TransactionKind::Use,
            result: TransactionResult::Success,
            amount,
            balance_snapshot: 0,
            transacted_at,
        };
        let id = transaction.transaction_id.clone();
        fix.transactions.save(transaction);
        id
    }

    #[test]
    fn test_use_balance_success() {
        let fix = fixture();
        seed_account(&fix, 12, "1000000001", 10000);

        let dto = fix.service.use_balance(12, "1000000001", 2000).unwrap();

        assert_eq!(dto.kind, TransactionKind::Use);
        assert_eq!(dto.result, TransactionResult::Success);
        assert_eq!(dto.amount, 2000);
        assert_eq!(dto.balance_snapshot, 8000);

        // account was persisted with the debited balance
        let account = fix.accounts.find_by_number("1000000001").unwrap();
        assert_eq!(account.balance, 8000);

        // the record is in the history under its fresh id
        let stored = fix.transactions.find_by_id(&dto.transaction_id).unwrap();
        assert_eq!(stored.balance_snapshot, 8000);
    }

    #[test]
    fn test_use_balance_user_not_found() {
        let fix = fixture();

        let result = fix.service.use_balance(1, "1000000001", 1000);

        assert_eq!(result, Err(AccountError::user_not_found(1)));
        // resolution failure: nothing recorded
        assert!(fix.transactions.find_by_account("1000000001").is_empty());
    }

    #[test]
    fn test_use_balance_account_not_found() {
        let fix = fixture();
        fix.users.save(AccountUser::new(1, "yez"));

        let result = fix.service.use_balance(1, "1000000001", 1000);

        assert_eq!(result, Err(AccountError::account_not_found("1000000001")));
        assert!(fix.transactions.find_by_account("1000000001").is_empty());
    }

    #[test]
    fn test_use_balance_owner_mismatch_records_failure() {
        let fix = fixture();
        seed_account(&fix, 12, "1000000001", 10000);
        fix.users.save(AccountUser::new(13, "other"));

        let result = fix.service.use_balance(13, "1000000001", 1000);

        assert_eq!(
            result,
            Err(AccountError::user_account_mismatch(13, "1000000001"))
        );

        let history = fix.transactions.find_by_account("1000000001");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].result, TransactionResult::Fail);
        assert_eq!(history[0].kind, TransactionKind::Use);
        assert_eq!(history[0].balance_snapshot, 10000);
    }

    #[test]
    fn test_use_balance_unregistered_account_records_failure() {
        let fix = fixture();
        fix.users.save(AccountUser::new(12, "yez"));
        let mut account = Account::new("1000000001", 12, 10000);
        account.status = crate::types::AccountStatus::Unregistered;
        account.unregistered_at = Some(Utc::now());
        fix.accounts.save(account);

        let result = fix.service.use_balance(12, "1000000001", 1000);

        assert_eq!(
            result,
            Err(AccountError::account_already_unregistered("1000000001"))
        );
        assert_eq!(fix.transactions.find_by_account("1000000001").len(), 1);
        // the balance is untouched
        assert_eq!(
            fix.accounts.find_by_number("1000000001").unwrap().balance,
            10000
        );
    }

    #[test]
    fn test_use_balance_amount_exceeds_balance() {
        let fix = fixture();
        seed_account(&fix, 12, "1000000001", 100);

        let result = fix.service.use_balance(12, "1000000001", 1000);

        assert_eq!(
            result,
            Err(AccountError::amount_exceeds_balance("1000000001", 100, 1000))
        );
        assert_eq!(
            fix.accounts.find_by_number("1000000001").unwrap().balance,
            100
        );

        let history = fix.transactions.find_by_account("1000000001");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].result, TransactionResult::Fail);
        assert_eq!(history[0].balance_snapshot, 100);
    }

    #[test]
    fn test_use_balance_rejects_non_positive_amount() {
        let fix = fixture();
        seed_account(&fix, 12, "1000000001", 10000);

        for amount in [0, -5] {
            let result = fix.service.use_balance(12, "1000000001", amount);
            assert!(matches!(result, Err(AccountError::InvalidRequest { .. })));
        }
        assert!(fix.transactions.find_by_account("1000000001").is_empty());
    }

    #[test]
    fn test_save_failed_use_transaction_snapshots_current_balance() {
        let fix = fixture();
        seed_account(&fix, 12, "1000000001", 10000);

        fix.service
            .save_failed_use_transaction("1000000001", 200)
            .unwrap();

        let history = fix.transactions.find_by_account("1000000001");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, TransactionKind::Use);
        assert_eq!(history[0].result, TransactionResult::Fail);
        assert_eq!(history[0].amount, 200);
        assert_eq!(history[0].balance_snapshot, 10000);
        assert_eq!(
            fix.accounts.find_by_number("1000000001").unwrap().balance,
            10000
        );
    }

    #[test]
    fn test_save_failed_use_transaction_account_not_found() {
        let fix = fixture();

        let result = fix.service.save_failed_use_transaction("1000000001", 200);

        assert_eq!(result, Err(AccountError::account_not_found("1000000001")));
    }

    #[test]
    fn test_cancel_balance_success() {
        let fix = fixture();
        seed_account(&fix, 12, "1000000001", 10000);
        let original = seed_use_transaction(&fix, "1000000001", 2000, Utc::now());

        let dto = fix
            .service
            .cancel_balance(&original, "1000000001", 2000)
            .unwrap();

        assert_eq!(dto.kind, TransactionKind::Cancel);
        assert_eq!(dto.result, TransactionResult::Success);
        assert_eq!(dto.amount, 2000);
        assert_eq!(dto.balance_snapshot, 12000);
        assert_eq!(
            fix.accounts.find_by_number("1000000001").unwrap().balance,
            12000
        );
    }

    #[test]
    fn test_cancel_balance_transaction_not_found() {
        let fix = fixture();
        seed_account(&fix, 12, "1000000001", 10000);

        let result = fix.service.cancel_balance("missing", "1000000001", 2000);

        assert_eq!(result, Err(AccountError::transaction_not_found("missing")));
        assert!(fix.transactions.find_by_account("1000000001").is_empty());
    }

    #[test]
    fn test_cancel_balance_account_not_found() {
        let fix = fixture();
        seed_account(&fix, 12, "1000000001", 10000);
        let original = seed_use_transaction(&fix, "1000000001", 2000, Utc::now());

        let result = fix.service.cancel_balance(&original, "9999999999", 2000);

        assert_eq!(result, Err(AccountError::account_not_found("9999999999")));
    }

    #[test]
    fn test_cancel_balance_account_mismatch_records_failure() {
        let fix = fixture();
        seed_account(&fix, 12, "1000000001", 10000);
        fix.accounts.save(Account::new("1000000002", 12, 5000));
        let original = seed_use_transaction(&fix, "1000000001", 2000, Utc::now());

        let result = fix.service.cancel_balance(&original, "1000000002", 2000);

        assert_eq!(
            result,
            Err(AccountError::transaction_account_mismatch(
                &original,
                "1000000002"
            ))
        );

        // the FAIL record lands on the account supplied with the request
        let history = fix.transactions.find_by_account("1000000002");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, TransactionKind::Cancel);
        assert_eq!(history[0].result, TransactionResult::Fail);
        // neither balance moved
        assert_eq!(
            fix.accounts.find_by_number("1000000001").unwrap().balance,
            10000
        );
        assert_eq!(
            fix.accounts.find_by_number("1000000002").unwrap().balance,
            5000
        );
    }

    #[test]
    fn test_cancel_balance_partial_cancel_fails() {
        let fix = fixture();
        seed_account(&fix, 12, "1000000001", 10000);
        let original = seed_use_transaction(&fix, "1000000001", 2000, Utc::now());

        let result = fix.service.cancel_balance(&original, "1000000001", 1000);

        assert_eq!(result, Err(AccountError::cancel_must_be_full(2000, 1000)));
        assert_eq!(
            fix.accounts.find_by_number("1000000001").unwrap().balance,
            10000
        );
    }

    #[test]
    fn test_cancel_balance_too_old() {
        let fix = fixture();
        seed_account(&fix, 12, "1000000001", 10000);
        let transacted_at = Utc::now() - Months::new(12) - Duration::days(1);
        let original = seed_use_transaction(&fix, "1000000001", 2000, transacted_at);

        let result = fix.service.cancel_balance(&original, "1000000001", 2000);

        assert_eq!(result, Err(AccountError::too_old_to_cancel(&original)));
        assert_eq!(
            fix.accounts.find_by_number("1000000001").unwrap().balance,
            10000
        );
    }

    #[test]
    fn test_cancel_balance_one_year_minus_one_second_succeeds() {
        let fix = fixture();
        seed_account(&fix, 12, "1000000001", 10000);
        let transacted_at = Utc::now() - Months::new(12) + Duration::seconds(1);
        let original = seed_use_transaction(&fix, "1000000001", 2000, transacted_at);

        let dto = fix
            .service
            .cancel_balance(&original, "1000000001", 2000)
            .unwrap();

        assert_eq!(dto.result, TransactionResult::Success);
        assert_eq!(dto.balance_snapshot, 12000);
    }

    #[test]
    fn test_query_transaction_success() {
        let fix = fixture();
        seed_account(&fix, 12, "1000000001", 10000);
        let dto = fix.service.use_balance(12, "1000000001", 2000).unwrap();

        let queried = fix.service.query_transaction(&dto.transaction_id).unwrap();

        assert_eq!(queried, dto);
    }

    #[test]
    fn test_query_transaction_returns_failed_attempts() {
        let fix = fixture();
        seed_account(&fix, 12, "1000000001", 100);

        fix.service.use_balance(12, "1000000001", 1000).unwrap_err();

        let history = fix.transactions.find_by_account("1000000001");
        let failed = &history[0];
        let queried = fix
            .service
            .query_transaction(&failed.transaction_id)
            .unwrap();
        assert_eq!(queried.result, TransactionResult::Fail);
        assert_eq!(queried.balance_snapshot, 100);
    }

    #[test]
    fn test_query_transaction_not_found() {
        let fix = fixture();

        let result = fix.service.query_transaction("missing");

        assert_eq!(result, Err(AccountError::transaction_not_found("missing")));
    }
}
