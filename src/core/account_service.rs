//! Account service
//!
//! Open, close and list accounts. These operations never mutate a balance
//! (an account must be empty before it can be closed), so they take no
//! account lock.

use crate::core::traits::{AccountStore, UserStore};
use crate::types::{Account, AccountDto, AccountError, AccountStatus, AccountUser, UserId};
use chrono::Utc;
use rand::Rng;
use std::sync::Arc;
use tracing::info;

/// Maximum number of open or closed accounts a single user may hold
pub const MAX_ACCOUNTS_PER_USER: usize = 10;

const ACCOUNT_NUMBER_LEN: usize = 10;

/// CRUD façade over accounts and their owners
pub struct AccountService {
    users: Arc<dyn UserStore>,
    accounts: Arc<dyn AccountStore>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>, accounts: Arc<dyn AccountStore>) -> Self {
        AccountService { users, accounts }
    }

    /// Open a new account for the user
    ///
    /// Generates a random 10-digit account number, retrying until it does
    /// not collide with an existing one, and persists an open account with
    /// the given opening balance.
    ///
    /// # Errors
    ///
    /// `UserNotFound` if the user does not exist, `InvalidRequest` for a
    /// negative opening balance, `MaxAccountsPerUser` once the user holds
    /// ten accounts.
    pub fn create_account(
        &self,
        user_id: UserId,
        initial_balance: i64,
    ) -> Result<AccountDto, AccountError> {
        let user = self.resolve_user(user_id)?;

        if initial_balance < 0 {
            return Err(AccountError::invalid_request(
                "initial balance must not be negative",
            ));
        }

        if self.accounts.count_by_user(user.id) >= MAX_ACCOUNTS_PER_USER {
            return Err(AccountError::max_accounts_per_user(
                user.id,
                MAX_ACCOUNTS_PER_USER,
            ));
        }

        let account_number = self.generate_account_number();
        let account = Account::new(account_number, user.id, initial_balance);
        self.accounts.save(account.clone());

        info!(
            account_number = %account.account_number,
            user_id = user.id,
            "account created"
        );
        Ok(AccountDto::from(&account))
    }

    /// Close an account
    ///
    /// # Errors
    ///
    /// `UserNotFound` / `AccountNotFound` if resolution fails,
    /// `UserAccountMismatch` if the requesting user is not the owner,
    /// `AccountAlreadyUnregistered` if the account is already closed,
    /// `BalanceNotEmpty` while any balance remains.
    pub fn delete_account(
        &self,
        user_id: UserId,
        account_number: &str,
    ) -> Result<AccountDto, AccountError> {
        let user = self.resolve_user(user_id)?;
        let mut account = self
            .accounts
            .find_by_number(account_number)
            .ok_or_else(|| AccountError::account_not_found(account_number))?;

        validate_delete(&user, &account)?;

        account.status = AccountStatus::Unregistered;
        account.unregistered_at = Some(Utc::now());
        self.accounts.save(account.clone());

        info!(account_number, user_id = user.id, "account unregistered");
        Ok(AccountDto::from(&account))
    }

    /// All accounts held by the user
    pub fn accounts_by_user(&self, user_id: UserId) -> Result<Vec<AccountDto>, AccountError> {
        let user = self.resolve_user(user_id)?;

        Ok(self
            .accounts
            .find_by_user(user.id)
            .iter()
            .map(AccountDto::from)
            .collect())
    }

    fn resolve_user(&self, user_id: UserId) -> Result<AccountUser, AccountError> {
        self.users
            .find_by_id(user_id)
            .ok_or_else(|| AccountError::user_not_found(user_id))
    }

    /// Random 10-digit account number, unused by any existing account
    ///
    /// The candidate space is 10^10, so collisions are rare and the retry
    /// loop terminates quickly for any realistic account population.
    fn generate_account_number(&self) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let candidate: String = (0..ACCOUNT_NUMBER_LEN)
                .map(|_| char::from(b'0' + rng.gen_range(0..10)))
                .collect();

            if self.accounts.find_by_number(&candidate).is_none() {
                return candidate;
            }
        }
    }
}

fn validate_delete(user: &AccountUser, account: &Account) -> Result<(), AccountError> {
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

    if account.balance > 0 {
        return Err(AccountError::balance_not_empty(
            &account.account_number,
            account.balance,
        ));
    }

    Ok(())
}
