use std::sync::Arc;

use tracing::{debug, info};

use murmur_db::AccountStore;
use murmur_types::api::Credentials;
use murmur_types::models::Account;

use crate::error::{ApiError, ApiResult};
use crate::messages::text_len;

pub const MIN_PASSWORD_LEN: usize = 4;

/// Registration and login rules on top of an [`AccountStore`].
#[derive(Clone)]
pub struct AccountRules {
    store: Arc<dyn AccountStore>,
}

impl AccountRules {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Nothing is written unless every check passes.
    pub fn register(&self, creds: &Credentials) -> ApiResult<Account> {
        if creds.username.trim().is_empty() {
            debug!("Registration rejected: blank username");
            return Err(ApiError::Validation("username must not be blank".into()));
        }
        if text_len(&creds.password) < MIN_PASSWORD_LEN {
            debug!(username = %creds.username, "Registration rejected: short password");
            return Err(ApiError::Validation(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        if self.store.exists_by_username(&creds.username)? {
            debug!(username = %creds.username, "Registration rejected: username taken");
            return Err(username_taken());
        }

        let account = self
            .store
            .insert_account(&creds.username, &creds.password)?
            .ok_or_else(username_taken)?;

        info!(account_id = account.account_id, username = %account.username, "Account registered");
        Ok(account.into())
    }

    pub fn login(&self, creds: &Credentials) -> ApiResult<Account> {
        let account = self
            .store
            .find_by_credentials(&creds.username, &creds.password)?
            .ok_or(ApiError::Unauthorized)?;

        debug!(account_id = account.account_id, "Login succeeded");
        Ok(account.into())
    }

    pub fn exists_by_username(&self, username: &str) -> ApiResult<bool> {
        Ok(self.store.exists_by_username(username)?)
    }

    pub fn exists_by_id(&self, account_id: i64) -> ApiResult<bool> {
        Ok(self.store.exists_by_id(account_id)?)
    }
}

fn username_taken() -> ApiError {
    ApiError::Validation("username already exists".into())
}
