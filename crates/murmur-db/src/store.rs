//! Persistence seams used by the API rules.
//!
//! `Database` implements both traits. Every method issues a single statement;
//! "no row" comes back as `Ok(None)`, `Ok(false)` or an empty `Vec`, never as an error.

use anyhow::Result;

use crate::models::{AccountRow, MessageRow};

pub trait AccountStore: Send + Sync {
    fn find_by_credentials(&self, username: &str, password: &str) -> Result<Option<AccountRow>>;

    /// Returns `None` when the username is already taken.
    fn insert_account(&self, username: &str, password: &str) -> Result<Option<AccountRow>>;

    fn exists_by_username(&self, username: &str) -> Result<bool>;

    fn exists_by_id(&self, account_id: i64) -> Result<bool>;
}

pub trait MessageStore: Send + Sync {
    fn insert_message(
        &self,
        posted_by: i64,
        message_text: &str,
        time_posted_epoch: i64,
    ) -> Result<MessageRow>;

    fn find_message(&self, message_id: i64) -> Result<Option<MessageRow>>;

    fn all_messages(&self) -> Result<Vec<MessageRow>>;

    fn messages_by_account(&self, account_id: i64) -> Result<Vec<MessageRow>>;

    /// Returns the number of rows removed (0 or 1).
    fn delete_message(&self, message_id: i64) -> Result<usize>;

    /// Returns the number of rows changed (0 or 1).
    fn update_message_text(&self, message_id: i64, message_text: &str) -> Result<usize>;
}
