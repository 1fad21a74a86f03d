pub mod accounts;
pub mod error;
pub mod extractors;
pub mod messages;
pub mod routes;

use std::sync::Arc;

use murmur_db::{AccountStore, Database, MessageStore};

use crate::accounts::AccountRules;
use crate::messages::MessageRules;

pub use crate::error::{ApiError, ApiResult};
pub use crate::routes::router;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub accounts: AccountRules,
    pub messages: MessageRules,
}

impl AppStateInner {
    /// Both stores backed by the same SQLite handle.
    pub fn new(db: Arc<Database>) -> Self {
        Self::with_stores(db.clone(), db)
    }

    pub fn with_stores(accounts: Arc<dyn AccountStore>, messages: Arc<dyn MessageStore>) -> Self {
        let accounts = AccountRules::new(accounts);
        let messages = MessageRules::new(messages, accounts.clone());
        Self { accounts, messages }
    }
}
