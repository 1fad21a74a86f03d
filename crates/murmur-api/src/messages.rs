use std::sync::Arc;

use tracing::{debug, info};

use murmur_db::MessageStore;
use murmur_types::api::NewMessageRequest;
use murmur_types::models::Message;

use crate::accounts::AccountRules;
use crate::error::{ApiError, ApiResult};

pub const MAX_MESSAGE_LEN: usize = 255;

/// Message rules on top of a [`MessageStore`]. Poster existence is checked
/// through [`AccountRules`] before anything is inserted.
#[derive(Clone)]
pub struct MessageRules {
    store: Arc<dyn MessageStore>,
    accounts: AccountRules,
}

impl MessageRules {
    pub fn new(store: Arc<dyn MessageStore>, accounts: AccountRules) -> Self {
        Self { store, accounts }
    }

    pub fn create(&self, req: &NewMessageRequest) -> ApiResult<Message> {
        validate_text(&req.message_text)?;
        if !self.accounts.exists_by_id(req.posted_by)? {
            debug!(posted_by = req.posted_by, "Message rejected: unknown poster");
            return Err(ApiError::Validation(format!(
                "account {} does not exist",
                req.posted_by
            )));
        }

        let time_posted_epoch = req
            .time_posted_epoch
            .unwrap_or_else(|| chrono::Utc::now().timestamp());

        let message =
            self.store
                .insert_message(req.posted_by, &req.message_text, time_posted_epoch)?;

        info!(message_id = message.message_id, posted_by = message.posted_by, "Message created");
        Ok(message.into())
    }

    pub fn read(&self, message_id: i64) -> ApiResult<Option<Message>> {
        Ok(self.store.find_message(message_id)?.map(Into::into))
    }

    pub fn read_all(&self) -> ApiResult<Vec<Message>> {
        Ok(self.store.all_messages()?.into_iter().map(Into::into).collect())
    }

    pub fn read_by_account(&self, account_id: i64) -> ApiResult<Vec<Message>> {
        Ok(self
            .store
            .messages_by_account(account_id)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Returns the message as it was before deletion.
    ///
    /// The lookup and the delete are separate statements; if another request
    /// removes the row in between, this call reports not-found.
    pub fn delete(&self, message_id: i64) -> ApiResult<Message> {
        let message = self
            .store
            .find_message(message_id)?
            .ok_or_else(|| message_not_found(message_id))?;

        if self.store.delete_message(message_id)? == 0 {
            return Err(message_not_found(message_id));
        }

        info!(message_id, "Message deleted");
        Ok(message.into())
    }

    /// Replaces the text only; `message_id`, `posted_by` and
    /// `time_posted_epoch` keep their stored values.
    pub fn update(&self, message_id: i64, message_text: &str) -> ApiResult<Message> {
        let Some(mut message) = self.store.find_message(message_id)? else {
            debug!(message_id, "Update rejected: no such message");
            return Err(message_missing(message_id));
        };
        validate_text(message_text)?;

        if self.store.update_message_text(message_id, message_text)? == 0 {
            debug!(message_id, "Update rejected: message vanished before the write");
            return Err(message_missing(message_id));
        }
        message.message_text = message_text.to_string();

        info!(message_id, "Message updated");
        Ok(message.into())
    }
}

fn validate_text(text: &str) -> ApiResult<()> {
    if text.trim().is_empty() {
        debug!("Message rejected: blank text");
        return Err(ApiError::Validation("message_text must not be blank".into()));
    }
    if text_len(text) > MAX_MESSAGE_LEN {
        debug!("Message rejected: text too long");
        return Err(ApiError::Validation(format!(
            "message_text must be at most {} characters",
            MAX_MESSAGE_LEN
        )));
    }
    Ok(())
}

/// Length in UTF-16 code units, the unit existing clients validate against.
pub(crate) fn text_len(text: &str) -> usize {
    text.encode_utf16().count()
}

fn message_missing(message_id: i64) -> ApiError {
    ApiError::Validation(format!("message {} does not exist", message_id))
}

fn message_not_found(message_id: i64) -> ApiError {
    ApiError::NotFound(format!("message {}", message_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmur_db::Database;
    use murmur_db::models::MessageRow;
    use murmur_types::api::Credentials;

    struct Fixture {
        rules: MessageRules,
        alice: i64,
    }

    fn fixture() -> Fixture {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let accounts = AccountRules::new(db.clone());
        let alice = accounts
            .register(&Credentials {
                username: "alice".into(),
                password: "password1".into(),
            })
            .unwrap()
            .account_id;

        Fixture {
            rules: MessageRules::new(db, accounts),
            alice,
        }
    }

    fn new_message(posted_by: i64, text: &str) -> NewMessageRequest {
        NewMessageRequest {
            posted_by,
            message_text: text.into(),
            time_posted_epoch: Some(1669947792),
        }
    }

    #[test]
    fn create_assigns_id_and_keeps_fields() {
        let f = fixture();
        let msg = f.rules.create(&new_message(f.alice, "hello")).unwrap();

        assert_eq!(msg.posted_by, f.alice);
        assert_eq!(msg.message_text, "hello");
        assert_eq!(msg.time_posted_epoch, 1669947792);
        assert_eq!(f.rules.read(msg.message_id).unwrap(), Some(msg));
    }

    #[test]
    fn create_stamps_missing_timestamp() {
        let f = fixture();
        let before = chrono::Utc::now().timestamp();
        let msg = f
            .rules
            .create(&NewMessageRequest {
                posted_by: f.alice,
                message_text: "now".into(),
                time_posted_epoch: None,
            })
            .unwrap();

        assert!(msg.time_posted_epoch >= before);
    }

    #[test]
    fn text_length_limit_is_255_characters() {
        let f = fixture();
        assert!(f.rules.create(&new_message(f.alice, &"a".repeat(255))).is_ok());

        let err = f.rules.create(&new_message(f.alice, &"a".repeat(256))).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        // UTF-16 units, not bytes: "é" is one unit, an emoji is two
        assert!(f.rules.create(&new_message(f.alice, &"é".repeat(255))).is_ok());
        assert!(f.rules.create(&new_message(f.alice, &"😀".repeat(127))).is_ok());
        assert!(matches!(
            f.rules.create(&new_message(f.alice, &"😀".repeat(128))),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn unknown_poster_is_rejected() {
        let f = fixture();
        let err = f.rules.create(&new_message(f.alice + 100, "valid text")).unwrap_err();

        assert!(matches!(err, ApiError::Validation(_)));
        assert!(f.rules.read_all().unwrap().is_empty());
    }

    #[test]
    fn blank_text_is_rejected() {
        let f = fixture();
        for text in ["", " ", "\n\t"] {
            let err = f.rules.create(&new_message(f.alice, text)).unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)));
        }
    }

    #[test]
    fn delete_twice_reports_not_found() {
        let f = fixture();
        let msg = f.rules.create(&new_message(f.alice, "short-lived")).unwrap();

        assert_eq!(f.rules.delete(msg.message_id).unwrap(), msg);
        assert_eq!(f.rules.read(msg.message_id).unwrap(), None);
        assert!(matches!(
            f.rules.delete(msg.message_id),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn update_preserves_everything_but_text() {
        let f = fixture();
        let msg = f.rules.create(&new_message(f.alice, "original")).unwrap();

        let updated = f.rules.update(msg.message_id, "edited").unwrap();
        assert_eq!(updated.message_id, msg.message_id);
        assert_eq!(updated.posted_by, msg.posted_by);
        assert_eq!(updated.time_posted_epoch, msg.time_posted_epoch);
        assert_eq!(updated.message_text, "edited");
        assert_eq!(f.rules.read(msg.message_id).unwrap(), Some(updated));
    }

    #[test]
    fn rejected_update_leaves_text_unchanged() {
        let f = fixture();
        let msg = f.rules.create(&new_message(f.alice, "original")).unwrap();

        for text in ["   ".to_string(), "x".repeat(256)] {
            let err = f.rules.update(msg.message_id, &text).unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)));
        }
        assert_eq!(f.rules.read(msg.message_id).unwrap(), Some(msg));
    }

    #[test]
    fn update_of_missing_message_is_rejected() {
        let f = fixture();
        assert!(matches!(
            f.rules.update(404, "anything"),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn account_without_messages_reads_empty() {
        let f = fixture();
        assert!(f.rules.read_by_account(f.alice).unwrap().is_empty());
        assert!(f.rules.read_by_account(9999).unwrap().is_empty());

        let msg = f.rules.create(&new_message(f.alice, "mine")).unwrap();
        assert_eq!(f.rules.read_by_account(f.alice).unwrap(), vec![msg]);
    }

    /// Lookups still see the row, but another request deleted it before the write.
    struct VanishingStore;

    impl MessageStore for VanishingStore {
        fn insert_message(&self, _: i64, _: &str, _: i64) -> anyhow::Result<MessageRow> {
            unreachable!()
        }

        fn find_message(&self, message_id: i64) -> anyhow::Result<Option<MessageRow>> {
            Ok(Some(MessageRow {
                message_id,
                posted_by: 1,
                message_text: "stale".into(),
                time_posted_epoch: 1669947792,
            }))
        }

        fn all_messages(&self) -> anyhow::Result<Vec<MessageRow>> {
            Ok(vec![])
        }

        fn messages_by_account(&self, _: i64) -> anyhow::Result<Vec<MessageRow>> {
            Ok(vec![])
        }

        fn delete_message(&self, _: i64) -> anyhow::Result<usize> {
            Ok(0)
        }

        fn update_message_text(&self, _: i64, _: &str) -> anyhow::Result<usize> {
            Ok(0)
        }
    }

    #[test]
    fn write_that_hits_no_row_is_not_reported_as_success() {
        let accounts = AccountRules::new(Arc::new(Database::open_in_memory().unwrap()));
        let rules = MessageRules::new(Arc::new(VanishingStore), accounts);

        assert!(matches!(rules.delete(7), Err(ApiError::NotFound(_))));
        assert!(matches!(rules.update(7, "edited"), Err(ApiError::Validation(_))));
    }
}
