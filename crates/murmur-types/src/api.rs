use serde::Deserialize;

// -- Accounts --

/// Body of `POST /register` and `POST /login`.
///
/// Extra fields such as a client-sent `account_id` are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

// -- Messages --

#[derive(Debug, Clone, Deserialize)]
pub struct NewMessageRequest {
    pub posted_by: i64,
    pub message_text: String,
    /// Stamped with the current time when absent.
    #[serde(default)]
    pub time_posted_epoch: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMessageRequest {
    pub message_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_ignore_account_id() {
        let creds: Credentials =
            serde_json::from_str(r#"{"account_id":7,"username":"alice","password":"pw12"}"#)
                .unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "pw12");
    }

    #[test]
    fn new_message_timestamp_is_optional() {
        let req: NewMessageRequest =
            serde_json::from_str(r#"{"posted_by":1,"message_text":"hi"}"#).unwrap();
        assert_eq!(req.time_posted_epoch, None);

        let req: NewMessageRequest = serde_json::from_str(
            r#"{"posted_by":1,"message_text":"hi","time_posted_epoch":1669947792}"#,
        )
        .unwrap();
        assert_eq!(req.time_posted_epoch, Some(1669947792));
    }

    #[test]
    fn update_ignores_extra_fields() {
        let req: UpdateMessageRequest = serde_json::from_str(
            r#"{"message_id":3,"posted_by":1,"message_text":"edited","time_posted_epoch":0}"#,
        )
        .unwrap();
        assert_eq!(req.message_text, "edited");
    }
}
