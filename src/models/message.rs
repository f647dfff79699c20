//! Direct message models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::timestamp;
use super::user::UserRef;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: String,
    #[serde(with = "timestamp")]
    pub sent_at: DateTime<Utc>,
    #[serde(default, alias = "read")]
    pub is_read: bool,
}

impl Message {
    /// The endpoint of this message that is not `me`
    pub fn other_party(&self, me: i64) -> i64 {
        if self.sender_id == me {
            self.receiver_id
        } else {
            self.sender_id
        }
    }

    pub fn is_unread_for(&self, me: i64) -> bool {
        self.receiver_id == me && !self.is_read
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub receiver_id: i64,
    pub content: String,
}

/// Conversation with one counterparty, derived on the client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageThread {
    /// Counterparty user id
    pub id: i64,
    pub other_user: UserRef,
    /// Ascending by `sent_at`
    pub messages: Vec<Message>,
    pub last_message: Message,
    pub unread_count: usize,
}

/// Remaining message sends for a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageAuthority {
    pub user_id: i64,
    pub count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_party() {
        let msg: Message = serde_json::from_str(
            r#"{"id":1,"senderId":2,"receiverId":1,"content":"hi","sentAt":"2024-01-01T00:00:00","isRead":false}"#,
        )
        .unwrap();
        assert_eq!(msg.other_party(1), 2);
        assert_eq!(msg.other_party(2), 1);
        assert!(msg.is_unread_for(1));
        assert!(!msg.is_unread_for(2));
    }
}
