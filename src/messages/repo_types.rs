use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// Message joined with its author name.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Message {
    #[sqlx(rename = "message_id")]
    pub id: i64,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub user_id: i64,
    pub username: String,
    pub topic_id: i64,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub content: String,
    pub topic_id: i64,
    pub user_id: i64,
}
