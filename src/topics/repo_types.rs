use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// State given to every new topic.
pub const OPEN_STATE_ID: i64 = 1;

/// Topic joined with its author name and aggregated vote counts.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Topic {
    #[sqlx(rename = "topic_id")]
    pub id: i64,
    pub title: String,
    pub description: String,
    pub tags: String,
    pub user_id: i64,
    pub username: String,
    pub state_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub likes: i64,
    pub dislikes: i64,
}

#[derive(Debug, Clone)]
pub struct NewTopic {
    pub title: String,
    pub description: String,
    pub tags: String,
    pub user_id: i64,
    pub state_id: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Recent,
    Likes,
    Dislikes,
}

impl SortOrder {
    /// `likes` and `dislikes` select a count ordering; anything else falls
    /// back to newest first.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("likes") => SortOrder::Likes,
            Some("dislikes") => SortOrder::Dislikes,
            _ => SortOrder::Recent,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TopicFilter {
    pub sort: SortOrder,
    pub tag: Option<String>,
}
