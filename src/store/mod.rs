use async_trait::async_trait;

use crate::{
    auth::repo_types::{NewUser, User},
    messages::repo_types::{Message, NewMessage},
    topics::repo_types::{NewTopic, Topic, TopicFilter},
    votes::services::{VoteAction, VoteState},
};

#[cfg(test)]
mod memory;
mod postgres;

#[cfg(test)]
pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Everything the handlers need from persistence. Shared across requests
/// behind an `Arc`, so implementations must be safe for concurrent use.
#[async_trait]
pub trait ForumStore: Send + Sync {
    async fn username_or_email_taken(&self, username: &str, mail: &str) -> anyhow::Result<bool>;
    async fn create_user(&self, user: NewUser) -> anyhow::Result<i64>;
    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    async fn touch_last_connection(&self, user_id: i64) -> anyhow::Result<()>;

    async fn list_topics(&self, filter: &TopicFilter) -> anyhow::Result<Vec<Topic>>;
    async fn topic_exists(&self, topic_id: i64) -> anyhow::Result<bool>;
    async fn get_topic(&self, topic_id: i64) -> anyhow::Result<Option<Topic>>;
    /// Inserts the topic and bumps the author's topic counter as one unit.
    async fn create_topic(&self, topic: NewTopic) -> anyhow::Result<i64>;

    async fn list_messages(&self, topic_id: i64) -> anyhow::Result<Vec<Message>>;
    async fn create_message(&self, message: NewMessage) -> anyhow::Result<i64>;

    async fn vote_of(&self, user_id: i64, topic_id: i64) -> anyhow::Result<VoteState>;
    /// Applies one click atomically and returns the resulting vote.
    async fn toggle_vote(
        &self,
        user_id: i64,
        topic_id: i64,
        action: VoteAction,
    ) -> anyhow::Result<VoteState>;
}
