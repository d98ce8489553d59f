use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use time::OffsetDateTime;

use super::ForumStore;
use crate::{
    auth::repo_types::{NewUser, User, DEFAULT_ROLE_ID},
    messages::repo_types::{Message, NewMessage},
    topics::{
        repo_types::{NewTopic, SortOrder, Topic, TopicFilter},
        services::tag_matches,
    },
    votes::services::{transition, VoteAction, VoteChange, VoteState},
};

struct TopicRow {
    id: i64,
    title: String,
    description: String,
    tags: String,
    user_id: i64,
    state_id: i64,
    created_at: OffsetDateTime,
}

struct MessageRow {
    id: i64,
    content: String,
    created_at: OffsetDateTime,
    user_id: i64,
    topic_id: i64,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    topics: Vec<TopicRow>,
    messages: Vec<MessageRow>,
    votes: HashMap<(i64, i64), bool>,
}

impl Tables {
    fn username(&self, user_id: i64) -> anyhow::Result<String> {
        self.users
            .iter()
            .find(|u| u.user_id == user_id)
            .map(|u| u.username.clone())
            .ok_or_else(|| anyhow::anyhow!("user {user_id} not found"))
    }

    fn view(&self, row: &TopicRow) -> anyhow::Result<Topic> {
        let count = |liked: bool| {
            self.votes
                .iter()
                .filter(|((_, t), l)| *t == row.id && **l == liked)
                .count() as i64
        };
        Ok(Topic {
            id: row.id,
            title: row.title.clone(),
            description: row.description.clone(),
            tags: row.tags.clone(),
            user_id: row.user_id,
            username: self.username(row.user_id)?,
            state_id: row.state_id,
            created_at: row.created_at,
            likes: count(true),
            dislikes: count(false),
        })
    }
}

/// In-process store with the same observable behaviour as [`super::PgStore`].
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    broken_last_connection: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> anyhow::Result<std::sync::MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store poisoned"))
    }

    /// Makes every later `touch_last_connection` call fail.
    pub fn break_last_connection(&self) {
        self.broken_last_connection.store(true, Ordering::SeqCst);
    }

    pub fn vote_rows(&self, user_id: i64, topic_id: i64) -> usize {
        self.lock()
            .map(|t| usize::from(t.votes.contains_key(&(user_id, topic_id))))
            .unwrap_or(0)
    }

    pub fn user(&self, username: &str) -> Option<User> {
        self.lock()
            .ok()?
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned()
    }
}

#[async_trait]
impl ForumStore for MemoryStore {
    async fn username_or_email_taken(&self, username: &str, mail: &str) -> anyhow::Result<bool> {
        let t = self.lock()?;
        Ok(t.users.iter().any(|u| u.username == username || u.mail == mail))
    }

    async fn create_user(&self, user: NewUser) -> anyhow::Result<i64> {
        let mut t = self.lock()?;
        if t.users
            .iter()
            .any(|u| u.username == user.username || u.mail == user.mail)
        {
            anyhow::bail!("unique violation on user");
        }
        let id = t.users.len() as i64 + 1;
        t.users.push(User {
            user_id: id,
            username: user.username,
            mail: user.mail,
            password: user.password_hash,
            role_id: DEFAULT_ROLE_ID,
            topic_nbr: 0,
            last_connection: None,
        });
        Ok(id)
    }

    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let t = self.lock()?;
        Ok(t.users.iter().find(|u| u.username == username).cloned())
    }

    async fn touch_last_connection(&self, user_id: i64) -> anyhow::Result<()> {
        if self.broken_last_connection.load(Ordering::SeqCst) {
            anyhow::bail!("update last_connection: connection reset");
        }
        let mut t = self.lock()?;
        if let Some(u) = t.users.iter_mut().find(|u| u.user_id == user_id) {
            u.last_connection = Some(OffsetDateTime::now_utc());
        }
        Ok(())
    }

    async fn list_topics(&self, filter: &TopicFilter) -> anyhow::Result<Vec<Topic>> {
        let t = self.lock()?;
        let mut topics = t
            .topics
            .iter()
            .filter(|row| {
                filter
                    .tag
                    .as_deref()
                    .map_or(true, |tag| tag_matches(&row.tags, tag))
            })
            .map(|row| t.view(row))
            .collect::<anyhow::Result<Vec<_>>>()?;
        let newest_first = |a: &Topic, b: &Topic| (b.created_at, b.id).cmp(&(a.created_at, a.id));
        match filter.sort {
            SortOrder::Recent => topics.sort_by(newest_first),
            SortOrder::Likes => {
                topics.sort_by(|a, b| b.likes.cmp(&a.likes).then_with(|| newest_first(a, b)))
            }
            SortOrder::Dislikes => topics
                .sort_by(|a, b| b.dislikes.cmp(&a.dislikes).then_with(|| newest_first(a, b))),
        }
        Ok(topics)
    }

    async fn topic_exists(&self, topic_id: i64) -> anyhow::Result<bool> {
        Ok(self.lock()?.topics.iter().any(|r| r.id == topic_id))
    }

    async fn get_topic(&self, topic_id: i64) -> anyhow::Result<Option<Topic>> {
        let t = self.lock()?;
        t.topics
            .iter()
            .find(|r| r.id == topic_id)
            .map(|r| t.view(r))
            .transpose()
    }

    async fn create_topic(&self, topic: NewTopic) -> anyhow::Result<i64> {
        let mut t = self.lock()?;
        let author = t
            .users
            .iter_mut()
            .find(|u| u.user_id == topic.user_id)
            .ok_or_else(|| anyhow::anyhow!("foreign key violation on topic.user_id"))?;
        author.topic_nbr += 1;
        let id = t.topics.len() as i64 + 1;
        t.topics.push(TopicRow {
            id,
            title: topic.title,
            description: topic.description,
            tags: topic.tags,
            user_id: topic.user_id,
            state_id: topic.state_id,
            created_at: OffsetDateTime::now_utc(),
        });
        Ok(id)
    }

    async fn list_messages(&self, topic_id: i64) -> anyhow::Result<Vec<Message>> {
        let t = self.lock()?;
        let mut rows = t
            .messages
            .iter()
            .filter(|m| m.topic_id == topic_id)
            .map(|m| {
                Ok(Message {
                    id: m.id,
                    content: m.content.clone(),
                    created_at: m.created_at,
                    user_id: m.user_id,
                    username: t.username(m.user_id)?,
                    topic_id: m.topic_id,
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        rows.sort_by_key(|m| (m.created_at, m.id));
        Ok(rows)
    }

    async fn create_message(&self, message: NewMessage) -> anyhow::Result<i64> {
        let mut t = self.lock()?;
        if !t.topics.iter().any(|r| r.id == message.topic_id) {
            anyhow::bail!("foreign key violation on message.topic_id");
        }
        let id = t.messages.len() as i64 + 1;
        t.messages.push(MessageRow {
            id,
            content: message.content,
            created_at: OffsetDateTime::now_utc(),
            user_id: message.user_id,
            topic_id: message.topic_id,
        });
        Ok(id)
    }

    async fn vote_of(&self, user_id: i64, topic_id: i64) -> anyhow::Result<VoteState> {
        let t = self.lock()?;
        Ok(VoteState::from_row(t.votes.get(&(user_id, topic_id)).copied()))
    }

    async fn toggle_vote(
        &self,
        user_id: i64,
        topic_id: i64,
        action: VoteAction,
    ) -> anyhow::Result<VoteState> {
        let mut t = self.lock()?;
        let key = (user_id, topic_id);
        let change = transition(VoteState::from_row(t.votes.get(&key).copied()), action);
        match change {
            VoteChange::Insert { liked } | VoteChange::Update { liked } => {
                t.votes.insert(key, liked);
            }
            VoteChange::Delete => {
                t.votes.remove(&key);
            }
        }
        Ok(change.outcome())
    }
}
