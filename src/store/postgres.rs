use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::ForumStore;
use crate::{
    auth::repo_types::{NewUser, User, DEFAULT_ROLE_ID},
    messages::repo_types::{Message, NewMessage},
    topics::{
        repo_types::{NewTopic, SortOrder, Topic, TopicFilter},
        services::tag_patterns,
    },
    votes::services::{transition, VoteAction, VoteChange, VoteState},
};

const TOPIC_SELECT: &str = r#"
    SELECT t.topic_id, t.title, t.description, t.tags, t.user_id, u.username, t.state_id,
           t.created_at,
           (SELECT COUNT(*) FROM topic_user_like l WHERE l.topic_id = t.topic_id AND l.liked = TRUE) AS likes,
           (SELECT COUNT(*) FROM topic_user_like l WHERE l.topic_id = t.topic_id AND l.liked = FALSE) AS dislikes
    FROM topic t
    JOIN "user" u ON t.user_id = u.user_id
"#;

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ForumStore for PgStore {
    async fn username_or_email_taken(&self, username: &str, mail: &str) -> anyhow::Result<bool> {
        let taken: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM "user" WHERE username = $1 OR mail = $2)"#,
        )
        .bind(username)
        .bind(mail)
        .fetch_one(&self.db)
        .await
        .context("check username/mail")?;
        Ok(taken)
    }

    async fn create_user(&self, user: NewUser) -> anyhow::Result<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO "user" (username, mail, password, role_id)
            VALUES ($1, $2, $3, $4)
            RETURNING user_id
            "#,
        )
        .bind(&user.username)
        .bind(&user.mail)
        .bind(&user.password_hash)
        .bind(DEFAULT_ROLE_ID)
        .fetch_one(&self.db)
        .await
        .context("insert user")?;
        Ok(id)
    }

    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, username, mail, password, role_id, topic_nbr, last_connection
            FROM "user"
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await
        .context("find user by username")?;
        Ok(user)
    }

    async fn touch_last_connection(&self, user_id: i64) -> anyhow::Result<()> {
        sqlx::query(r#"UPDATE "user" SET last_connection = NOW() WHERE user_id = $1"#)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("update last_connection")?;
        Ok(())
    }

    async fn list_topics(&self, filter: &TopicFilter) -> anyhow::Result<Vec<Topic>> {
        let mut sql = String::from(TOPIC_SELECT);
        if filter.tag.is_some() {
            sql.push_str(
                " WHERE t.tags LIKE $1 OR t.tags LIKE $2 OR t.tags LIKE $3 OR t.tags LIKE $4",
            );
        }
        sql.push_str(match filter.sort {
            SortOrder::Likes => " ORDER BY likes DESC, t.created_at DESC",
            SortOrder::Dislikes => " ORDER BY dislikes DESC, t.created_at DESC",
            SortOrder::Recent => " ORDER BY t.created_at DESC, t.topic_id DESC",
        });

        let mut query = sqlx::query_as::<_, Topic>(&sql);
        if let Some(tag) = &filter.tag {
            for pattern in tag_patterns(tag) {
                query = query.bind(pattern);
            }
        }
        let topics = query.fetch_all(&self.db).await.context("list topics")?;
        debug!(count = topics.len(), sort = ?filter.sort, tag = ?filter.tag, "topics listed");
        Ok(topics)
    }

    async fn topic_exists(&self, topic_id: i64) -> anyhow::Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM topic WHERE topic_id = $1)")
                .bind(topic_id)
                .fetch_one(&self.db)
                .await
                .context("check topic exists")?;
        Ok(exists)
    }

    async fn get_topic(&self, topic_id: i64) -> anyhow::Result<Option<Topic>> {
        let sql = format!("{TOPIC_SELECT} WHERE t.topic_id = $1");
        let topic = sqlx::query_as::<_, Topic>(&sql)
            .bind(topic_id)
            .fetch_optional(&self.db)
            .await
            .context("get topic")?;
        Ok(topic)
    }

    async fn create_topic(&self, topic: NewTopic) -> anyhow::Result<i64> {
        let mut tx = self.db.begin().await.context("begin tx")?;
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO topic (title, description, tags, user_id, state_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING topic_id
            "#,
        )
        .bind(&topic.title)
        .bind(&topic.description)
        .bind(&topic.tags)
        .bind(topic.user_id)
        .bind(topic.state_id)
        .fetch_one(&mut *tx)
        .await
        .context("insert topic")?;

        sqlx::query(r#"UPDATE "user" SET topic_nbr = topic_nbr + 1 WHERE user_id = $1"#)
            .bind(topic.user_id)
            .execute(&mut *tx)
            .await
            .context("increment topic_nbr")?;

        tx.commit().await.context("commit tx")?;
        Ok(id)
    }

    async fn list_messages(&self, topic_id: i64) -> anyhow::Result<Vec<Message>> {
        let rows = sqlx::query_as::<_, Message>(
            r#"
            SELECT m.message_id, m.content, m.created_at, m.user_id, u.username, m.topic_id
            FROM message m
            JOIN "user" u ON m.user_id = u.user_id
            WHERE m.topic_id = $1
            ORDER BY m.created_at ASC, m.message_id ASC
            "#,
        )
        .bind(topic_id)
        .fetch_all(&self.db)
        .await
        .context("list messages")?;
        Ok(rows)
    }

    async fn create_message(&self, message: NewMessage) -> anyhow::Result<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO message (content, topic_id, user_id)
            VALUES ($1, $2, $3)
            RETURNING message_id
            "#,
        )
        .bind(&message.content)
        .bind(message.topic_id)
        .bind(message.user_id)
        .fetch_one(&self.db)
        .await
        .context("insert message")?;
        Ok(id)
    }

    async fn vote_of(&self, user_id: i64, topic_id: i64) -> anyhow::Result<VoteState> {
        let liked: Option<bool> = sqlx::query_scalar(
            "SELECT liked FROM topic_user_like WHERE user_id = $1 AND topic_id = $2",
        )
        .bind(user_id)
        .bind(topic_id)
        .fetch_optional(&self.db)
        .await
        .context("read vote")?;
        Ok(VoteState::from_row(liked))
    }

    async fn toggle_vote(
        &self,
        user_id: i64,
        topic_id: i64,
        action: VoteAction,
    ) -> anyhow::Result<VoteState> {
        let mut tx = self.db.begin().await.context("begin tx")?;
        // A missing row cannot be locked: when a concurrent first vote wins the
        // insert, the row is read again (now locked) and the click re-applied.
        let mut attempts = 0;
        let change = loop {
            attempts += 1;
            let current: Option<bool> = sqlx::query_scalar(
                "SELECT liked FROM topic_user_like WHERE user_id = $1 AND topic_id = $2 FOR UPDATE",
            )
            .bind(user_id)
            .bind(topic_id)
            .fetch_optional(&mut *tx)
            .await
            .context("lock vote")?;

            let change = transition(VoteState::from_row(current), action);
            let written = match change {
                VoteChange::Insert { liked } => sqlx::query(
                    r#"
                    INSERT INTO topic_user_like (user_id, topic_id, liked) VALUES ($1, $2, $3)
                    ON CONFLICT (user_id, topic_id) DO NOTHING
                    "#,
                )
                .bind(user_id)
                .bind(topic_id)
                .bind(liked),
                VoteChange::Update { liked } => sqlx::query(
                    "UPDATE topic_user_like SET liked = $3 WHERE user_id = $1 AND topic_id = $2",
                )
                .bind(user_id)
                .bind(topic_id)
                .bind(liked),
                VoteChange::Delete => {
                    sqlx::query("DELETE FROM topic_user_like WHERE user_id = $1 AND topic_id = $2")
                        .bind(user_id)
                        .bind(topic_id)
                }
            }
            .execute(&mut *tx)
            .await
            .context("write vote")?
            .rows_affected();

            if written > 0 || !matches!(change, VoteChange::Insert { .. }) {
                break change;
            }
            if attempts >= 2 {
                anyhow::bail!("vote row for user {user_id} on topic {topic_id} kept changing");
            }
            debug!(user_id, topic_id, "concurrent first vote, retrying");
        };
        tx.commit().await.context("commit tx")?;

        debug!(user_id, topic_id, ?change, "vote toggled");
        Ok(change.outcome())
    }
}
