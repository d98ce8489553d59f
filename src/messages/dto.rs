use serde::{Deserialize, Serialize};

/// `?topic_id=` on `GET /api/messages`.
#[derive(Debug, Default, Deserialize)]
pub struct MessagesQuery {
    pub topic_id: Option<String>,
}

/// Topic reference in a message body: text from a form, a number or text
/// from JSON.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum TopicRef {
    Number(i64),
    Text(String),
}

impl TopicRef {
    pub fn raw(&self) -> String {
        match self {
            TopicRef::Number(n) => n.to_string(),
            TopicRef::Text(s) => s.clone(),
        }
    }
}

/// Body of `POST /api/messages`.
#[derive(Debug, Default, Deserialize)]
pub struct NewMessageInput {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub topic_id: Option<TopicRef>,
}

#[derive(Debug, Serialize)]
pub struct CreatedMessage {
    pub id: i64,
    pub topic_id: i64,
}
