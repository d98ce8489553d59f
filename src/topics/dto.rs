use serde::{Deserialize, Serialize};

use crate::topics::repo_types::{SortOrder, Topic, TopicFilter};

/// `?sort=likes|dislikes&tags=<theme id>` on the listings.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub sort: Option<String>,
    pub tags: Option<String>,
}

impl ListQuery {
    pub fn filter(&self) -> TopicFilter {
        TopicFilter {
            sort: SortOrder::from_param(self.sort.as_deref()),
            tag: self
                .tags
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_owned),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TopicIdQuery {
    pub id: Option<String>,
}

/// Body of `POST /topics`, as a form (repeated `tags`) or as JSON.
#[derive(Debug, Default, Deserialize)]
pub struct NewTopicInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Topic as served by `GET /api/topic`.
#[derive(Debug, Serialize)]
pub struct TopicDetails {
    #[serde(flatten)]
    pub topic: Topic,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_like: Option<bool>,
}
