use tracing::{info, warn};

use crate::{
    auth::extractors::AuthUser,
    error::AppError,
    store::ForumStore,
    themes,
    topics::{
        dto::NewTopicInput,
        repo_types::{NewTopic, Topic, OPEN_STATE_ID},
    },
};

/// Separator between entries of a stored tag list.
pub const TAG_SEPARATOR: &str = ", ";

/// `LIKE` patterns approximating "tag is one element of the comma list":
/// leading, interior, trailing and sole element. A tag is matched literally.
pub fn tag_patterns(tag: &str) -> [String; 4] {
    let tag = escape_like(tag);
    [
        format!("{tag}, %"),
        format!("%, {tag}, %"),
        format!("%, {tag}"),
        tag,
    ]
}

/// In-process twin of [`tag_patterns`].
pub fn tag_matches(tags: &str, tag: &str) -> bool {
    tags == tag
        || tags.starts_with(&format!("{tag}{TAG_SEPARATOR}"))
        || tags.contains(&format!("{TAG_SEPARATOR}{tag}{TAG_SEPARATOR}"))
        || tags.ends_with(&format!("{TAG_SEPARATOR}{tag}"))
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Joins selected theme ids into the stored tag list, dropping blanks and
/// repeats while keeping the selection order.
pub fn join_tags(tags: &[String]) -> String {
    let mut seen: Vec<&str> = Vec::with_capacity(tags.len());
    for tag in tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen.join(TAG_SEPARATOR)
}

/// Parses a topic id coming from a query string or a form field.
pub fn parse_topic_id(raw: Option<&str>) -> Result<i64, AppError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Topic ID is required".into()))?;
    raw.parse::<i64>()
        .map_err(|_| AppError::BadRequest("Invalid topic ID".into()))
}

/// Loads a topic after an explicit existence check.
pub async fn load_topic(store: &dyn ForumStore, topic_id: i64) -> Result<Topic, AppError> {
    if !store.topic_exists(topic_id).await? {
        warn!(topic_id, "topic does not exist");
        return Err(AppError::NotFound("Topic not found".into()));
    }
    store
        .get_topic(topic_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Topic not found".into()))
}

/// The one way topics get created, whatever the request format.
pub async fn create_topic(
    store: &dyn ForumStore,
    author: &AuthUser,
    input: NewTopicInput,
) -> Result<Topic, AppError> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(AppError::BadRequest("Le titre est requis".into()));
    }
    if let Some(unknown) = input
        .tags
        .iter()
        .map(|t| t.trim())
        .find(|t| !t.is_empty() && themes::find(t).is_none())
    {
        return Err(AppError::BadRequest(format!("Thème inconnu : {unknown}")));
    }

    let new_topic = NewTopic {
        title: title.to_owned(),
        description: input.description.trim().to_owned(),
        tags: join_tags(&input.tags),
        user_id: author.id,
        state_id: OPEN_STATE_ID,
    };
    let id = store.create_topic(new_topic).await?;
    info!(topic_id = id, user_id = author.id, "topic created");
    load_topic(store, id).await
}
