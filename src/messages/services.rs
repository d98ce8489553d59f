use tracing::info;

use crate::{
    auth::extractors::AuthUser,
    error::AppError,
    messages::{dto::NewMessageInput, repo_types::NewMessage},
    store::ForumStore,
    topics::services::parse_topic_id,
};

/// The one way messages get posted, whatever the request format.
/// Returns the new message id and the topic it belongs to.
pub async fn post_message(
    store: &dyn ForumStore,
    author: &AuthUser,
    input: NewMessageInput,
) -> Result<(i64, i64), AppError> {
    let content = input.content.trim();
    let raw_topic = input.topic_id.as_ref().map(|r| r.raw());
    if content.is_empty() || raw_topic.as_deref().map_or(true, |r| r.trim().is_empty()) {
        return Err(AppError::BadRequest(
            "Content and topic ID are required".into(),
        ));
    }
    let topic_id = parse_topic_id(raw_topic.as_deref())?;
    if !store.topic_exists(topic_id).await? {
        return Err(AppError::NotFound("Topic not found".into()));
    }

    let id = store
        .create_message(NewMessage {
            content: content.to_owned(),
            topic_id,
            user_id: author.id,
        })
        .await?;
    info!(message_id = id, topic_id, user_id = author.id, "message created");
    Ok((id, topic_id))
}
