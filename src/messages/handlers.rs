use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    error::AppError,
    messages::{
        dto::{CreatedMessage, MessagesQuery, NewMessageInput},
        repo_types::Message,
        services::post_message,
    },
    payload::Payload,
    state::AppState,
    topics::services::parse_topic_id,
};

pub fn message_routes() -> Router<AppState> {
    Router::new().route("/api/messages", get(list_messages).post(create_message))
}

#[instrument(skip(state, _user))]
pub async fn list_messages(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(q): Query<MessagesQuery>,
) -> Result<Json<Vec<Message>>, AppError> {
    let topic_id = parse_topic_id(q.topic_id.as_deref())?;
    Ok(Json(state.store.list_messages(topic_id).await?))
}

/// Form posts go back to the topic page; JSON gets the new message id.
#[instrument(skip(state, user, payload), fields(user_id = user.id))]
pub async fn create_message(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Payload<NewMessageInput>,
) -> Result<Response, AppError> {
    let json = payload.is_json();
    let (id, topic_id) = post_message(state.store.as_ref(), &user, payload.into_inner()).await?;
    let location = format!("/topic?id={topic_id}");
    if !json {
        return Ok(Redirect::to(&location).into_response());
    }
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(CreatedMessage { id, topic_id }),
    )
        .into_response())
}
