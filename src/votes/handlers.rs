use axum::{
    extract::State,
    http::{header::REFERER, HeaderMap},
    response::Redirect,
    routing::post,
    Form, Router,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::{
    auth::extractors::AuthUser,
    error::AppError,
    state::AppState,
    topics::services::parse_topic_id,
    votes::services::VoteAction,
};

#[derive(Debug, Default, Deserialize)]
pub struct VoteForm {
    pub id: Option<String>,
}

pub fn vote_routes() -> Router<AppState> {
    Router::new()
        .route("/api/topic/like", post(like_topic))
        .route("/api/topic/dislike", post(dislike_topic))
}

pub async fn like_topic(
    state: State<AppState>,
    user: AuthUser,
    headers: HeaderMap,
    form: Form<VoteForm>,
) -> Result<Redirect, AppError> {
    vote(state, user, headers, form, VoteAction::Like).await
}

pub async fn dislike_topic(
    state: State<AppState>,
    user: AuthUser,
    headers: HeaderMap,
    form: Form<VoteForm>,
) -> Result<Redirect, AppError> {
    vote(state, user, headers, form, VoteAction::Dislike).await
}

#[instrument(skip(state, user, headers), fields(user_id = user.id))]
async fn vote(
    State(state): State<AppState>,
    user: AuthUser,
    headers: HeaderMap,
    Form(form): Form<VoteForm>,
    action: VoteAction,
) -> Result<Redirect, AppError> {
    let topic_id = parse_topic_id(form.id.as_deref())?;
    if !state.store.topic_exists(topic_id).await? {
        warn!(topic_id, "vote on unknown topic");
        return Err(AppError::NotFound("Topic not found".into()));
    }

    let outcome = state.store.toggle_vote(user.id, topic_id, action).await?;
    info!(topic_id, ?outcome, "vote recorded");

    Ok(Redirect::to(&back_to(&headers, topic_id)))
}

/// The referring page, or the topic itself when the browser sent none.
fn back_to(headers: &HeaderMap, topic_id: i64) -> String {
    headers
        .get(REFERER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| format!("/topic?id={topic_id}"))
}
