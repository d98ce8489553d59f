use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::{AuthUser, PageUser},
    error::AppError,
    payload::Payload,
    state::AppState,
    templates::{render, theme_options, IndexTemplate, TopicCard, TopicTemplate},
    topics::{
        dto::{ListQuery, NewTopicInput, TopicDetails, TopicIdQuery},
        repo_types::Topic,
        services::{create_topic, load_topic, parse_topic_id},
    },
};

pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/index", get(index_page))
        .route("/topic", get(topic_page))
        .route("/topics", post(create_topic_handler))
}

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/topic", get(get_topic))
        .route("/api/topics", get(list_topics))
}

#[instrument(skip(state, user), fields(user_id = user.0.id))]
pub async fn index_page(
    State(state): State<AppState>,
    user: PageUser,
    Query(q): Query<ListQuery>,
) -> Result<Html<String>, AppError> {
    let filter = q.filter();
    let topics = state.store.list_topics(&filter).await?;
    let selected_tag = filter.tag.unwrap_or_default();
    render(&IndexTemplate {
        username: user.0.username,
        topics: topics.into_iter().map(TopicCard::from).collect(),
        themes: theme_options(&selected_tag),
        sort_by: q.sort.unwrap_or_default(),
        selected_tag,
    })
}

#[instrument(skip(state, user), fields(user_id = user.0.id))]
pub async fn topic_page(
    State(state): State<AppState>,
    user: PageUser,
    Query(q): Query<TopicIdQuery>,
) -> Result<Html<String>, AppError> {
    let topic_id = parse_topic_id(q.id.as_deref())?;
    let topic = load_topic(state.store.as_ref(), topic_id).await?;
    let messages = state.store.list_messages(topic_id).await?;
    let vote = state.store.vote_of(user.0.id, topic_id).await?;
    render(&TopicTemplate::new(user.0.username, topic, messages, vote))
}

/// Form posts are redirected to the listing; JSON gets the created topic.
#[instrument(skip(state, user, payload), fields(user_id = user.0.id))]
pub async fn create_topic_handler(
    State(state): State<AppState>,
    user: PageUser,
    payload: Payload<NewTopicInput>,
) -> Result<Response, AppError> {
    let json = payload.is_json();
    let topic = create_topic(state.store.as_ref(), &user.0, payload.into_inner()).await?;
    if !json {
        return Ok(Redirect::to("/index").into_response());
    }
    let location = format!("/api/topic?id={}", topic.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(topic),
    )
        .into_response())
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_topic(
    State(state): State<AppState>,
    user: AuthUser,
    Query(q): Query<TopicIdQuery>,
) -> Result<Json<TopicDetails>, AppError> {
    let topic_id = parse_topic_id(q.id.as_deref())?;
    let topic = load_topic(state.store.as_ref(), topic_id).await?;
    let vote = state.store.vote_of(user.id, topic_id).await?;
    Ok(Json(TopicDetails {
        topic,
        user_like: vote.as_row(),
    }))
}

#[instrument(skip(state, _user))]
pub async fn list_topics(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Topic>>, AppError> {
    Ok(Json(state.store.list_topics(&q.filter()).await?))
}
