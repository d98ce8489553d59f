//! Askama view-models for the server-rendered pages.

use askama::Template;
use axum::response::Html;
use time::{format_description::FormatItem, macros::format_description, OffsetDateTime};

use crate::{
    error::AppError,
    messages::repo_types::Message,
    themes::{self, THEMES},
    topics::repo_types::Topic,
    votes::services::VoteState,
};

const DISPLAY_FORMAT: &[FormatItem<'static>] =
    format_description!("[day]/[month]/[year] [hour]:[minute]");

fn display_time(at: OffsetDateTime) -> String {
    at.format(DISPLAY_FORMAT).unwrap_or_default()
}

/// Renders a page, turning a template failure into a 500.
pub fn render<T: Template>(template: &T) -> Result<Html<String>, AppError> {
    Ok(Html(template.render()?))
}

/// Topic as shown in the listing and on its own page.
#[derive(Debug)]
pub struct TopicCard {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub tag_labels: Vec<String>,
    pub username: String,
    pub likes: i64,
    pub dislikes: i64,
    pub created_at_display: String,
}

impl From<Topic> for TopicCard {
    fn from(t: Topic) -> Self {
        Self {
            id: t.id,
            tag_labels: themes::labels(&t.tags),
            created_at_display: display_time(t.created_at),
            title: t.title,
            description: t.description,
            username: t.username,
            likes: t.likes,
            dislikes: t.dislikes,
        }
    }
}

#[derive(Debug)]
pub struct MessageLine {
    pub id: i64,
    pub content: String,
    pub username: String,
    pub created_at_display: String,
}

impl From<Message> for MessageLine {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            created_at_display: display_time(m.created_at),
            content: m.content,
            username: m.username,
        }
    }
}

/// Entry of the theme selector.
#[derive(Debug)]
pub struct ThemeOption {
    pub id: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

pub fn theme_options(selected: &str) -> Vec<ThemeOption> {
    THEMES
        .iter()
        .map(|t| ThemeOption {
            id: t.id,
            label: t.label,
            selected: t.id == selected,
        })
        .collect()
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    /// Empty when there is nothing to report.
    pub error: String,
}

impl RegisterTemplate {
    pub fn blank() -> Self {
        Self { error: String::new() }
    }

    pub fn with_error(message: impl Into<String>) -> Self {
        Self { error: message.into() }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub username: String,
    pub topics: Vec<TopicCard>,
    pub themes: Vec<ThemeOption>,
    pub sort_by: String,
    pub selected_tag: String,
}

#[derive(Template)]
#[template(path = "topic.html")]
pub struct TopicTemplate {
    pub username: String,
    pub topic: TopicCard,
    pub messages: Vec<MessageLine>,
    pub liked: bool,
    pub disliked: bool,
}

impl TopicTemplate {
    pub fn new(username: String, topic: Topic, messages: Vec<Message>, vote: VoteState) -> Self {
        Self {
            username,
            topic: topic.into(),
            messages: messages.into_iter().map(MessageLine::from).collect(),
            liked: vote == VoteState::Liked,
            disliked: vote == VoteState::Disliked,
        }
    }
}
