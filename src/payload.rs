use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use axum_extra::extract::Form;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::AppError;

/// A creation body accepted either as an HTML form or as JSON, picked by
/// `Content-Type`. Handlers answer a form with a redirect and JSON with JSON.
#[derive(Debug)]
pub enum Payload<T> {
    Form(T),
    Json(T),
}

impl<T> Payload<T> {
    pub fn is_json(&self) -> bool {
        matches!(self, Payload::Json(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Payload::Form(v) | Payload::Json(v) => v,
        }
    }
}

fn is_json_request(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.trim_start().starts_with("application/json"))
        .unwrap_or(false)
}

#[async_trait]
impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_json_request(&req) {
            let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
                warn!(error = %e, "json body rejected");
                AppError::BadRequest(e.body_text())
            })?;
            Ok(Payload::Json(value))
        } else {
            let Form(value) = Form::<T>::from_request(req, state).await.map_err(|e| {
                warn!(error = %e, "form body rejected");
                AppError::BadRequest(e.to_string())
            })?;
            Ok(Payload::Form(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Input {
        title: String,
        #[serde(default)]
        tags: Vec<String>,
    }

    #[tokio::test]
    async fn reads_repeated_form_keys() {
        let req = http::Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("title=Hello&tags=sport&tags=musique"))
            .unwrap();
        let payload = Payload::<Input>::from_request(req, &()).await.unwrap();
        assert!(!payload.is_json());
        assert_eq!(
            payload.into_inner(),
            Input { title: "Hello".into(), tags: vec!["sport".into(), "musique".into()] }
        );
    }

    #[tokio::test]
    async fn reads_json_body() {
        let req = http::Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .body(Body::from(r#"{"title":"Hello","tags":["art"]}"#))
            .unwrap();
        let payload = Payload::<Input>::from_request(req, &()).await.unwrap();
        assert!(payload.is_json());
        assert_eq!(payload.into_inner().tags, vec!["art"]);
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let req = http::Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{"))
            .unwrap();
        let err = Payload::<Input>::from_request(req, &()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
