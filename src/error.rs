//! Request-level error type shared by the JSON and HTML handlers.
//!
//! Client-facing variants expose their message as is. `Internal` keeps the
//! detail in the server logs and answers with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::BadRequest(m) | AppError::Unauthorized(m) | AppError::NotFound(m) => m,
            AppError::Internal(m) => {
                error!(message = %m, "internal server error");
                "Erreur interne du serveur".to_owned()
            }
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Internal(format!("{e:#}"))
    }
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self {
        AppError::Internal(format!("template render: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn internal_errors_hide_their_detail() {
        let res = AppError::Internal("connection refused on 10.0.0.3".into()).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!body.contains("10.0.0.3"));
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json, json!({ "message": "Erreur interne du serveur" }));
    }

    #[test]
    fn client_errors_map_to_their_status() {
        assert_eq!(AppError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn anyhow_errors_become_internal() {
        let err: AppError = anyhow::anyhow!("boom").context("insert topic").into();
        match err {
            AppError::Internal(m) => assert!(m.contains("insert topic") && m.contains("boom")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
