use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::services::live_quiz::QuizError;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    detail: String,
}

#[derive(Debug)]
pub(crate) enum ApiError {
    Unauthorized(&'static str),
    Forbidden(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    /// Log the underlying error with context and return an `Internal` variant.
    pub(crate) fn internal(err: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal(context.to_string())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<QuizError> for ApiError {
    fn from(err: QuizError) -> Self {
        let detail = err.to_string();
        match err {
            QuizError::NotFound(_) => ApiError::NotFound(detail),
            QuizError::NotAuthorized(_) => ApiError::Forbidden(detail),
            QuizError::InvalidIndex(_) | QuizError::Invalid(_) => ApiError::BadRequest(detail),
            QuizError::Full { .. }
            | QuizError::AlreadyStopped
            | QuizError::InvalidState { .. }
            | QuizError::QuestionClosed { .. }
            | QuizError::AlreadyAnswered(_)
            | QuizError::Conflict => ApiError::Conflict(detail),
            QuizError::Storage(source) => ApiError::internal(source, "Quiz storage failure"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            ApiError::Unauthorized(message) => {
                let mut response = (
                    status,
                    Json(ErrorResponse { status: status.as_u16(), detail: message.to_string() }),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                return response;
            }
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Internal server error");
                message
            }
            ApiError::Forbidden(message)
            | ApiError::BadRequest(message)
            | ApiError::NotFound(message)
            | ApiError::Conflict(message) => message,
        };

        (status, Json(ErrorResponse { status: status.as_u16(), detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::types::LiveQuizStatus;

    fn status_of(err: QuizError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn quiz_errors_map_to_http_status() {
        assert_eq!(status_of(QuizError::NotFound("quiz")), StatusCode::NOT_FOUND);
        assert_eq!(status_of(QuizError::NotAuthorized("start")), StatusCode::FORBIDDEN);
        assert_eq!(status_of(QuizError::Full { capacity: 2 }), StatusCode::CONFLICT);
        assert_eq!(status_of(QuizError::InvalidIndex("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(QuizError::AlreadyStopped), StatusCode::CONFLICT);
        assert_eq!(
            status_of(QuizError::InvalidState { status: LiveQuizStatus::Paused, action: "advance" }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(QuizError::QuestionClosed { requested: 1, current: 0 }),
            StatusCode::CONFLICT
        );
        assert_eq!(status_of(QuizError::AlreadyAnswered(0)), StatusCode::CONFLICT);
        assert_eq!(status_of(QuizError::Invalid("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(QuizError::Conflict), StatusCode::CONFLICT);
        assert_eq!(
            status_of(QuizError::Storage(sqlx::Error::PoolTimedOut)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unauthorized_sets_bearer_challenge() {
        let response = ApiError::Unauthorized("Invalid authentication credentials").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }
}
