//! HTTP Error Handling
//!
//! TTS 服务返回纯文本错误，Chat 服务返回 `{error, model?}` JSON

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ApplicationError;

fn status_of(err: &ApplicationError) -> StatusCode {
    if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn log_error(status: StatusCode, message: &str) {
    if status.is_server_error() {
        tracing::error!(status = status.as_u16(), error = %message, "Request failed");
    } else {
        tracing::warn!(status = status.as_u16(), error = %message, "Request rejected");
    }
}

/// 纯文本 API 错误（TTS 服务）
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "not found")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        log_error(self.status, &self.message);
        let mut body = self.message;
        if !body.ends_with('\n') {
            body.push('\n');
        }
        (self.status, body).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        Self::new(status_of(&e), e.to_string())
    }
}

/// JSON 错误正文
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// JSON API 错误（Chat 服务）
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: error.into(),
                model: None,
            },
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "not found")
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        log_error(self.status, &self.body.error);
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ApplicationError> for JsonApiError {
    fn from(e: ApplicationError) -> Self {
        let status = status_of(&e);
        let model = e.bound_model().map(str::to_string);
        Self {
            status,
            body: ErrorBody {
                error: e.to_string(),
                model,
            },
        }
    }
}
