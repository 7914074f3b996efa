//! Chat Completion Handler

use axum::{body::Bytes, extract::State, Json};
use std::sync::Arc;

use crate::infrastructure::http::dto::{parse_json_body, ChatCompletionDto, ChatCompletionRequest};
use crate::infrastructure::http::error::JsonApiError;
use crate::infrastructure::http::state::{AppState, Gateway};

/// `POST /v1/chat/completions`
pub async fn chat_completions(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ChatCompletionDto>, JsonApiError> {
    let Gateway::Chat(handler) = &state.gateway else {
        return Err(JsonApiError::not_found());
    };

    let request =
        parse_json_body::<ChatCompletionRequest>(&body).map_err(JsonApiError::bad_request)?;

    let response = handler.handle(request.into_command()).await?;

    Ok(Json(response.into()))
}
