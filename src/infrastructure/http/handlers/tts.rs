//! TTS Handler

use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::infrastructure::http::dto::{parse_json_body, SynthesizeRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::{AppState, Gateway};

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false)
}

/// `POST /tts`
///
/// JSON 请求体或原始文本，成功时返回 `audio/wav`
pub async fn synthesize(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let Gateway::Speech(handler) = &state.gateway else {
        return Err(ApiError::not_found());
    };

    let request = if is_json(&headers) {
        parse_json_body::<SynthesizeRequest>(&body).map_err(ApiError::bad_request)?
    } else {
        SynthesizeRequest::raw_text(&body)
    };

    let result = handler.handle(request.into_command()).await?;

    Ok(([(CONTENT_TYPE, "audio/wav")], result.audio).into_response())
}
