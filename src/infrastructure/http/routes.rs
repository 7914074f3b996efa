//! HTTP Routes
//!
//! 所有服务共有：
//! - /health                 GET   健康检查
//! - /                       GET   服务横幅
//! - /v1/models, /models     GET   绑定的模型
//!
//! TTS（kokomo、chatterbox）：
//! - /tts                    POST  合成 WAV
//!
//! Chat（mlx、vlm）：
//! - /v1/chat/completions    POST  对话补全
//! - /chat/completions       POST  同上

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::config::ServiceFamily;

use super::error::{ApiError, JsonApiError};
use super::handlers;
use super::state::AppState;

/// 创建指定接口族的路由
pub fn create_routes(family: ServiceFamily) -> Router<Arc<AppState>> {
    let common = Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::banner))
        .route("/v1/models", get(handlers::list_models))
        .route("/models", get(handlers::list_models));

    match family {
        ServiceFamily::Tts => common
            .route(
                "/tts",
                post(handlers::synthesize).fallback(plain_not_found),
            )
            .fallback(plain_not_found),
        ServiceFamily::Chat => {
            let completions = post(handlers::chat_completions).fallback(json_not_found);
            common
                .route("/v1/chat/completions", completions.clone())
                .route("/chat/completions", completions)
                .fallback(json_not_found)
        }
    }
}

async fn plain_not_found() -> ApiError {
    ApiError::not_found()
}

async fn json_not_found() -> JsonApiError {
    JsonApiError::not_found()
}
