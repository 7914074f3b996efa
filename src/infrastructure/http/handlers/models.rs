//! Models Handler

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::infrastructure::http::dto::ModelListDto;
use crate::infrastructure::http::state::AppState;

/// 列出绑定的唯一模型
pub async fn list_models(State(state): State<Arc<AppState>>) -> Json<ModelListDto> {
    Json(ModelListDto::single(state.model.clone()))
}
