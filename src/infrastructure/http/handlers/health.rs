//! Health / Banner Handlers

use axum::extract::State;
use std::sync::Arc;

use crate::infrastructure::http::state::AppState;

/// 健康检查，不访问后端
pub async fn health() -> &'static str {
    "ok\n"
}

/// 服务横幅
pub async fn banner(State(state): State<Arc<AppState>>) -> &'static str {
    state.kind.banner()
}
