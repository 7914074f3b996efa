//! HTTP Middleware
//!
//! 4xx / 5xx 响应日志，附带耗时

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

/// 错误响应日志中间件
///
/// 错误正文由 `ApiError` / `JsonApiError` 记录，这里只记录请求行和耗时
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            elapsed_ms,
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            elapsed_ms,
            "HTTP client error"
        );
    }

    response
}
