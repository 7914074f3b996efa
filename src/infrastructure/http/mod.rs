//! HTTP Layer
//!
//! 每个服务一个 axum Router，按接口族挂载路由

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, JsonApiError};
pub use routes::create_routes;
pub use server::{HttpServer, ServerConfig};
pub use state::{AppState, Gateway};
