//! HTTP Handlers

mod chat;
mod health;
mod models;
mod tts;

pub use chat::*;
pub use health::*;
pub use models::*;
pub use tts::*;
