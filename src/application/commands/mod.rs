//! 应用层 - 命令
//!
//! 每个推理请求对应一个命令及其处理器

mod chat_commands;
mod tts_commands;

pub mod handlers;

pub use chat_commands::*;
pub use tts_commands::*;
