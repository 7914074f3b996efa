//! Chat Commands - 对话补全命令

use crate::domain::ChatMessage;

/// 对话补全命令
#[derive(Debug, Clone, Default)]
pub struct ChatCompletionCommand {
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
}

/// 对话补全结果
#[derive(Debug, Clone)]
pub struct ChatCompletionResponse {
    /// `chatcmpl-<uuid>`
    pub id: String,
    /// Unix 时间戳（秒）
    pub created: i64,
    pub model: String,
    pub content: String,
}
