//! Chat Engine Port - 文本/视觉生成引擎抽象

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{ChatMessage, InlineImage};

/// 生成错误
#[derive(Debug, Clone, Error)]
pub enum ChatError {
    /// 生成器不可用（未安装）
    #[error("{0}")]
    Unavailable(String),

    /// 生成器启动失败或非零退出
    #[error("{0}")]
    ProcessFailed(String),

    /// 请求内容无法交给生成器
    #[error("{0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(String),
}

/// 引擎接受的输入形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatInputMode {
    /// 完整对话，引擎自行构造 prompt
    Conversation,
    /// 最近一条 user 文本 + 可选图片
    Vision,
}

/// 采样参数（已合并默认值）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChatSampling {
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
}

/// 生成输入
#[derive(Debug, Clone)]
pub enum ChatInput {
    Conversation(Vec<ChatMessage>),
    Vision {
        prompt: String,
        image: Option<InlineImage>,
    },
}

/// 生成请求
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub input: ChatInput,
    pub sampling: ChatSampling,
}

/// Chat Engine Port
#[async_trait]
pub trait ChatEnginePort: Send + Sync {
    fn input_mode(&self) -> ChatInputMode;

    /// 生成回复文本
    async fn generate(&self, request: ChatRequest) -> Result<String, ChatError>;
}
