//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（SpeechEngine、ChatEngine、AudioCodec）
//! - commands: 推理命令及处理器
//! - single_flight: 生成调用串行化
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod single_flight;

// Re-exports
pub use commands::{
    handlers::{
        ChatCompletionHandler, ChatDefaults, ModelBinding, SpeechDefaults, SynthesizeHandler,
    },
    ChatCompletionCommand, ChatCompletionResponse, SynthesizeCommand, SynthesizeResponse,
};

pub use error::ApplicationError;

pub use ports::{
    AudioCodecPort, ChatEnginePort, ChatError, ChatInput, ChatInputMode, ChatRequest,
    ChatSampling, SpeechEnginePort, SpeechRequest, SpeechSampling, TtsError,
};

pub use single_flight::SingleFlight;
