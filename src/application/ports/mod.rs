//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_codec;
mod chat_engine;
mod speech_engine;

pub use audio_codec::AudioCodecPort;
pub use chat_engine::{
    ChatEnginePort, ChatError, ChatInput, ChatInputMode, ChatRequest, ChatSampling,
};
pub use speech_engine::{SpeechEnginePort, SpeechRequest, SpeechSampling, TtsError};
