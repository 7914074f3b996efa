//! Domain Layer - 领域层
//!
//! 与后端无关的纯逻辑：
//! - 文本分块
//! - 音频波形拼接
//! - Chat 消息模型
//! - 设备选择

pub mod audio;
pub mod chat;
pub mod device;
mod text_chunker;

pub use audio::{concat_with_silence, AudioError, SampleFormat, Waveform, CHUNK_SILENCE_GAP};
pub use chat::{ChatMessage, ContentPart, ImageRef, InlineImage, MessageContent, Role};
pub use device::{resolve_device, AcceleratorAvailability, Device, DevicePolicy, DeviceRequest};
pub use text_chunker::chunk_text;
