//! Application State
//!
//! 每个进程只服务一个后端：TTS 或 Chat

use crate::application::{ChatCompletionHandler, SynthesizeHandler};
use crate::config::{ServiceFamily, ServiceKind};

/// 后端入口
pub enum Gateway {
    Speech(SynthesizeHandler),
    Chat(ChatCompletionHandler),
}

/// 应用状态
pub struct AppState {
    pub kind: ServiceKind,
    /// 绑定的模型 ID
    pub model: String,
    pub gateway: Gateway,
}

impl AppState {
    pub fn speech(kind: ServiceKind, model: impl Into<String>, handler: SynthesizeHandler) -> Self {
        Self {
            kind,
            model: model.into(),
            gateway: Gateway::Speech(handler),
        }
    }

    pub fn chat(kind: ServiceKind, model: impl Into<String>, handler: ChatCompletionHandler) -> Self {
        Self {
            kind,
            model: model.into(),
            gateway: Gateway::Chat(handler),
        }
    }

    pub fn family(&self) -> ServiceFamily {
        match self.gateway {
            Gateway::Speech(_) => ServiceFamily::Tts,
            Gateway::Chat(_) => ServiceFamily::Chat,
        }
    }
}
