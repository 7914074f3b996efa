//! 测试用的假对话引擎

use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::ports::{ChatEnginePort, ChatError, ChatInputMode, ChatRequest};

/// 返回固定回复并记录收到的请求
pub struct FakeChatEngine {
    mode: ChatInputMode,
    reply: Result<String, ChatError>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl FakeChatEngine {
    pub fn new(mode: ChatInputMode, reply: impl Into<String>) -> Self {
        Self {
            mode,
            reply: Ok(reply.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mode: ChatInputMode, error: ChatError) -> Self {
        Self {
            mode,
            reply: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatEnginePort for FakeChatEngine {
    fn input_mode(&self) -> ChatInputMode {
        self.mode
    }

    async fn generate(&self, request: ChatRequest) -> Result<String, ChatError> {
        self.requests.lock().unwrap().push(request);
        self.reply.clone()
    }
}
