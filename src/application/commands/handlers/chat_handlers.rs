//! Chat Command Handlers

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::application::commands::chat_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ChatEnginePort, ChatInput, ChatInputMode, ChatRequest, ChatSampling,
};
use crate::application::single_flight::SingleFlight;
use crate::domain::chat::{latest_user_image, latest_user_text};

use super::ModelBinding;

/// 对话默认参数
#[derive(Debug, Clone)]
pub struct ChatDefaults {
    pub binding: ModelBinding,
    pub sampling: ChatSampling,
}

/// ChatCompletion Handler - 对话补全
pub struct ChatCompletionHandler {
    engine: Arc<dyn ChatEnginePort>,
    /// 仅在模型句柄不可并发时设置
    guard: Option<Arc<SingleFlight>>,
    defaults: ChatDefaults,
}

impl ChatCompletionHandler {
    pub fn new(
        engine: Arc<dyn ChatEnginePort>,
        guard: Option<Arc<SingleFlight>>,
        defaults: ChatDefaults,
    ) -> Self {
        Self {
            engine,
            guard,
            defaults,
        }
    }

    pub fn model(&self) -> &str {
        &self.defaults.binding.model
    }

    pub async fn handle(
        &self,
        cmd: ChatCompletionCommand,
    ) -> Result<ChatCompletionResponse, ApplicationError> {
        if cmd.messages.is_empty() {
            return Err(ApplicationError::invalid("missing messages[]"));
        }
        self.defaults.binding.ensure(cmd.model.as_deref())?;

        let defaults = self.defaults.sampling;
        let sampling = ChatSampling {
            max_tokens: cmd.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: cmd.temperature.unwrap_or(defaults.temperature),
            top_p: cmd.top_p.unwrap_or(defaults.top_p),
        };

        let input = match self.engine.input_mode() {
            ChatInputMode::Conversation => ChatInput::Conversation(cmd.messages),
            ChatInputMode::Vision => {
                let prompt = latest_user_text(&cmd.messages).unwrap_or_default();
                let image = latest_user_image(&cmd.messages)
                    .map_err(|e| ApplicationError::invalid(e.to_string()))?;
                if prompt.trim().is_empty() && image.is_none() {
                    return Err(ApplicationError::invalid(
                        "provide user text and/or a data: image_url",
                    ));
                }
                ChatInput::Vision { prompt, image }
            }
        };

        tracing::debug!(
            max_tokens = sampling.max_tokens,
            temperature = sampling.temperature,
            top_p = sampling.top_p,
            "Request validated"
        );

        let request = ChatRequest { input, sampling };
        let content = match &self.guard {
            Some(guard) => {
                if guard.is_busy() {
                    tracing::debug!("Waiting for in-flight generation");
                }
                guard.run(self.engine.generate(request)).await?
            }
            None => self.engine.generate(request).await?,
        };

        let response = ChatCompletionResponse {
            id: format!("chatcmpl-{}", Uuid::new_v4().simple()),
            created: Utc::now().timestamp(),
            model: self.defaults.binding.model.clone(),
            content,
        };

        tracing::info!(
            id = %response.id,
            chars = response.content.chars().count(),
            "Completion generated"
        );

        Ok(response)
    }
}
