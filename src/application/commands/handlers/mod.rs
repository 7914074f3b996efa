//! Command Handlers 实现

mod chat_handlers;
mod tts_handlers;

pub use chat_handlers::*;
pub use tts_handlers::*;

use crate::application::error::ApplicationError;

/// 进程绑定的模型
#[derive(Debug, Clone)]
pub struct ModelBinding {
    pub model: String,
    /// 环境变量前缀，用于错误提示
    pub env_prefix: &'static str,
}

impl ModelBinding {
    pub fn new(model: impl Into<String>, env_prefix: &'static str) -> Self {
        Self {
            model: model.into(),
            env_prefix,
        }
    }

    /// 请求指定了不同的模型时拒绝，绝不静默替换
    pub fn ensure(&self, requested: Option<&str>) -> Result<(), ApplicationError> {
        match requested.map(str::trim) {
            Some(model) if !model.is_empty() && model != self.model => Err(
                ApplicationError::model_mismatch(self.model.clone(), self.env_prefix),
            ),
            _ => Ok(()),
        }
    }
}
