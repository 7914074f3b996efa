//! 应用层错误定义
//!
//! 统一的命令处理错误类型

use thiserror::Error;

use crate::application::ports::{ChatError, TtsError};
use crate::domain::AudioError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 请求无效（原样返回给调用方）
    #[error("{0}")]
    InvalidRequest(String),

    /// 请求的模型与进程绑定的模型不一致
    #[error("this server is started with a single model ({bound}); restart with {env_prefix}_MODEL to change")]
    ModelMismatch {
        bound: String,
        env_prefix: &'static str,
    },

    /// 生成器不可用
    #[error("{0}")]
    BackendUnavailable(String),

    /// 生成器执行失败
    #[error("{0}")]
    BackendFailed(String),

    /// 生成器未产出结果文件
    #[error("{0}")]
    MissingOutput(String),

    /// 音频处理错误
    #[error("Audio error: {0}")]
    Audio(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// 创建请求无效错误
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// 创建模型不匹配错误
    pub fn model_mismatch(bound: impl Into<String>, env_prefix: &'static str) -> Self {
        Self::ModelMismatch {
            bound: bound.into(),
            env_prefix,
        }
    }

    /// 是否为调用方错误（4xx）
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRequest(_) | Self::ModelMismatch { .. })
    }

    /// 绑定的模型（仅模型不匹配时）
    pub fn bound_model(&self) -> Option<&str> {
        match self {
            Self::ModelMismatch { bound, .. } => Some(bound),
            _ => None,
        }
    }
}

impl From<TtsError> for ApplicationError {
    fn from(err: TtsError) -> Self {
        match err {
            TtsError::Unavailable(msg) => Self::BackendUnavailable(msg),
            TtsError::ProcessFailed(msg) => Self::BackendFailed(msg),
            TtsError::MissingOutput(msg) => Self::MissingOutput(msg),
            TtsError::Io(msg) => Self::Internal(msg),
        }
    }
}

impl From<ChatError> for ApplicationError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Unavailable(msg) => Self::BackendUnavailable(msg),
            ChatError::ProcessFailed(msg) => Self::BackendFailed(msg),
            ChatError::InvalidInput(msg) => Self::InvalidRequest(msg),
            ChatError::Io(msg) => Self::Internal(msg),
        }
    }
}

impl From<AudioError> for ApplicationError {
    fn from(err: AudioError) -> Self {
        Self::Audio(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_mismatch_message_names_bound_model() {
        let err = ApplicationError::model_mismatch("my-model", "MLX");
        assert_eq!(
            err.to_string(),
            "this server is started with a single model (my-model); restart with MLX_MODEL to change"
        );
        assert_eq!(err.bound_model(), Some("my-model"));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_backend_errors_are_server_errors() {
        let err: ApplicationError = TtsError::MissingOutput("no wav".to_string()).into();
        assert!(matches!(err, ApplicationError::MissingOutput(_)));
        assert!(!err.is_client_error());
    }
}
