//! Speech Engine Port - TTS 推理引擎抽象
//!
//! 定义语音合成的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

/// TTS 错误
#[derive(Debug, Clone, Error)]
pub enum TtsError {
    /// 生成器不可用（未安装）
    #[error("{0}")]
    Unavailable(String),

    /// 生成器启动失败或非零退出
    #[error("{0}")]
    ProcessFailed(String),

    /// 生成器未产出音频文件
    #[error("{0}")]
    MissingOutput(String),

    #[error("IO error: {0}")]
    Io(String),
}

/// 采样参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeechSampling {
    pub exaggeration: f64,
    pub temperature: f64,
    pub cfg_weight: f64,
}

/// 单次合成请求（一个文本块）
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    /// 要合成的文本
    pub text: String,
    /// 音色名称或参考音频路径
    pub voice: Option<String>,
    pub sampling: SpeechSampling,
}

/// Speech Engine Port
///
/// 每次调用返回一段完整的 WAV 数据
#[async_trait]
pub trait SpeechEnginePort: Send + Sync {
    async fn synthesize(&self, request: SpeechRequest) -> Result<Vec<u8>, TtsError>;
}
