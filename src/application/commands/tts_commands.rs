//! TTS Commands - 语音合成命令

/// 合成命令
///
/// 采样参数为 None 时使用进程配置的默认值
#[derive(Debug, Clone, Default)]
pub struct SynthesizeCommand {
    pub text: String,
    pub model: Option<String>,
    /// 音色名称或参考音频路径
    pub voice: Option<String>,
    pub exaggeration: Option<f64>,
    pub temperature: Option<f64>,
    pub cfg_weight: Option<f64>,
    pub chunk_size: Option<usize>,
}

/// 合成结果
#[derive(Debug, Clone)]
pub struct SynthesizeResponse {
    /// WAV 数据
    pub audio: Vec<u8>,
    /// 实际合成的块数
    pub chunks: usize,
}
