//! Audio Codec Port - 音频编解码抽象
//!
//! 分块合成后的 WAV 需要先解码为波形，拼接后再编码

use crate::domain::{AudioError, Waveform};

/// Audio Codec Port
pub trait AudioCodecPort: Send + Sync {
    /// 解码 WAV 数据
    fn decode(&self, wav_data: &[u8]) -> Result<Waveform, AudioError>;

    /// 按波形的样本格式编码为 WAV
    fn encode(&self, waveform: &Waveform) -> Result<Vec<u8>, AudioError>;
}
