//! 音频波形与拼接
//!
//! 分块合成后的音频按顺序拼接，块之间插入固定时长的静音

use std::time::Duration;

use thiserror::Error;

/// 块之间的静音间隔
pub const CHUNK_SILENCE_GAP: Duration = Duration::from_millis(300);

/// 音频错误
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Chunk {index} is incompatible: {reason}")]
    IncompatibleChunk { index: usize, reason: String },
}

/// 样本格式（决定 WAV 编码方式）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// 16 位整型 PCM
    Pcm16,
    /// 32 位 IEEE 浮点
    Float32,
}

impl SampleFormat {
    pub fn bits_per_sample(&self) -> u16 {
        match self {
            SampleFormat::Pcm16 => 16,
            SampleFormat::Float32 => 32,
        }
    }
}

/// 解码后的音频（交错 f32 样本）
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
    pub format: SampleFormat,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16, format: SampleFormat) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
            format,
        }
    }

    /// 帧数（每声道样本数）
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }
}

/// 指定时长的静音帧数
pub fn silence_frames(gap: Duration, sample_rate: u32) -> usize {
    (gap.as_nanos() * sample_rate as u128 / 1_000_000_000) as usize
}

/// 按顺序拼接多个波形，块之间插入 `gap` 静音
///
/// 以第一个块的采样率、声道数和样本格式为准；后续块必须一致。
/// 单个块原样返回。
pub fn concat_with_silence(parts: Vec<Waveform>, gap: Duration) -> Result<Waveform, AudioError> {
    let mut parts = parts.into_iter();
    let mut combined = parts
        .next()
        .ok_or_else(|| AudioError::InvalidInput("no audio chunks to concatenate".to_string()))?;

    let silence_len = silence_frames(gap, combined.sample_rate) * combined.channels as usize;

    for (offset, part) in parts.enumerate() {
        let index = offset + 1;
        if part.sample_rate != combined.sample_rate {
            return Err(AudioError::IncompatibleChunk {
                index,
                reason: format!(
                    "sample rate {} differs from {}",
                    part.sample_rate, combined.sample_rate
                ),
            });
        }
        if part.channels != combined.channels {
            return Err(AudioError::IncompatibleChunk {
                index,
                reason: format!(
                    "channel count {} differs from {}",
                    part.channels, combined.channels
                ),
            });
        }

        combined.samples.reserve(silence_len + part.samples.len());
        combined
            .samples
            .extend(std::iter::repeat(0.0).take(silence_len));
        combined.samples.extend_from_slice(&part.samples);
    }

    Ok(combined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(value: f32, frames: usize, sample_rate: u32) -> Waveform {
        Waveform::new(vec![value; frames], sample_rate, 1, SampleFormat::Pcm16)
    }

    #[test]
    fn test_three_chunks_with_silence_in_order() {
        let rate = 24_000;
        let a = tone(0.1, 2_400, rate);
        let b = tone(0.2, 4_800, rate);
        let c = tone(0.3, 1_200, rate);
        let expected_duration = a.duration() + b.duration() + c.duration() + 2 * CHUNK_SILENCE_GAP;

        let combined = concat_with_silence(vec![a, b, c], CHUNK_SILENCE_GAP).unwrap();

        let gap = silence_frames(CHUNK_SILENCE_GAP, rate);
        assert_eq!(gap, 7_200);
        assert_eq!(combined.frames(), 2_400 + gap + 4_800 + gap + 1_200);
        let drift = combined.duration().as_secs_f64() - expected_duration.as_secs_f64();
        assert!(drift.abs() < 1e-6);

        let s = &combined.samples;
        assert!(s[..2_400].iter().all(|&v| v == 0.1));
        assert!(s[2_400..2_400 + gap].iter().all(|&v| v == 0.0));
        let b_start = 2_400 + gap;
        assert!(s[b_start..b_start + 4_800].iter().all(|&v| v == 0.2));
        let c_start = b_start + 4_800 + gap;
        assert!(s[c_start - gap..c_start].iter().all(|&v| v == 0.0));
        assert!(s[c_start..].iter().all(|&v| v == 0.3));
    }

    #[test]
    fn test_single_chunk_unchanged() {
        let a = tone(0.5, 100, 16_000);
        let combined = concat_with_silence(vec![a.clone()], CHUNK_SILENCE_GAP).unwrap();
        assert_eq!(combined, a);
    }

    #[test]
    fn test_first_chunk_format_is_canonical() {
        let mut a = tone(0.1, 10, 8_000);
        a.format = SampleFormat::Float32;
        let b = tone(0.2, 10, 8_000);
        let combined = concat_with_silence(vec![a, b], CHUNK_SILENCE_GAP).unwrap();
        assert_eq!(combined.format, SampleFormat::Float32);
    }

    #[test]
    fn test_stereo_silence_covers_both_channels() {
        let a = Waveform::new(vec![0.1; 20], 10, 2, SampleFormat::Pcm16);
        let b = Waveform::new(vec![0.2; 20], 10, 2, SampleFormat::Pcm16);
        let combined = concat_with_silence(vec![a, b], CHUNK_SILENCE_GAP).unwrap();
        // 0.3s @ 10Hz = 3 帧 = 6 个样本
        assert_eq!(combined.samples.len(), 20 + 6 + 20);
        assert_eq!(combined.frames(), 23);
    }

    #[test]
    fn test_mismatched_sample_rate_rejected() {
        let a = tone(0.1, 10, 24_000);
        let b = tone(0.1, 10, 22_050);
        let err = concat_with_silence(vec![a, b], CHUNK_SILENCE_GAP).unwrap_err();
        assert!(matches!(err, AudioError::IncompatibleChunk { index: 1, .. }));
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(concat_with_silence(Vec::new(), CHUNK_SILENCE_GAP).is_err());
    }
}
