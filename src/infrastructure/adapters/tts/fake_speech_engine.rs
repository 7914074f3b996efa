//! Fake Speech Engine - 用于测试的语音引擎
//!
//! 不调用生成器，按文本长度合成确定性的 WAV

use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::ports::{AudioCodecPort, SpeechEnginePort, SpeechRequest, TtsError};
use crate::domain::{SampleFormat, Waveform};
use crate::infrastructure::adapters::WavCodec;

/// 每个字符对应的帧数
const FRAMES_PER_CHAR: usize = 10;

/// Fake Speech Engine
pub struct FakeSpeechEngine {
    sample_rate: u32,
    failure: Option<TtsError>,
    requests: Mutex<Vec<SpeechRequest>>,
}

impl FakeSpeechEngine {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            failure: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 每次调用都返回给定错误
    pub fn failing(error: TtsError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new(24_000)
        }
    }

    /// 收到的请求（按顺序）
    pub fn requests(&self) -> Vec<SpeechRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// 给定文本对应的输出
    pub fn render(&self, text: &str) -> Vec<u8> {
        let frames = text.chars().count() * FRAMES_PER_CHAR;
        let waveform = Waveform::new(vec![0.25; frames], self.sample_rate, 1, SampleFormat::Pcm16);
        WavCodec::new().encode(&waveform).unwrap()
    }
}

#[async_trait]
impl SpeechEnginePort for FakeSpeechEngine {
    async fn synthesize(&self, request: SpeechRequest) -> Result<Vec<u8>, TtsError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        Ok(self.render(&request.text))
    }
}
