//! TTS Command Handlers

use std::sync::Arc;

use crate::application::commands::tts_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{AudioCodecPort, SpeechEnginePort, SpeechRequest, SpeechSampling};
use crate::domain::{chunk_text, concat_with_silence, CHUNK_SILENCE_GAP};

use super::ModelBinding;

/// 合成默认参数（启动时从配置读取一次）
#[derive(Debug, Clone)]
pub struct SpeechDefaults {
    pub binding: ModelBinding,
    pub sampling: SpeechSampling,
    /// 为 None 时不分块
    pub chunk_size: Option<usize>,
}

/// Synthesize Handler - 文本转语音
///
/// 长文本按块合成，块之间插入静音后拼接为一个 WAV
pub struct SynthesizeHandler {
    engine: Arc<dyn SpeechEnginePort>,
    codec: Arc<dyn AudioCodecPort>,
    defaults: SpeechDefaults,
}

impl SynthesizeHandler {
    pub fn new(
        engine: Arc<dyn SpeechEnginePort>,
        codec: Arc<dyn AudioCodecPort>,
        defaults: SpeechDefaults,
    ) -> Self {
        Self {
            engine,
            codec,
            defaults,
        }
    }

    pub async fn handle(&self, cmd: SynthesizeCommand) -> Result<SynthesizeResponse, ApplicationError> {
        let text = cmd.text.trim();
        if text.is_empty() {
            return Err(ApplicationError::invalid("missing text"));
        }
        self.defaults.binding.ensure(cmd.model.as_deref())?;

        let defaults = self.defaults.sampling;
        let sampling = SpeechSampling {
            exaggeration: cmd.exaggeration.unwrap_or(defaults.exaggeration),
            temperature: cmd.temperature.unwrap_or(defaults.temperature),
            cfg_weight: cmd.cfg_weight.unwrap_or(defaults.cfg_weight),
        };
        let voice = cmd.voice.filter(|v| !v.trim().is_empty());

        // 请求中的 0 视为未指定
        let chunk_size = cmd
            .chunk_size
            .filter(|size| *size > 0)
            .or(self.defaults.chunk_size);
        let chunks = match chunk_size {
            Some(max_chars) if text.chars().count() > max_chars => chunk_text(text, max_chars),
            _ => vec![text.to_string()],
        };

        tracing::debug!(
            chars = text.chars().count(),
            chunks = chunks.len(),
            chunk_size = ?chunk_size,
            "Request validated"
        );

        let mut outputs = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.into_iter().enumerate() {
            tracing::debug!(index, chars = chunk.chars().count(), "Generating chunk");
            let wav = self
                .engine
                .synthesize(SpeechRequest {
                    text: chunk,
                    voice: voice.clone(),
                    sampling,
                })
                .await?;
            outputs.push(wav);
        }

        let chunk_count = outputs.len();
        let audio = self.assemble(outputs)?;

        tracing::info!(
            chunks = chunk_count,
            bytes = audio.len(),
            "Speech synthesized"
        );

        Ok(SynthesizeResponse {
            audio,
            chunks: chunk_count,
        })
    }

    /// 单块原样返回，多块解码后拼接再编码
    fn assemble(&self, mut outputs: Vec<Vec<u8>>) -> Result<Vec<u8>, ApplicationError> {
        if outputs.len() == 1 {
            if let Some(only) = outputs.pop() {
                return Ok(only);
            }
        }

        tracing::debug!(chunks = outputs.len(), "Assembling chunk audio");
        let waveforms = outputs
            .iter()
            .map(|wav| self.codec.decode(wav))
            .collect::<Result<Vec<_>, _>>()?;
        let combined = concat_with_silence(waveforms, CHUNK_SILENCE_GAP)?;
        Ok(self.codec.encode(&combined)?)
    }
}
