//! mlx-audio 语音引擎（kokomo）
//!
//! 每个请求调用一次 mlx-audio 生成器，长文本由生成器自行拼接（`--join_audio`）

use async_trait::async_trait;

use crate::application::ports::{SpeechEnginePort, SpeechRequest, TtsError};
use crate::infrastructure::process::{install_hint, run_checked, Generator, ProbeChain};

use super::output::{discover_wav, list_files, missing_output_report};

const SERVICE: &str = "kokomo";

/// 生成器候选（不同版本名称不同）
pub fn mlx_audio_candidates() -> ProbeChain<&'static str> {
    ProbeChain::new(
        "mlx-audio generator",
        vec!["mlx_audio.tts.generate", "mlx-audio.generate", "mlx_audio.generate"],
    )
}

/// mlx-audio 引擎
pub struct MlxAudioEngine {
    /// 启动时未找到生成器则为 None，每个请求返回安装提示
    generator: Option<Generator>,
    model: String,
}

impl MlxAudioEngine {
    pub fn new(generator: Option<Generator>, model: impl Into<String>) -> Self {
        Self {
            generator,
            model: model.into(),
        }
    }
}

#[async_trait]
impl SpeechEnginePort for MlxAudioEngine {
    async fn synthesize(&self, request: SpeechRequest) -> Result<Vec<u8>, TtsError> {
        let generator = self
            .generator
            .as_ref()
            .ok_or_else(|| TtsError::Unavailable(install_hint(SERVICE, "mlx-audio")))?;

        let scratch = tempfile::Builder::new()
            .prefix("infergate-kokomo-")
            .tempdir()
            .map_err(|e| TtsError::Io(format!("failed to create scratch dir: {}", e)))?;
        let file_prefix = scratch.path().join("out");

        let mut command = generator
            .command()
            .opt("--model", &self.model)
            .opt_value("--text", &request.text)
            .opt("--file_prefix", file_prefix.display())
            .opt("--audio_format", "wav")
            .arg("--join_audio");
        if let Some(voice) = &request.voice {
            command = command.opt_value("--voice", voice);
        }

        let output = run_checked(&command)
            .await
            .map_err(|e| TtsError::ProcessFailed(e.render("tts failed", SERVICE)))?;

        let Some(produced) = discover_wav(scratch.path(), "out").await else {
            let files = list_files(scratch.path()).await;
            return Err(TtsError::MissingOutput(missing_output_report(
                scratch.path(),
                &files,
                &output.stdout,
                &output.stderr,
            )));
        };

        let wav = tokio::fs::read(&produced)
            .await
            .map_err(|e| TtsError::Io(format!("failed to read output: {}", e)))?;

        tracing::debug!(
            path = %produced.display(),
            bytes = wav.len(),
            "mlx-audio produced output"
        );
        Ok(wav)
    }
}
