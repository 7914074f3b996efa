//! Chatterbox 语音引擎
//!
//! 每个文本块调用一次生成器，输出写入请求独占的临时目录

use async_trait::async_trait;

use crate::application::ports::{SpeechEnginePort, SpeechRequest, TtsError};
use crate::domain::Device;
use crate::infrastructure::process::{install_hint, run_checked, Generator, ProbeChain};

use super::output::{discover_wav, list_files, missing_output_report};

const SERVICE: &str = "chatterbox";

pub fn chatterbox_candidates() -> ProbeChain<&'static str> {
    ProbeChain::new(
        "chatterbox generator",
        vec!["chatterbox-tts", "chatterbox", "chatterbox.generate"],
    )
}

/// Chatterbox 引擎
pub struct ChatterboxEngine {
    generator: Option<Generator>,
    device: Device,
}

impl ChatterboxEngine {
    pub fn new(generator: Option<Generator>, device: Device) -> Self {
        Self { generator, device }
    }
}

#[async_trait]
impl SpeechEnginePort for ChatterboxEngine {
    async fn synthesize(&self, request: SpeechRequest) -> Result<Vec<u8>, TtsError> {
        let generator = self
            .generator
            .as_ref()
            .ok_or_else(|| TtsError::Unavailable(install_hint(SERVICE, "chatterbox-tts")))?;

        let scratch = tempfile::Builder::new()
            .prefix("infergate-chatterbox-")
            .tempdir()
            .map_err(|e| TtsError::Io(format!("failed to create scratch dir: {}", e)))?;
        let out_path = scratch.path().join("out.wav");

        let sampling = request.sampling;
        let mut command = generator
            .command()
            .opt_value("--text", &request.text)
            .opt("--output", out_path.display())
            .opt("--device", self.device)
            .opt("--exaggeration", sampling.exaggeration)
            .opt("--temperature", sampling.temperature)
            .opt("--cfg-weight", sampling.cfg_weight);
        if let Some(prompt) = &request.voice {
            command = command.opt_value("--audio-prompt", prompt);
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

        tokio::fs::read(&produced)
            .await
            .map_err(|e| TtsError::Io(format!("failed to read output: {}", e)))
    }
}
