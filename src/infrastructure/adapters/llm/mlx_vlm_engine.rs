//! mlx-vlm 视觉生成引擎

use async_trait::async_trait;

use crate::application::ports::{
    ChatEnginePort, ChatError, ChatInput, ChatInputMode, ChatRequest,
};
use crate::infrastructure::process::{run_checked, CommandSpec, Generator, GeneratorFlags, ProbeChain};

use super::mlx_lm_engine::probe_generator;
use super::output::parse_generation_output;

const SERVICE: &str = "vlm";

pub fn mlx_vlm_candidates() -> ProbeChain<&'static str> {
    ProbeChain::new("mlx-vlm generator", vec!["mlx_vlm.generate", "mlx-vlm.generate"])
}

/// mlx-vlm 引擎
///
/// 只使用最近一条 user 文本和图片；图片写入请求独占的临时目录后以路径传给生成器
pub struct MlxVlmEngine {
    generator: Generator,
    flags: GeneratorFlags,
    model: String,
}

impl MlxVlmEngine {
    pub fn new(generator: Generator, flags: GeneratorFlags, model: impl Into<String>) -> Self {
        Self {
            generator,
            flags,
            model: model.into(),
        }
    }

    pub async fn load(generator: Option<Generator>, model: impl Into<String>) -> Result<Self, ChatError> {
        let (generator, flags) = probe_generator(generator, SERVICE, "mlx-vlm").await?;
        Ok(Self::new(generator, flags, model))
    }

    fn build_command(&self, request: &ChatRequest, prompt: &str) -> CommandSpec {
        self.generator
            .command()
            .opt("--model", &self.model)
            .opt(&self.flags.max_tokens, request.sampling.max_tokens)
            .opt(&self.flags.temperature, request.sampling.temperature)
            .opt_value("--prompt", prompt)
    }
}

#[async_trait]
impl ChatEnginePort for MlxVlmEngine {
    fn input_mode(&self) -> ChatInputMode {
        ChatInputMode::Vision
    }

    async fn generate(&self, request: ChatRequest) -> Result<String, ChatError> {
        let ChatInput::Vision { prompt, image } = &request.input else {
            return Err(ChatError::InvalidInput(
                "mlx-vlm expects a prompt and optional image".to_string(),
            ));
        };

        let scratch = tempfile::Builder::new()
            .prefix("infergate-vlm-")
            .tempdir()
            .map_err(|e| ChatError::Io(format!("failed to create scratch dir: {}", e)))?;

        let mut command = self.build_command(&request, prompt);
        if let Some(image) = image {
            let path = scratch.path().join(format!("image.{}", image.extension()));
            tokio::fs::write(&path, &image.bytes)
                .await
                .map_err(|e| ChatError::Io(format!("failed to write image: {}", e)))?;
            command = command.opt("--image", path.display());
        }

        let output = run_checked(&command)
            .await
            .map_err(|e| ChatError::ProcessFailed(e.render("vlm generation failed", SERVICE)))?;

        Ok(parse_generation_output(&output.stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::ChatSampling;
    use crate::domain::InlineImage;

    fn sampling() -> ChatSampling {
        ChatSampling {
            max_tokens: 100,
            temperature: 0.0,
            top_p: 0.9,
        }
    }

    #[test]
    fn test_command_uses_probed_spellings_without_top_p() {
        let flags = GeneratorFlags {
            temperature: "--temperature".to_string(),
            max_tokens: "--max_tokens".to_string(),
            top_p: Some("--top-p".to_string()),
            ignore_chat_template: false,
            system_prompt: false,
        };
        let engine = MlxVlmEngine::new(Generator::new("mlx_vlm.generate"), flags, "llava");
        let request = ChatRequest {
            input: ChatInput::Vision {
                prompt: "describe".to_string(),
                image: None,
            },
            sampling: sampling(),
        };
        let command = engine.build_command(&request, "describe");
        assert_eq!(
            command.display(),
            "mlx_vlm.generate --model llava --max_tokens 100 --temperature 0 --prompt=describe"
        );
    }

    #[tokio::test]
    async fn test_conversation_input_rejected() {
        let flags = GeneratorFlags::from_help("--prompt");
        let engine = MlxVlmEngine::new(Generator::new("mlx_vlm.generate"), flags, "llava");
        let err = engine
            .generate(ChatRequest {
                input: ChatInput::Conversation(Vec::new()),
                sampling: sampling(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::InvalidInput(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_image_written_and_passed_by_path() {
        use crate::infrastructure::adapters::test_support::script_generator;

        let dir = tempfile::tempdir().unwrap();
        // 输出图片路径的扩展名和内容
        let body = r#"case "$1" in
  --help) echo "usage: generate [--model M] [--image I] [--prompt P] [--max-tokens N] [--temp T]"; exit 0 ;;
esac
image=""
while [ $# -gt 0 ]; do
  if [ "$1" = "--image" ]; then image="$2"; fi
  shift
done
echo "=========="
echo "${image##*.} $(cat "$image")"
echo "==========""#;
        let generator = script_generator(dir.path(), "gen.sh", body);
        let engine = MlxVlmEngine::load(Some(generator), "llava").await.unwrap();

        let reply = engine
            .generate(ChatRequest {
                input: ChatInput::Vision {
                    prompt: "what is this?".to_string(),
                    image: Some(InlineImage {
                        media_type: Some("image/jpeg".to_string()),
                        bytes: b"hi".to_vec(),
                    }),
                },
                sampling: sampling(),
            })
            .await
            .unwrap();
        assert_eq!(reply, "jpg hi");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dash_leading_prompt_reaches_generator() {
        use crate::infrastructure::adapters::test_support::script_generator;

        let dir = tempfile::tempdir().unwrap();
        let body = r#"case "$1" in
  --help) echo "[--prompt P] [--max-tokens N] [--temp T]"; exit 0 ;;
esac
for arg in "$@"; do
  case "$arg" in
    --prompt=*) prompt="${arg#--prompt=}" ;;
  esac
done
echo "=========="
echo "ECHO:$prompt"
echo "==========""#;
        let generator = script_generator(dir.path(), "gen.sh", body);
        let engine = MlxVlmEngine::load(Some(generator), "llava").await.unwrap();
        let reply = engine
            .generate(ChatRequest {
                input: ChatInput::Vision {
                    prompt: "-h".to_string(),
                    image: None,
                },
                sampling: sampling(),
            })
            .await
            .unwrap();
        assert_eq!(reply, "ECHO:-h");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failure_rendered_with_command() {
        use crate::infrastructure::adapters::test_support::script_generator;

        let dir = tempfile::tempdir().unwrap();
        let body = r#"case "$1" in
  --help) echo "[--prompt P] [--max-tokens N] [--temp T]"; exit 0 ;;
esac
echo "out of memory" >&2
exit 3"#;
        let generator = script_generator(dir.path(), "gen.sh", body);
        let engine = MlxVlmEngine::load(Some(generator), "llava").await.unwrap();
        let err = engine
            .generate(ChatRequest {
                input: ChatInput::Vision {
                    prompt: "hi".to_string(),
                    image: None,
                },
                sampling: sampling(),
            })
            .await
            .unwrap_err();
        match err {
            ChatError::ProcessFailed(msg) => {
                assert!(msg.starts_with("vlm generation failed\ncommand: sh "));
                assert!(msg.contains("out of memory"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
