//! mlx-lm 文本生成引擎
//!
//! 启动时定位生成器并探测参数拼写；对话按生成器能力构造 prompt

use async_trait::async_trait;

use crate::application::ports::{
    ChatEnginePort, ChatError, ChatInput, ChatInputMode, ChatRequest,
};
use crate::domain::chat::transcript_prompt;
use crate::domain::{ChatMessage, Role};
use crate::infrastructure::process::{
    install_hint, read_help, remediation_hint, run_checked, CommandSpec, Generator,
    GeneratorFlags, ProbeChain,
};

use super::output::{looks_like_generator_help, parse_generation_output};

const SERVICE: &str = "mlx";

pub fn mlx_lm_candidates() -> ProbeChain<&'static str> {
    ProbeChain::new("mlx-lm generator", vec!["mlx_lm.generate", "mlx-lm.generate"])
}

/// prompt 构造方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptPlan {
    /// 交给生成器套用模型自带的对话模板
    NativeTemplate {
        system: Option<String>,
        user: String,
    },
    /// 纯文本对话记录
    Transcript(String),
}

impl PromptPlan {
    /// 单条 user 消息（可带一条前置 system 消息）且生成器能表达时使用原生模板
    pub fn for_messages(messages: &[ChatMessage], flags: &GeneratorFlags) -> Self {
        match messages {
            [user] if user.role == Role::User => PromptPlan::NativeTemplate {
                system: None,
                user: user.text_content(),
            },
            [system, user]
                if system.role == Role::System && user.role == Role::User && flags.system_prompt =>
            {
                PromptPlan::NativeTemplate {
                    system: Some(system.text_content()),
                    user: user.text_content(),
                }
            }
            _ => PromptPlan::Transcript(transcript_prompt(messages)),
        }
    }
}

/// 启动时的加载错误，附带安装提示
pub(super) async fn probe_generator(
    generator: Option<Generator>,
    service: &str,
    package: &str,
) -> Result<(Generator, GeneratorFlags), ChatError> {
    let generator =
        generator.ok_or_else(|| ChatError::Unavailable(install_hint(service, package)))?;

    let help = read_help(&generator).await.map_err(|e| {
        ChatError::Unavailable(format!("{}\n{}", e, install_hint(service, package)))
    })?;
    if !looks_like_generator_help(&help) {
        let hint = remediation_hint(&help, service).unwrap_or_else(|| install_hint(service, package));
        return Err(ChatError::Unavailable(format!(
            "{} does not look like a working {} generator:\n{}\n{}",
            generator,
            package,
            help.trim(),
            hint
        )));
    }

    let flags = GeneratorFlags::from_help(&help);
    tracing::info!(
        generator = %generator,
        temperature_flag = %flags.temperature,
        max_tokens_flag = %flags.max_tokens,
        top_p_flag = ?flags.top_p,
        ignore_chat_template = flags.ignore_chat_template,
        system_prompt = flags.system_prompt,
        "Generator capabilities probed"
    );
    Ok((generator, flags))
}

/// mlx-lm 引擎
pub struct MlxLmEngine {
    generator: Generator,
    flags: GeneratorFlags,
    model: String,
}

impl MlxLmEngine {
    pub fn new(generator: Generator, flags: GeneratorFlags, model: impl Into<String>) -> Self {
        Self {
            generator,
            flags,
            model: model.into(),
        }
    }

    /// 定位生成器并探测能力，失败时服务不应启动
    pub async fn load(generator: Option<Generator>, model: impl Into<String>) -> Result<Self, ChatError> {
        let (generator, flags) = probe_generator(generator, SERVICE, "mlx-lm").await?;
        Ok(Self::new(generator, flags, model))
    }

    fn build_command(&self, messages: &[ChatMessage], request: &ChatRequest) -> CommandSpec {
        let sampling = request.sampling;
        let mut command = self
            .generator
            .command()
            .opt("--model", &self.model)
            .opt(&self.flags.max_tokens, sampling.max_tokens)
            .opt(&self.flags.temperature, sampling.temperature);
        if let Some(top_p) = &self.flags.top_p {
            command = command.opt(top_p, sampling.top_p);
        }

        match PromptPlan::for_messages(messages, &self.flags) {
            PromptPlan::NativeTemplate { system, user } => {
                command = command.opt_value("--prompt", user);
                if let Some(system) = system {
                    command = command.opt_value("--system-prompt", system);
                }
            }
            PromptPlan::Transcript(transcript) => {
                command = command.opt_value("--prompt", transcript);
                if self.flags.ignore_chat_template {
                    command = command.arg("--ignore-chat-template");
                }
            }
        }
        command
    }
}

#[async_trait]
impl ChatEnginePort for MlxLmEngine {
    fn input_mode(&self) -> ChatInputMode {
        ChatInputMode::Conversation
    }

    async fn generate(&self, request: ChatRequest) -> Result<String, ChatError> {
        let ChatInput::Conversation(messages) = &request.input else {
            return Err(ChatError::InvalidInput(
                "mlx-lm expects a conversation".to_string(),
            ));
        };

        let command = self.build_command(messages, &request);
        let output = run_checked(&command)
            .await
            .map_err(|e| ChatError::ProcessFailed(e.render("generation failed", SERVICE)))?;

        Ok(parse_generation_output(&output.stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::ChatSampling;

    fn flags(system_prompt: bool, ignore_chat_template: bool) -> GeneratorFlags {
        GeneratorFlags {
            temperature: "--temp".to_string(),
            max_tokens: "--max-tokens".to_string(),
            top_p: Some("--top-p".to_string()),
            ignore_chat_template,
            system_prompt,
        }
    }

    fn request(messages: Vec<ChatMessage>) -> ChatRequest {
        ChatRequest {
            input: ChatInput::Conversation(messages),
            sampling: ChatSampling {
                max_tokens: 64,
                temperature: 0.2,
                top_p: 0.9,
            },
        }
    }

    #[test]
    fn test_single_user_message_uses_native_template() {
        let messages = vec![ChatMessage::text(Role::User, "hi")];
        assert_eq!(
            PromptPlan::for_messages(&messages, &flags(false, false)),
            PromptPlan::NativeTemplate {
                system: None,
                user: "hi".to_string()
            }
        );
    }

    #[test]
    fn test_system_prompt_requires_support() {
        let messages = vec![
            ChatMessage::text(Role::System, "be brief"),
            ChatMessage::text(Role::User, "hi"),
        ];
        assert!(matches!(
            PromptPlan::for_messages(&messages, &flags(true, false)),
            PromptPlan::NativeTemplate { system: Some(_), .. }
        ));
        assert_eq!(
            PromptPlan::for_messages(&messages, &flags(false, false)),
            PromptPlan::Transcript("SYSTEM: be brief\nUSER: hi\nASSISTANT:".to_string())
        );
    }

    #[test]
    fn test_multi_turn_uses_transcript_and_ignores_template() {
        let engine = MlxLmEngine::new(Generator::new("mlx_lm.generate"), flags(true, true), "m");
        let messages = vec![
            ChatMessage::text(Role::User, "hi"),
            ChatMessage::text(Role::Assistant, "hello"),
            ChatMessage::text(Role::User, "again"),
        ];
        let command = engine.build_command(&messages, &request(messages.clone()));
        assert_eq!(
            command.args,
            vec![
                "--model",
                "m",
                "--max-tokens",
                "64",
                "--temp",
                "0.2",
                "--top-p",
                "0.9",
                "--prompt=USER: hi\nASSISTANT: hello\nUSER: again\nASSISTANT:",
                "--ignore-chat-template",
            ]
        );
    }

    #[test]
    fn test_native_command_with_system_prompt() {
        let engine = MlxLmEngine::new(Generator::new("mlx_lm.generate"), flags(true, true), "m");
        let messages = vec![
            ChatMessage::text(Role::System, "be brief"),
            ChatMessage::text(Role::User, "hi"),
        ];
        let command = engine.build_command(&messages, &request(messages.clone()));
        assert!(command
            .display()
            .ends_with("--prompt=hi --system-prompt=be brief"));
        assert!(!command.args.contains(&"--ignore-chat-template".to_string()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_load_and_generate_with_script() {
        use crate::infrastructure::adapters::test_support::script_generator;

        let dir = tempfile::tempdir().unwrap();
        let body = r#"case "$1" in
  --help) echo "usage: generate [--model M] [--prompt P] [--max-tokens N] [--temp T] [--top-p P]"; exit 0 ;;
esac
echo "=========="
echo "Hi there"
echo "=========="
echo "Prompt: 3 tokens""#;
        let generator = script_generator(dir.path(), "gen.sh", body);

        let engine = MlxLmEngine::load(Some(generator), "m").await.unwrap();
        let reply = engine
            .generate(request(vec![ChatMessage::text(Role::User, "hello")]))
            .await
            .unwrap();
        assert_eq!(reply, "Hi there");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dash_leading_prompt_reaches_generator() {
        use crate::infrastructure::adapters::test_support::script_generator;

        let dir = tempfile::tempdir().unwrap();
        // 回显 --prompt 的值
        let body = r#"case "$1" in
  --help) echo "usage: generate [--model M] [--prompt P] [--max-tokens N] [--temp T]"; exit 0 ;;
esac
prompt=""
while [ $# -gt 0 ]; do
  case "$1" in
    --prompt=*) prompt="${1#--prompt=}" ;;
    --prompt) echo "error: argument --prompt: expected one argument" >&2; exit 2 ;;
  esac
  shift
done
echo "=========="
echo "ECHO:$prompt"
echo "==========""#;
        let generator = script_generator(dir.path(), "gen.sh", body);

        let engine = MlxLmEngine::load(Some(generator), "m").await.unwrap();
        for content in ["-h", "--version"] {
            let reply = engine
                .generate(request(vec![ChatMessage::text(Role::User, content)]))
                .await
                .unwrap();
            assert_eq!(reply, format!("ECHO:{}", content));
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_load_fails_with_hint_for_broken_generator() {
        use crate::infrastructure::adapters::test_support::script_generator;

        let dir = tempfile::tempdir().unwrap();
        let generator = script_generator(
            dir.path(),
            "gen.sh",
            "echo \"ModuleNotFoundError: No module named 'mlx'\" >&2\nexit 1",
        );
        let err = MlxLmEngine::load(Some(generator), "m").await.err().unwrap();
        match err {
            ChatError::Unavailable(msg) => {
                assert!(msg.contains("bun run mlx:install -- --yes --upgrade"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_without_generator() {
        let err = MlxLmEngine::load(None, "m").await.err().unwrap();
        assert!(matches!(err, ChatError::Unavailable(msg) if msg.contains("mlx-lm")));
    }
}
