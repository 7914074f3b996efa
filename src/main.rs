//! infergate - 本地推理网关
//!
//! 每个子命令启动一个独立的 HTTP 服务：
//! - kokomo / chatterbox: `POST /tts`
//! - mlx / vlm: `POST /v1/chat/completions`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use infergate::application::{
    ChatCompletionHandler, ChatDefaults, ChatEnginePort, ChatSampling, ModelBinding,
    SingleFlight, SpeechDefaults, SpeechEnginePort, SpeechSampling, SynthesizeHandler,
};
use infergate::config::{load_config, print_config, AppConfig, ConfigOverrides, ServiceKind};
use infergate::domain::{resolve_device, Device, DeviceRequest};
use infergate::infrastructure::adapters::{
    chatterbox_candidates, mlx_audio_candidates, mlx_lm_candidates, mlx_vlm_candidates,
    ChatterboxEngine, MlxAudioEngine, MlxLmEngine, MlxVlmEngine, WavCodec,
};
use infergate::infrastructure::detect_accelerators;
use infergate::infrastructure::http::{AppState, HttpServer, ServerConfig};
use infergate::infrastructure::process::{resolve_generator, Generator, ProbeChain, SearchPaths};

#[derive(Debug, Parser)]
#[command(name = "infergate", version, about = "Local HTTP gateways for ML inference backends")]
struct Cli {
    #[command(subcommand)]
    service: ServiceCommand,
}

#[derive(Debug, Subcommand)]
enum ServiceCommand {
    /// mlx-audio Kokoro TTS
    Kokomo(ServeArgs),
    /// Chatterbox TTS
    Chatterbox(ServeArgs),
    /// mlx-lm 文本对话
    Mlx(ServeArgs),
    /// mlx-vlm 视觉对话
    Vlm(ServeArgs),
}

impl ServiceCommand {
    fn split(self) -> (ServiceKind, ServeArgs) {
        match self {
            ServiceCommand::Kokomo(args) => (ServiceKind::Kokomo, args),
            ServiceCommand::Chatterbox(args) => (ServiceKind::Chatterbox, args),
            ServiceCommand::Mlx(args) => (ServiceKind::Mlx, args),
            ServiceCommand::Vlm(args) => (ServiceKind::Vlm, args),
        }
    }
}

#[derive(Debug, Args)]
struct ServeArgs {
    /// TOML 配置文件
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    port: Option<u16>,
    /// 绑定的模型 ID
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (kind, args) = Cli::parse().service.split();

    // 加载配置（优先级：命令行 > 环境变量 > 配置文件 > 默认值）
    let overrides = ConfigOverrides {
        host: args.host,
        port: args.port,
        model: args.model,
    };
    let config = load_config(kind, args.config.as_deref(), &overrides)
        .with_context(|| format!("Failed to load {} config", kind))?;

    init_tracing(&config);
    print_config(kind, &config);

    let paths = SearchPaths::from_env();
    let state = build_state(kind, &config, &paths).await?;

    let server = HttpServer::new(ServerConfig::new(&config.host, config.port), state);
    server
        .run_with_shutdown(shutdown_signal())
        .await
        .with_context(|| format!("Failed to serve on {}", config.addr()))?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// 初始化日志，`RUST_LOG` 优先
fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},infergate={},tower_http=debug",
        config.log_level, config.log_level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}

/// 按服务种类装配引擎与处理器
async fn build_state(
    kind: ServiceKind,
    config: &AppConfig,
    paths: &SearchPaths,
) -> anyhow::Result<AppState> {
    let state = match kind {
        ServiceKind::Kokomo => {
            let generator = locate(kind, config, &mlx_audio_candidates(), paths);
            let engine = Arc::new(MlxAudioEngine::new(generator, &config.model));
            speech_state(kind, config, engine)
        }
        ServiceKind::Chatterbox => {
            let device = select_device(kind, config, paths);
            let generator = locate(kind, config, &chatterbox_candidates(), paths);
            let engine = Arc::new(ChatterboxEngine::new(generator, device));
            speech_state(kind, config, engine)
        }
        ServiceKind::Mlx => {
            let generator = locate(kind, config, &mlx_lm_candidates(), paths);
            let engine = MlxLmEngine::load(generator, &config.model)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to load {} model {}:\n{}", kind, config.model, e))?;
            chat_state(kind, config, Arc::new(engine))
        }
        ServiceKind::Vlm => {
            let generator = locate(kind, config, &mlx_vlm_candidates(), paths);
            let engine = MlxVlmEngine::load(generator, &config.model)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to load {} model {}:\n{}", kind, config.model, e))?;
            chat_state(kind, config, Arc::new(engine))
        }
    };
    Ok(state)
}

fn locate(
    kind: ServiceKind,
    config: &AppConfig,
    candidates: &ProbeChain<&'static str>,
    paths: &SearchPaths,
) -> Option<Generator> {
    let generator = resolve_generator(config.generator.as_deref(), candidates, paths);
    match &generator {
        Some(generator) => tracing::info!(service = %kind, generator = %generator, "Generator resolved"),
        None => tracing::warn!(
            service = %kind,
            candidates = ?candidates.candidates(),
            "Generator not found; install it with `{}`",
            kind.install_command()
        ),
    }
    generator
}

fn select_device(kind: ServiceKind, config: &AppConfig, paths: &SearchPaths) -> Device {
    let requested = config.device_request();
    let device = resolve_device(requested, detect_accelerators(paths), kind.device_policy());
    let fell_back = matches!(requested, DeviceRequest::Cuda | DeviceRequest::Mps) && device == Device::Cpu;
    if fell_back {
        tracing::warn!(requested = %config.device, "Requested device unavailable, falling back to cpu");
    }
    tracing::info!(device = %device, "Device selected");
    device
}

fn speech_state(kind: ServiceKind, config: &AppConfig, engine: Arc<dyn SpeechEnginePort>) -> AppState {
    let defaults = SpeechDefaults {
        binding: ModelBinding::new(config.model.clone(), kind.env_prefix()),
        sampling: SpeechSampling {
            exaggeration: config.exaggeration,
            temperature: config.temperature,
            cfg_weight: config.cfg_weight,
        },
        chunk_size: config.chunk_size,
    };
    let handler = SynthesizeHandler::new(engine, Arc::new(WavCodec::new()), defaults);
    AppState::speech(kind, config.model.clone(), handler)
}

fn chat_state(kind: ServiceKind, config: &AppConfig, engine: Arc<dyn ChatEnginePort>) -> AppState {
    let guard = kind
        .serializes_generation()
        .then(|| Arc::new(SingleFlight::new()));
    let defaults = ChatDefaults {
        binding: ModelBinding::new(config.model.clone(), kind.env_prefix()),
        sampling: ChatSampling {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
        },
    };
    let handler = ChatCompletionHandler::new(engine, guard, defaults);
    AppState::chat(kind, config.model.clone(), handler)
}
