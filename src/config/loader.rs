//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 命令行参数
//! 2. 环境变量（`<PREFIX>_<KEY>`）
//! 3. 配置文件（infergate.<service>.toml）
//! 4. 服务默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, ServiceKind};

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 命令行覆盖项
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub model: Option<String>,
}

/// 加载指定服务的配置
///
/// # 环境变量示例
/// - `KOKOMO_PORT=9000`
/// - `CHATTERBOX_CFG_WEIGHT=0.3`
/// - `MLX_MODEL=mlx-community/Qwen2.5-7B-Instruct-4bit`
/// - `VLM_LOG_JSON=true`
///
/// 未指定 `config_path` 时搜索 `infergate.<service>.toml` 与 `infergate.<service>.local.toml`
pub fn load_config(
    kind: ServiceKind,
    config_path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<AppConfig, ConfigError> {
    let defaults = AppConfig::defaults_for(kind);
    let mut builder = Config::builder();

    // 1. 服务默认值（最低优先级）
    builder = builder
        .set_default("host", defaults.host.as_str())?
        .set_default("port", i64::from(defaults.port))?
        .set_default("model", defaults.model.as_str())?
        .set_default("device", defaults.device.as_str())?
        .set_default("temperature", defaults.temperature)?
        .set_default("top_p", defaults.top_p)?
        .set_default("max_tokens", i64::from(defaults.max_tokens))?
        .set_default("exaggeration", defaults.exaggeration)?
        .set_default("cfg_weight", defaults.cfg_weight)?
        .set_default("log_level", defaults.log_level.as_str())?
        .set_default("log_json", defaults.log_json)?;
    if let Some(chunk_size) = defaults.chunk_size {
        builder = builder.set_default("chunk_size", chunk_size as i64)?;
    }

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in [
            format!("infergate.{}", kind.name()),
            format!("infergate.{}.local", kind.name()),
        ] {
            builder = builder.add_source(File::with_name(&name).required(false));
        }
    }

    // 3. 环境变量，键是扁平的: KOKOMO_CHUNK_SIZE -> chunk_size
    builder = builder.add_source(
        Environment::with_prefix(kind.env_prefix())
            .prefix_separator("_")
            .try_parsing(true),
    );

    // 4. 命令行参数（最高优先级）
    builder = builder
        .set_override_option("host", overrides.host.clone())?
        .set_override_option("port", overrides.port.map(i64::from))?
        .set_override_option("model", overrides.model.clone())?;

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.host.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Server host cannot be empty".to_string(),
        ));
    }

    if config.model.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Model id cannot be empty".to_string(),
        ));
    }

    if config.chunk_size == Some(0) {
        return Err(ConfigError::ValidationError(
            "Chunk size cannot be 0".to_string(),
        ));
    }

    if config.max_tokens == 0 {
        return Err(ConfigError::ValidationError(
            "max_tokens must be positive".to_string(),
        ));
    }

    Ok(())
}

/// 启动日志中展示的配置项
///
/// 只列出该服务实际使用的键；设备只对 chatterbox 生效
pub fn config_summary(kind: ServiceKind, config: &AppConfig) -> Vec<(&'static str, String)> {
    let mut lines = vec![
        ("Server", config.addr()),
        ("Model", config.model.clone()),
    ];
    if let Some(generator) = &config.generator {
        lines.push(("Generator", generator.clone()));
    }
    match kind {
        ServiceKind::Kokomo | ServiceKind::Chatterbox => {
            lines.push(("Temperature", config.temperature.to_string()));
            if kind == ServiceKind::Chatterbox {
                lines.push(("Device", config.device.clone()));
                lines.push(("Exaggeration", config.exaggeration.to_string()));
                lines.push(("CFG Weight", config.cfg_weight.to_string()));
            }
            let chunk_size = config
                .chunk_size
                .map(|size| size.to_string())
                .unwrap_or_else(|| "disabled".to_string());
            lines.push(("Chunk Size", chunk_size));
        }
        ServiceKind::Mlx | ServiceKind::Vlm => {
            lines.push(("Temperature", config.temperature.to_string()));
            lines.push(("Top P", config.top_p.to_string()));
            lines.push(("Max Tokens", config.max_tokens.to_string()));
        }
    }
    lines.push(("Log Level", config.log_level.clone()));
    lines
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(kind: ServiceKind, config: &AppConfig) {
    tracing::info!("=== {} Configuration ===", kind);
    for (label, value) in config_summary(kind, config) {
        tracing::info!("{}: {}", label, value);
    }
    tracing::info!("=================================");
}
