//! Configuration Types
//!
//! 定义服务种类与配置结构体

use serde::Deserialize;

use crate::domain::{DevicePolicy, DeviceRequest};

/// 服务种类（每种一个独立进程）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    /// mlx-audio Kokoro TTS
    Kokomo,
    /// Chatterbox TTS
    Chatterbox,
    /// mlx-lm 文本对话
    Mlx,
    /// mlx-vlm 视觉对话
    Vlm,
}

/// 接口族
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceFamily {
    /// `POST /tts`，纯文本错误
    Tts,
    /// `POST /v1/chat/completions`，JSON 错误
    Chat,
}

impl ServiceKind {
    pub fn name(&self) -> &'static str {
        match self {
            ServiceKind::Kokomo => "kokomo",
            ServiceKind::Chatterbox => "chatterbox",
            ServiceKind::Mlx => "mlx",
            ServiceKind::Vlm => "vlm",
        }
    }

    pub fn family(&self) -> ServiceFamily {
        match self {
            ServiceKind::Kokomo | ServiceKind::Chatterbox => ServiceFamily::Tts,
            ServiceKind::Mlx | ServiceKind::Vlm => ServiceFamily::Chat,
        }
    }

    /// 环境变量前缀，例如 `KOKOMO_PORT`
    pub fn env_prefix(&self) -> &'static str {
        match self {
            ServiceKind::Kokomo => "KOKOMO",
            ServiceKind::Chatterbox => "CHATTERBOX",
            ServiceKind::Mlx => "MLX",
            ServiceKind::Vlm => "VLM",
        }
    }

    /// `GET /` 返回的横幅
    pub fn banner(&self) -> &'static str {
        match self {
            ServiceKind::Kokomo => "infergate kokomo mlx tts server\n",
            ServiceKind::Chatterbox => "infergate chatterbox tts server\n",
            ServiceKind::Mlx => "infergate mlx llm server\n",
            ServiceKind::Vlm => "infergate mlx vlm server\n",
        }
    }

    /// 安装提示中使用的命令
    pub fn install_command(&self) -> String {
        format!("bun run {}:install -- --yes", self.name())
    }

    pub fn device_policy(&self) -> DevicePolicy {
        match self {
            ServiceKind::Chatterbox => DevicePolicy::CHATTERBOX,
            _ => DevicePolicy::DEFAULT,
        }
    }

    /// 是否需要串行化生成调用
    pub fn serializes_generation(&self) -> bool {
        matches!(self, ServiceKind::Mlx)
    }

    pub fn default_port(&self) -> u16 {
        match self {
            ServiceKind::Kokomo => 8880,
            ServiceKind::Chatterbox => 8890,
            ServiceKind::Mlx => 12345,
            ServiceKind::Vlm => 12346,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ServiceKind::Kokomo => "mlx-community/Kokoro-82M-bf16",
            ServiceKind::Chatterbox => "ResembleAI/chatterbox",
            ServiceKind::Mlx => "mlx-community/Llama-3.2-3B-Instruct-4bit",
            ServiceKind::Vlm => "mlx-community/llava-v1.6-mistral-7b-4bit",
        }
    }

    pub fn default_temperature(&self) -> f64 {
        match self.family() {
            ServiceFamily::Tts => 0.7,
            ServiceFamily::Chat => 0.2,
        }
    }

    /// 默认分块大小；kokomo 由 mlx-audio 自行拼接，不分块
    pub fn default_chunk_size(&self) -> Option<usize> {
        match self {
            ServiceKind::Chatterbox => Some(250),
            _ => None,
        }
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 单个服务进程的配置
///
/// 键是扁平的，以便与 `<PREFIX>_<KEY>` 环境变量一一对应
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    pub port: u16,

    /// 绑定的模型 ID
    pub model: String,

    /// 设备：auto / cpu / cuda / mps
    #[serde(default = "default_device")]
    pub device: String,

    /// 生成器可执行文件（为空时自动探测）
    #[serde(default)]
    pub generator: Option<String>,

    /// 采样温度
    pub temperature: f64,

    /// nucleus 采样
    #[serde(default = "default_top_p")]
    pub top_p: f64,

    /// 最大生成 token 数
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// chatterbox 情感夸张度
    #[serde(default = "default_exaggeration")]
    pub exaggeration: f64,

    /// chatterbox CFG 权重
    #[serde(default = "default_cfg_weight")]
    pub cfg_weight: f64,

    /// TTS 分块字符数
    #[serde(default)]
    pub chunk_size: Option<usize>,

    /// 日志级别
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// 是否输出 JSON 日志
    #[serde(default)]
    pub log_json: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_device() -> String {
    "cpu".to_string()
}

fn default_top_p() -> f64 {
    0.9
}

fn default_max_tokens() -> u32 {
    256
}

fn default_exaggeration() -> f64 {
    1.0
}

fn default_cfg_weight() -> f64 {
    0.5
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// 指定服务的默认配置
    pub fn defaults_for(kind: ServiceKind) -> Self {
        Self {
            host: default_host(),
            port: kind.default_port(),
            model: kind.default_model().to_string(),
            device: default_device(),
            generator: None,
            temperature: kind.default_temperature(),
            top_p: default_top_p(),
            max_tokens: default_max_tokens(),
            exaggeration: default_exaggeration(),
            cfg_weight: default_cfg_weight(),
            chunk_size: kind.default_chunk_size(),
            log_level: default_log_level(),
            log_json: false,
        }
    }

    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn device_request(&self) -> DeviceRequest {
        DeviceRequest::parse_lenient(&self.device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_per_service() {
        let kokomo = AppConfig::defaults_for(ServiceKind::Kokomo);
        assert_eq!(kokomo.port, 8880);
        assert_eq!(kokomo.model, "mlx-community/Kokoro-82M-bf16");
        assert_eq!(kokomo.chunk_size, None);

        let chatterbox = AppConfig::defaults_for(ServiceKind::Chatterbox);
        assert_eq!(chatterbox.port, 8890);
        assert_eq!(chatterbox.chunk_size, Some(250));
        assert_eq!(chatterbox.temperature, 0.7);
        assert_eq!(chatterbox.exaggeration, 1.0);
        assert_eq!(chatterbox.cfg_weight, 0.5);

        let mlx = AppConfig::defaults_for(ServiceKind::Mlx);
        assert_eq!(mlx.port, 12345);
        assert_eq!(mlx.temperature, 0.2);
        assert_eq!(mlx.top_p, 0.9);
        assert_eq!(mlx.max_tokens, 256);

        let vlm = AppConfig::defaults_for(ServiceKind::Vlm);
        assert_eq!(vlm.port, 12346);
        assert_eq!(vlm.model, "mlx-community/llava-v1.6-mistral-7b-4bit");
    }

    #[test]
    fn test_addr() {
        let config = AppConfig::defaults_for(ServiceKind::Mlx);
        assert_eq!(config.addr(), "127.0.0.1:12345");
    }

    #[test]
    fn test_only_mlx_serializes() {
        assert!(ServiceKind::Mlx.serializes_generation());
        assert!(!ServiceKind::Vlm.serializes_generation());
        assert!(!ServiceKind::Chatterbox.serializes_generation());
    }
}
