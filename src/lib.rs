//! infergate - 本地推理网关
//!
//! 架构设计: Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - 文本分块、WAV 拼接、Chat 消息模型、设备选择
//!
//! 应用层 (application/):
//! - Ports: SpeechEngine、ChatEngine、AudioCodec
//! - Commands: 合成 / 对话补全处理器
//! - SingleFlight: 生成调用串行化
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: 每个服务一个 axum Router
//! - Process: 生成器定位、能力探测、子进程执行
//! - Adapters: mlx-audio、chatterbox、mlx-lm、mlx-vlm 引擎与 WAV 编解码
//! - Device: 加速器探测

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig, ServiceKind};
