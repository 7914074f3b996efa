//! Configuration Module
//!
//! 每个服务进程独立加载配置，支持多层级配置来源：
//! - 命令行参数（最高优先级）
//! - 环境变量（服务前缀，如 `MLX_`）
//! - 配置文件（TOML 格式）
//! - 服务默认值（最低优先级）

mod loader;
mod types;

pub use loader::{config_summary, load_config, print_config, validate_config, ConfigError, ConfigOverrides};
pub use types::{AppConfig, ServiceFamily, ServiceKind};
