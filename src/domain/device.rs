//! 推理设备选择
//!
//! 请求的加速器不可用时回退到 CPU

/// 配置中请求的设备
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceRequest {
    Auto,
    #[default]
    Cpu,
    Cuda,
    Mps,
}

impl DeviceRequest {
    /// 宽松解析，未知值视为 cpu
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "auto" => DeviceRequest::Auto,
            "cuda" => DeviceRequest::Cuda,
            "mps" => DeviceRequest::Mps,
            _ => DeviceRequest::Cpu,
        }
    }
}

/// 实际使用的设备
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Cpu,
    Cuda,
    Mps,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Cpu => "cpu",
            Device::Cuda => "cuda",
            Device::Mps => "mps",
        }
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 主机加速器可用性
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcceleratorAvailability {
    pub cuda: bool,
    pub mps: bool,
}

/// 设备选择策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DevicePolicy {
    /// `auto` 时是否允许选择 MPS
    pub mps_on_auto: bool,
}

impl DevicePolicy {
    /// chatterbox 在 MPS 上不稳定，auto 时不选 MPS
    pub const CHATTERBOX: DevicePolicy = DevicePolicy { mps_on_auto: false };

    pub const DEFAULT: DevicePolicy = DevicePolicy { mps_on_auto: true };
}

/// 解析最终设备
pub fn resolve_device(
    requested: DeviceRequest,
    available: AcceleratorAvailability,
    policy: DevicePolicy,
) -> Device {
    match requested {
        DeviceRequest::Auto if available.cuda => Device::Cuda,
        DeviceRequest::Auto if available.mps && policy.mps_on_auto => Device::Mps,
        DeviceRequest::Cuda if available.cuda => Device::Cuda,
        DeviceRequest::Mps if available.mps => Device::Mps,
        _ => Device::Cpu,
    }
}
