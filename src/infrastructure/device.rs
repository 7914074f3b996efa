//! 主机加速器探测

use std::path::Path;

use crate::domain::AcceleratorAvailability;
use crate::infrastructure::process::SearchPaths;

/// 探测 CUDA / MPS 是否可用
///
/// CUDA：存在 `/dev/nvidia0` 或能找到 `nvidia-smi`；MPS：Apple Silicon 上的 macOS
pub fn detect_accelerators(paths: &SearchPaths) -> AcceleratorAvailability {
    let cuda = Path::new("/dev/nvidia0").exists() || paths.find("nvidia-smi").is_some();
    let mps = cfg!(all(target_os = "macos", target_arch = "aarch64"));
    let available = AcceleratorAvailability { cuda, mps };
    tracing::debug!(cuda, mps, "Accelerators detected");
    available
}
