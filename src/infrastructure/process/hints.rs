//! 缺失依赖的修复提示

/// 缺失即需 `--upgrade` 重新安装的运行时模块
const RUNTIME_MODULES: &[&str] = &[
    "soundfile",
    "scipy",
    "sounddevice",
    "loguru",
    "misaki",
    "torch",
    "torchaudio",
    "mlx",
    "PIL",
];

fn missing_module(output: &str, module: &str) -> bool {
    output.contains(&format!("No module named '{}'", module))
        || output.contains(&format!("No module named {}", module))
}

/// 根据生成器输出识别已知的缺失依赖，返回修复提示
pub fn remediation_hint(output: &str, service: &str) -> Option<String> {
    if missing_module(output, "pip") {
        return Some(format!(
            "Hint: your venv is missing pip. Run:\n  bun run {}:install -- --yes --force\n",
            service
        ));
    }
    if RUNTIME_MODULES.iter().any(|m| missing_module(output, m)) {
        return Some(format!(
            "Hint: your venv is missing runtime deps. Run:\n  bun run {}:install -- --yes --upgrade\n",
            service
        ));
    }
    None
}

/// 生成器未找到时的安装提示
pub fn install_hint(service: &str, package: &str) -> String {
    format!(
        "{} generator not found. Install {} in your venv:\n  bun run {}:install -- --yes\n",
        package, package, service
    )
}
