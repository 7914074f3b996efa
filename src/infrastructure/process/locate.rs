//! 可执行文件定位
//!
//! 先查 venv 的 bin 目录，再查 PATH

use std::path::{Path, PathBuf};

use super::probe::ProbeChain;
use super::runner::CommandSpec;

/// 可执行文件搜索路径
#[derive(Debug, Clone, Default)]
pub struct SearchPaths {
    /// 优先目录：`$VIRTUAL_ENV/bin`、当前可执行文件所在目录
    preferred: Vec<PathBuf>,
    /// `PATH` 中的目录
    path: Vec<PathBuf>,
}

impl SearchPaths {
    pub fn new(preferred: Vec<PathBuf>, path: Vec<PathBuf>) -> Self {
        Self { preferred, path }
    }

    /// 从当前进程环境构造
    pub fn from_env() -> Self {
        let mut preferred = Vec::new();
        if let Some(venv) = std::env::var_os("VIRTUAL_ENV") {
            preferred.push(PathBuf::from(venv).join("bin"));
        }
        if let Some(dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            preferred.push(dir);
        }

        let path = std::env::var_os("PATH")
            .map(|p| std::env::split_paths(&p).collect())
            .unwrap_or_default();

        Self { preferred, path }
    }

    /// 按候选顺序查找；所有候选先在优先目录中查找，再查 PATH
    pub fn find_first(&self, chain: &ProbeChain<&'static str>) -> Option<PathBuf> {
        chain
            .first_match(|name| find_in(&self.preferred, name))
            .or_else(|| chain.first_match(|name| find_in(&self.path, name)))
    }

    /// 查找单个名称
    pub fn find(&self, name: &str) -> Option<PathBuf> {
        find_in(&self.preferred, name).or_else(|| find_in(&self.path, name))
    }
}

fn find_in(dirs: &[PathBuf], name: &str) -> Option<PathBuf> {
    dirs.iter()
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// 生成器命令前缀
///
/// 通常只有可执行文件；也可以是 `python3 -m mlx_lm.generate` 这样的多段命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generator {
    pub program: PathBuf,
    pub leading_args: Vec<String>,
}

impl Generator {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    pub fn with_args(program: impl Into<PathBuf>, leading_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            leading_args,
        }
    }

    /// 以前缀开始构造命令
    pub fn command(&self) -> CommandSpec {
        self.leading_args
            .iter()
            .fold(CommandSpec::new(&self.program), |spec, arg| spec.arg(arg.as_str()))
    }
}

impl std::fmt::Display for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.command().display())
    }
}

/// 解析生成器
///
/// 配置了 `generator` 时直接使用（按空白切分，首段裸名称会在搜索路径中查找），否则按候选链探测
pub fn resolve_generator(
    configured: Option<&str>,
    candidates: &ProbeChain<&'static str>,
    paths: &SearchPaths,
) -> Option<Generator> {
    let configured = configured.map(str::trim).filter(|c| !c.is_empty());
    let Some(configured) = configured else {
        return paths.find_first(candidates).map(Generator::new);
    };

    let mut parts = configured.split_whitespace().map(str::to_string);
    let program = parts.next()?;
    let leading_args: Vec<String> = parts.collect();
    let program = if program.contains(std::path::MAIN_SEPARATOR) {
        PathBuf::from(program)
    } else {
        paths.find(&program).unwrap_or_else(|| PathBuf::from(program))
    };
    Some(Generator::with_args(program, leading_args))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn touch(dir: &Path, name: &str, executable: bool) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, "#!/bin/sh\n").unwrap();
        let mode = if executable { 0o755 } else { 0o644 };
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    fn chain() -> ProbeChain<&'static str> {
        ProbeChain::new("generator", vec!["mlx_lm.generate", "mlx-lm.generate"])
    }

    #[test]
    fn test_venv_bin_wins_over_path() {
        let venv = tempfile::tempdir().unwrap();
        let path_dir = tempfile::tempdir().unwrap();
        // PATH 中有首选名称，venv 中只有第二候选
        touch(path_dir.path(), "mlx_lm.generate", true);
        let expected = touch(venv.path(), "mlx-lm.generate", true);

        let paths = SearchPaths::new(
            vec![venv.path().to_path_buf()],
            vec![path_dir.path().to_path_buf()],
        );
        assert_eq!(paths.find_first(&chain()), Some(expected));
    }

    #[test]
    fn test_candidate_order_within_path() {
        let path_dir = tempfile::tempdir().unwrap();
        touch(path_dir.path(), "mlx-lm.generate", true);
        let expected = touch(path_dir.path(), "mlx_lm.generate", true);

        let paths = SearchPaths::new(Vec::new(), vec![path_dir.path().to_path_buf()]);
        assert_eq!(paths.find_first(&chain()), Some(expected));
    }

    #[test]
    fn test_non_executable_skipped() {
        let path_dir = tempfile::tempdir().unwrap();
        touch(path_dir.path(), "mlx_lm.generate", false);

        let paths = SearchPaths::new(Vec::new(), vec![path_dir.path().to_path_buf()]);
        assert_eq!(paths.find_first(&chain()), None);
    }

    #[test]
    fn test_configured_generator_bypasses_discovery() {
        let paths = SearchPaths::default();
        assert_eq!(
            resolve_generator(Some("/opt/bin/custom-gen"), &chain(), &paths),
            Some(Generator::new("/opt/bin/custom-gen"))
        );
        let module = resolve_generator(Some("/usr/bin/python3 -m mlx_lm.generate"), &chain(), &paths)
            .unwrap();
        assert_eq!(module.program, PathBuf::from("/usr/bin/python3"));
        assert_eq!(module.leading_args, vec!["-m", "mlx_lm.generate"]);
        assert_eq!(
            module.command().arg("--help").display(),
            "/usr/bin/python3 -m mlx_lm.generate --help"
        );
        assert_eq!(resolve_generator(None, &chain(), &paths), None);
        assert_eq!(resolve_generator(Some("  "), &chain(), &paths), None);
    }
}
