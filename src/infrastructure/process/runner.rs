//! 子进程执行
//!
//! 生成器以子进程方式运行，捕获 stdout / stderr。
//! 调用方的 future 被丢弃时子进程随之被杀掉。

use std::path::PathBuf;
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;

use super::hints::remediation_hint;

/// 子进程错误
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with {}", exit_label(.code))]
    Failed {
        command: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "a signal".to_string(),
    }
}

impl ProcessError {
    /// 渲染为 HTTP 500 响应正文
    ///
    /// 包含命令行、捕获的输出（优先 stderr）以及可识别时的修复提示
    pub fn render(&self, headline: &str, service: &str) -> String {
        match self {
            ProcessError::Spawn { command, source } => {
                format!("{}\ncommand: {}\n\n{}\n", headline, command, source)
            }
            ProcessError::Failed {
                command,
                stdout,
                stderr,
                ..
            } => {
                let output = if stderr.trim().is_empty() { stdout } else { stderr };
                let hint = remediation_hint(output, service)
                    .map(|hint| format!("\n{}", hint))
                    .unwrap_or_default();
                format!("{}\ncommand: {}\n\n{}\n{}", headline, command, output, hint)
            }
        }
    }
}

/// 待执行的命令
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// `--flag value`
    pub fn opt(self, flag: &str, value: impl ToString) -> Self {
        self.arg(flag).arg(value.to_string())
    }

    /// `--flag=value`
    ///
    /// 用于调用方提供的文本：以 `-` 开头的值不会被生成器当成选项
    pub fn opt_value(self, flag: &str, value: impl std::fmt::Display) -> Self {
        self.arg(format!("{}={}", flag, value))
    }

    /// 可读的命令行（仅用于日志和错误信息）
    pub fn display(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// 捕获的输出
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// 执行命令并捕获输出，不检查退出码
pub async fn run_captured(spec: &CommandSpec) -> Result<CapturedOutput, ProcessError> {
    let output = Command::new(&spec.program)
        .args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| ProcessError::Spawn {
            command: spec.display(),
            source,
        })?;

    Ok(CapturedOutput {
        success: output.status.success(),
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// 执行命令，非零退出视为失败
pub async fn run_checked(spec: &CommandSpec) -> Result<CapturedOutput, ProcessError> {
    tracing::debug!(command = %spec.display(), "Spawning generator");
    let output = run_captured(spec).await?;
    if !output.success {
        return Err(ProcessError::Failed {
            command: spec.display(),
            code: output.code,
            stdout: output.stdout,
            stderr: output.stderr,
        });
    }
    Ok(output)
}
