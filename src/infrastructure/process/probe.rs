//! 能力探测
//!
//! 不同版本的生成器在可执行文件名和参数拼写上不一致。
//! 启动时按顺序尝试候选项，选中的结果由调用方保存，之后不再探测。

use std::fmt::Debug;

use super::locate::Generator;
use super::runner::{run_captured, ProcessError};

/// 有序候选链
#[derive(Debug, Clone)]
pub struct ProbeChain<T> {
    label: &'static str,
    candidates: Vec<T>,
}

impl<T: Clone + Debug> ProbeChain<T> {
    pub fn new(label: &'static str, candidates: Vec<T>) -> Self {
        Self { label, candidates }
    }

    pub fn candidates(&self) -> &[T] {
        &self.candidates
    }

    /// 返回第一个探测成功的结果
    pub fn first_match<R>(&self, mut probe: impl FnMut(&T) -> Option<R>) -> Option<R> {
        for candidate in &self.candidates {
            if let Some(found) = probe(candidate) {
                tracing::debug!(probe = self.label, candidate = ?candidate, "Probe matched");
                return Some(found);
            }
        }
        None
    }

    /// 返回第一个被接受的候选项；全部失败时退回第一个并告警
    pub fn first_accepted_or_default(&self, mut accept: impl FnMut(&T) -> bool) -> Option<T> {
        if let Some(found) = self.first_match(|c| accept(c).then(|| c.clone())) {
            return Some(found);
        }
        let fallback = self.candidates.first().cloned();
        if let Some(fallback) = &fallback {
            tracing::warn!(
                probe = self.label,
                fallback = ?fallback,
                "No candidate matched, using the first spelling"
            );
        }
        fallback
    }
}

/// 帮助文本中是否出现了完整的参数名
///
/// `--temp` 不能匹配 `--temperature`
pub fn help_mentions(help: &str, flag: &str) -> bool {
    help.match_indices(flag).any(|(idx, _)| {
        let before_ok = help[..idx]
            .chars()
            .next_back()
            .map_or(true, |c| !(c.is_alphanumeric() || c == '-' || c == '_'));
        let after_ok = help[idx + flag.len()..]
            .chars()
            .next()
            .map_or(true, |c| !(c.is_alphanumeric() || c == '-' || c == '_'));
        before_ok && after_ok
    })
}

/// 读取 `<generator> --help` 的输出（stdout + stderr）
pub async fn read_help(generator: &Generator) -> Result<String, ProcessError> {
    let output = run_captured(&generator.command().arg("--help")).await?;
    Ok(format!("{}\n{}", output.stdout, output.stderr))
}

/// 生成器的参数拼写与可选能力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorFlags {
    pub temperature: String,
    pub max_tokens: String,
    /// 不支持时为 None，生成时省略
    pub top_p: Option<String>,
    /// 是否支持 `--ignore-chat-template`
    pub ignore_chat_template: bool,
    /// 是否支持 `--system-prompt`
    pub system_prompt: bool,
}

impl GeneratorFlags {
    /// 从帮助文本探测
    pub fn from_help(help: &str) -> Self {
        let spelling = |label: &'static str, candidates: &[&str]| {
            ProbeChain::new(label, candidates.iter().map(|c| c.to_string()).collect())
                .first_accepted_or_default(|flag| help_mentions(help, flag))
                .unwrap_or_default()
        };

        Self {
            temperature: spelling("temperature flag", &["--temp", "--temperature"]),
            max_tokens: spelling("max tokens flag", &["--max-tokens", "--max_tokens"]),
            top_p: ProbeChain::new("top-p flag", vec!["--top-p", "--top_p"])
                .first_match(|flag| help_mentions(help, flag).then(|| flag.to_string())),
            ignore_chat_template: help_mentions(help, "--ignore-chat-template"),
            system_prompt: help_mentions(help, "--system-prompt"),
        }
    }
}
