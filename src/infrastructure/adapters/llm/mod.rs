//! LLM Adapter - 文本 / 视觉生成器子进程实现

#[cfg(test)]
mod fake_chat_engine;
mod mlx_lm_engine;
mod mlx_vlm_engine;
mod output;

#[cfg(test)]
pub use fake_chat_engine::FakeChatEngine;
pub use mlx_lm_engine::{mlx_lm_candidates, MlxLmEngine, PromptPlan};
pub use mlx_vlm_engine::{mlx_vlm_candidates, MlxVlmEngine};
pub use output::parse_generation_output;
