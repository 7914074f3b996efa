//! TTS Adapter - 语音生成器子进程实现

mod chatterbox_engine;
#[cfg(test)]
mod fake_speech_engine;
mod mlx_audio_engine;
mod output;

pub use chatterbox_engine::{chatterbox_candidates, ChatterboxEngine};
#[cfg(test)]
pub use fake_speech_engine::FakeSpeechEngine;
pub use mlx_audio_engine::{mlx_audio_candidates, MlxAudioEngine};
