//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod codec;
pub mod llm;
pub mod tts;

#[cfg(test)]
pub(crate) mod test_support;

pub use codec::*;
pub use llm::*;
pub use tts::*;
