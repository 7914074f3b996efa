//! 子进程基础设施
//!
//! 生成器定位、能力探测、带输出捕获的执行以及修复提示

mod hints;
mod locate;
mod probe;
mod runner;

pub use hints::{install_hint, remediation_hint};
pub use locate::{resolve_generator, Generator, SearchPaths};
pub use probe::{help_mentions, read_help, GeneratorFlags, ProbeChain};
pub use runner::{run_captured, run_checked, CapturedOutput, CommandSpec, ProcessError};
