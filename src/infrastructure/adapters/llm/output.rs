//! 生成器标准输出解析

const SEPARATOR: &str = "==========";

/// 提取生成文本
///
/// 生成器用 `==========` 行包围生成结果（之后是统计信息）；
/// 取前两条分隔线之间的内容，没有分隔线时取整个输出
pub fn parse_generation_output(stdout: &str) -> String {
    let mut sections = stdout.split(SEPARATOR);
    match (sections.next(), sections.next(), sections.next()) {
        (Some(_), Some(generated), Some(_)) => generated.trim().to_string(),
        _ => stdout.trim().to_string(),
    }
}

/// 检查帮助文本是否像一个可用的生成器
pub fn looks_like_generator_help(help: &str) -> bool {
    crate::infrastructure::process::help_mentions(help, "--prompt")
}
