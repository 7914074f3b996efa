//! 生成器输出文件的发现与诊断

use std::path::{Path, PathBuf};

/// 列出目录中的文件名（排序）
pub async fn list_files(dir: &Path) -> Vec<String> {
    let mut names = Vec::new();
    if let Ok(mut entries) = tokio::fs::read_dir(dir).await {
        while let Ok(Some(entry)) = entries.next_entry().await {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    names
}

/// 查找生成器写出的 WAV
///
/// 优先 `<stem>.wav`，其次排序后最后一个 `<stem>*.wav`，再其次任意 `*.wav`
pub async fn discover_wav(dir: &Path, stem: &str) -> Option<PathBuf> {
    let exact = dir.join(format!("{}.wav", stem));
    if tokio::fs::metadata(&exact).await.is_ok_and(|m| m.is_file()) {
        return Some(exact);
    }

    let wavs: Vec<String> = list_files(dir)
        .await
        .into_iter()
        .filter(|name| name.to_lowercase().ends_with(".wav"))
        .collect();

    wavs.iter()
        .filter(|name| name.starts_with(stem))
        .last()
        .or_else(|| wavs.last())
        .map(|name| dir.join(name))
}

/// 未产出音频时的诊断信息
pub fn missing_output_report(dir: &Path, files: &[String], stdout: &str, stderr: &str) -> String {
    let or_empty = |s: &str| {
        let s = s.trim();
        if s.is_empty() {
            "(empty)".to_string()
        } else {
            s.to_string()
        }
    };
    format!(
        "tts failed: no output wav produced\ntmpdir: {}\nfiles: {:?}\nstdout: {}\nstderr: {}\n",
        dir.display(),
        files,
        or_empty(stdout),
        or_empty(stderr)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_exact_name_preferred() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("out_000.wav"), b"a").unwrap();
        std::fs::write(dir.path().join("out.wav"), b"b").unwrap();
        assert_eq!(
            discover_wav(dir.path(), "out").await,
            Some(dir.path().join("out.wav"))
        );
    }

    #[tokio::test]
    async fn test_last_prefixed_then_any() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("out_000.wav"), b"a").unwrap();
        std::fs::write(dir.path().join("out_001.wav"), b"a").unwrap();
        std::fs::write(dir.path().join("zzz.wav"), b"a").unwrap();
        assert_eq!(
            discover_wav(dir.path(), "out").await,
            Some(dir.path().join("out_001.wav"))
        );

        let other = tempfile::tempdir().unwrap();
        std::fs::write(other.path().join("audio.wav"), b"a").unwrap();
        std::fs::write(other.path().join("log.txt"), b"a").unwrap();
        assert_eq!(
            discover_wav(other.path(), "out").await,
            Some(other.path().join("audio.wav"))
        );
    }

    #[tokio::test]
    async fn test_nothing_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("log.txt"), b"a").unwrap();
        assert_eq!(discover_wav(dir.path(), "out").await, None);
        assert_eq!(list_files(dir.path()).await, vec!["log.txt"]);
    }

    #[test]
    fn test_report_marks_empty_streams() {
        let report = missing_output_report(
            Path::new("/tmp/x"),
            &["log.txt".to_string()],
            "",
            "warning: slow\n",
        );
        assert!(report.starts_with("tts failed: no output wav produced\n"));
        assert!(report.contains("files: [\"log.txt\"]"));
        assert!(report.contains("stdout: (empty)"));
        assert!(report.contains("stderr: warning: slow"));
    }
}
