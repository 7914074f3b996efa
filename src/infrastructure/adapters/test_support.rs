//! 测试用的假生成器脚本

use std::path::Path;

use crate::infrastructure::process::Generator;

/// 在 `dir` 中写入 shell 脚本，返回以 `sh <script>` 运行的生成器
///
/// 通过 `sh` 执行而非直接 exec 脚本，避免并发测试中的 ETXTBSY
pub fn script_generator(dir: &Path, name: &str, body: &str) -> Generator {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    Generator::with_args("sh", vec![path.display().to_string()])
}

/// 写入一个小的 16 位 PCM WAV 夹具
pub fn write_fixture_wav(path: &Path, frames: usize, sample_rate: u32) {
    use crate::application::ports::AudioCodecPort;
    use crate::domain::{SampleFormat, Waveform};
    use crate::infrastructure::adapters::WavCodec;

    let waveform = Waveform::new(vec![0.25; frames], sample_rate, 1, SampleFormat::Pcm16);
    let wav = WavCodec::new().encode(&waveform).unwrap();
    std::fs::write(path, wav).unwrap();
}
