//! 音频编解码适配器

mod wav_codec;

pub use wav_codec::WavCodec;
