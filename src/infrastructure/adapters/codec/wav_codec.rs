//! WAV Codec - 基于 symphonia 的 WAV 编解码
//!
//! 支持：
//! - WAV 头解析（识别整型 PCM 与 IEEE 浮点）
//! - WAV → 交错 f32 样本
//! - 交错 f32 样本 → 16 位 PCM 或 32 位浮点 WAV

use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::AudioCodecPort;
use crate::domain::{AudioError, SampleFormat, Waveform};

const WAVE_FORMAT_PCM: u16 = 0x0001;
const WAVE_FORMAT_IEEE_FLOAT: u16 = 0x0003;
const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// WAV 编解码器
#[derive(Debug, Default, Clone, Copy)]
pub struct WavCodec;

#[derive(Debug)]
struct FmtChunk {
    audio_format: u16,
    num_channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
}

impl FmtChunk {
    /// 拼接后输出使用的样本格式
    fn sample_format(&self) -> SampleFormat {
        if self.audio_format == WAVE_FORMAT_IEEE_FLOAT {
            SampleFormat::Float32
        } else {
            SampleFormat::Pcm16
        }
    }
}

fn read_u16(data: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([data[at], data[at + 1]])
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

impl WavCodec {
    pub fn new() -> Self {
        Self
    }

    /// 解析 fmt chunk
    fn parse_fmt(&self, data: &[u8]) -> Result<FmtChunk, AudioError> {
        if data.len() < 12 {
            return Err(AudioError::InvalidInput("WAV data too short".to_string()));
        }
        if &data[0..4] != b"RIFF" {
            return Err(AudioError::InvalidInput(
                "Invalid WAV: missing RIFF header".to_string(),
            ));
        }
        if &data[8..12] != b"WAVE" {
            return Err(AudioError::InvalidInput(
                "Invalid WAV: missing WAVE identifier".to_string(),
            ));
        }

        let mut pos = 12;
        while pos + 8 <= data.len() {
            let chunk_id = &data[pos..pos + 4];
            let chunk_size = read_u32(data, pos + 4) as usize;
            let body = pos + 8;

            if chunk_id == b"fmt " {
                if chunk_size < 16 || body + 16 > data.len() {
                    return Err(AudioError::InvalidInput(
                        "Invalid fmt chunk size".to_string(),
                    ));
                }
                let mut audio_format = read_u16(data, body);
                // 扩展格式的真实编码在子格式 GUID 的前两个字节
                if audio_format == WAVE_FORMAT_EXTENSIBLE
                    && chunk_size >= 40
                    && body + 26 <= data.len()
                {
                    audio_format = read_u16(data, body + 24);
                }
                return Ok(FmtChunk {
                    audio_format,
                    num_channels: read_u16(data, body + 2),
                    sample_rate: read_u32(data, body + 4),
                    bits_per_sample: read_u16(data, body + 14),
                });
            }

            // 对齐到偶数字节
            pos = body + chunk_size + (chunk_size % 2);
        }

        Err(AudioError::InvalidInput(
            "Invalid WAV: missing fmt chunk".to_string(),
        ))
    }

    /// 使用 symphonia 解码为交错 f32 样本
    fn decode_samples(&self, data: &[u8]) -> Result<(Vec<f32>, u32, u16), AudioError> {
        let cursor = Cursor::new(data.to_vec());
        let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

        let mut hint = Hint::new();
        hint.with_extension("wav");

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| AudioError::DecodingError(format!("Probe failed: {}", e)))?;

        let mut format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| AudioError::DecodingError("No audio track found".to_string()))?;

        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| AudioError::DecodingError("Unknown sample rate".to_string()))?;

        let channels = track
            .codec_params
            .channels
            .map(|c| c.count() as u16)
            .ok_or_else(|| AudioError::DecodingError("Unknown channel count".to_string()))?;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| AudioError::DecodingError(format!("Decoder creation failed: {}", e)))?;

        let track_id = track.id;
        let mut samples: Vec<f32> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(symphonia::core::errors::Error::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => {
                    return Err(AudioError::DecodingError(format!(
                        "Packet read error: {}",
                        e
                    )));
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(e) => {
                    tracing::warn!("Decode error (skipping packet): {}", e);
                    continue;
                }
            };

            let spec = *decoded.spec();
            let num_frames = decoded.frames();
            let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
            sample_buf.copy_interleaved_ref(decoded);
            let actual_samples = num_frames * spec.channels.count();
            samples.extend(&sample_buf.samples()[..actual_samples]);
        }

        Ok((samples, sample_rate, channels))
    }

    fn write_header(
        &self,
        wav: &mut Vec<u8>,
        audio_format: u16,
        waveform: &Waveform,
        data_size: usize,
    ) -> Result<(), AudioError> {
        let bits_per_sample = waveform.format.bits_per_sample();
        let bytes_per_sample = bits_per_sample / 8;
        let block_align = waveform.channels * bytes_per_sample;
        let byte_rate = waveform.sample_rate * block_align as u32;
        let file_size = u32::try_from(36 + data_size).map_err(|_| {
            AudioError::EncodingError("audio too large for a WAV container".to_string())
        })?;

        // RIFF header
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&file_size.to_le_bytes());
        wav.extend_from_slice(b"WAVE");

        // fmt chunk
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&audio_format.to_le_bytes());
        wav.extend_from_slice(&waveform.channels.to_le_bytes());
        wav.extend_from_slice(&waveform.sample_rate.to_le_bytes());
        wav.extend_from_slice(&byte_rate.to_le_bytes());
        wav.extend_from_slice(&block_align.to_le_bytes());
        wav.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&(data_size as u32).to_le_bytes());
        Ok(())
    }
}

impl AudioCodecPort for WavCodec {
    fn decode(&self, wav_data: &[u8]) -> Result<Waveform, AudioError> {
        let fmt = self.parse_fmt(wav_data)?;
        if fmt.audio_format != WAVE_FORMAT_PCM && fmt.audio_format != WAVE_FORMAT_IEEE_FLOAT {
            return Err(AudioError::DecodingError(format!(
                "unsupported WAV encoding 0x{:04x}",
                fmt.audio_format
            )));
        }

        let (samples, sample_rate, channels) = self.decode_samples(wav_data)?;

        tracing::trace!(
            sample_rate,
            channels,
            bits_per_sample = fmt.bits_per_sample,
            header_channels = fmt.num_channels,
            header_rate = fmt.sample_rate,
            samples = samples.len(),
            "Decoded WAV"
        );

        Ok(Waveform::new(samples, sample_rate, channels, fmt.sample_format()))
    }

    fn encode(&self, waveform: &Waveform) -> Result<Vec<u8>, AudioError> {
        if waveform.channels == 0 || waveform.sample_rate == 0 {
            return Err(AudioError::InvalidInput(
                "waveform has no channels or sample rate".to_string(),
            ));
        }

        let bytes_per_sample = (waveform.format.bits_per_sample() / 8) as usize;
        let data_size = waveform.samples.len() * bytes_per_sample;
        let mut wav = Vec::with_capacity(44 + data_size);

        match waveform.format {
            SampleFormat::Pcm16 => {
                self.write_header(&mut wav, WAVE_FORMAT_PCM, waveform, data_size)?;
                for &s in &waveform.samples {
                    let clamped = s.clamp(-1.0, 1.0);
                    wav.extend_from_slice(&((clamped * 32767.0) as i16).to_le_bytes());
                }
            }
            SampleFormat::Float32 => {
                self.write_header(&mut wav, WAVE_FORMAT_IEEE_FLOAT, waveform, data_size)?;
                for &s in &waveform.samples {
                    wav.extend_from_slice(&s.to_le_bytes());
                }
            }
        }

        Ok(wav)
    }
}
