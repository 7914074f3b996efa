//! Data Transfer Objects
//!
//! 请求体在边界处解析为强类型结构，类型错误的字段直接拒绝

use serde::{Deserialize, Deserializer, Serialize};

use crate::application::{ChatCompletionCommand, ChatCompletionResponse, SynthesizeCommand};
use crate::domain::ChatMessage;

// ============================================================================
// TTS
// ============================================================================

/// `POST /tts` JSON 请求体
///
/// `text` 与 `input`、`voice` 与 `audio_prompt_path` 互为别名，前者优先
#[derive(Debug, Default, Deserialize)]
pub struct SynthesizeRequest {
    pub text: Option<String>,
    pub input: Option<String>,
    pub model: Option<String>,
    pub voice: Option<String>,
    pub audio_prompt_path: Option<String>,
    pub exaggeration: Option<f64>,
    pub temperature: Option<f64>,
    pub cfg_weight: Option<f64>,
    pub chunk_size: Option<usize>,
}

fn first_non_empty(primary: Option<String>, alias: Option<String>) -> Option<String> {
    primary.filter(|s| !s.is_empty()).or(alias)
}

impl SynthesizeRequest {
    /// 非 JSON 请求：整个正文就是文本
    pub fn raw_text(body: &[u8]) -> Self {
        Self {
            text: Some(String::from_utf8_lossy(body).into_owned()),
            ..Default::default()
        }
    }

    pub fn into_command(self) -> SynthesizeCommand {
        SynthesizeCommand {
            text: first_non_empty(self.text, self.input).unwrap_or_default(),
            model: self.model,
            voice: first_non_empty(self.voice, self.audio_prompt_path),
            exaggeration: self.exaggeration,
            temperature: self.temperature,
            cfg_weight: self.cfg_weight,
            chunk_size: self.chunk_size,
        }
    }
}

// ============================================================================
// Chat
// ============================================================================

/// `POST /v1/chat/completions` 请求体
#[derive(Debug, Default, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: Option<String>,
    #[serde(default, deserialize_with = "messages_or_empty")]
    pub messages: Vec<ChatMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
}

/// `messages` 为 null 或不是数组时视为空，由用例报告 `missing messages[]`
fn messages_or_empty<'de, D>(deserializer: D) -> Result<Vec<ChatMessage>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        value @ serde_json::Value::Array(_) => {
            serde_json::from_value(value).map_err(serde::de::Error::custom)
        }
        _ => Ok(Vec::new()),
    }
}

impl ChatCompletionRequest {
    pub fn into_command(self) -> ChatCompletionCommand {
        ChatCompletionCommand {
            model: self.model,
            messages: self.messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AssistantMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChoiceDto {
    pub index: u32,
    pub message: AssistantMessage,
    pub finish_reason: &'static str,
}

/// OpenAI 风格的补全响应
#[derive(Debug, Serialize)]
pub struct ChatCompletionDto {
    pub id: String,
    pub object: &'static str,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChoiceDto>,
}

impl From<ChatCompletionResponse> for ChatCompletionDto {
    fn from(response: ChatCompletionResponse) -> Self {
        Self {
            id: response.id,
            object: "chat.completion",
            created: response.created,
            model: response.model,
            choices: vec![ChoiceDto {
                index: 0,
                message: AssistantMessage {
                    role: "assistant",
                    content: response.content,
                },
                finish_reason: "stop",
            }],
        }
    }
}

// ============================================================================
// Models
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ModelDto {
    pub id: String,
    pub object: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ModelListDto {
    pub object: &'static str,
    pub data: Vec<ModelDto>,
}

impl ModelListDto {
    pub fn single(model: impl Into<String>) -> Self {
        Self {
            object: "list",
            data: vec![ModelDto {
                id: model.into(),
                object: "model",
            }],
        }
    }
}

/// 解析 JSON 请求体，空正文视为 `{}`
pub fn parse_json_body<T>(body: &[u8]) -> Result<T, String>
where
    T: serde::de::DeserializeOwned,
{
    let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|e| format!("invalid json: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_and_voice_aliases() {
        let req: SynthesizeRequest =
            parse_json_body(br#"{"input": "hello", "audio_prompt_path": "/tmp/ref.wav"}"#).unwrap();
        let cmd = req.into_command();
        assert_eq!(cmd.text, "hello");
        assert_eq!(cmd.voice.as_deref(), Some("/tmp/ref.wav"));

        let req: SynthesizeRequest =
            parse_json_body(br#"{"text": "a", "input": "b", "voice": "af_heart"}"#).unwrap();
        let cmd = req.into_command();
        assert_eq!(cmd.text, "a");
        assert_eq!(cmd.voice.as_deref(), Some("af_heart"));
    }

    #[test]
    fn test_empty_body_is_empty_object() {
        let req: SynthesizeRequest = parse_json_body(b"").unwrap();
        assert!(req.text.is_none());
        let req: ChatCompletionRequest = parse_json_body(b"  \n").unwrap();
        assert!(req.messages.is_empty());
    }

    #[test]
    fn test_non_array_messages_treated_as_missing() {
        for body in [
            &br#"{"messages": null}"#[..],
            br#"{"messages": "hi"}"#,
            br#"{"messages": {"role": "user"}}"#,
        ] {
            let req: ChatCompletionRequest = parse_json_body(body).unwrap();
            assert!(req.messages.is_empty());
        }

        // 数组内的非法消息仍然是 JSON 错误
        let err = parse_json_body::<ChatCompletionRequest>(br#"{"messages": [{"role": "wizard"}]}"#)
            .unwrap_err();
        assert!(err.starts_with("invalid json: "));
    }

    #[test]
    fn test_wrong_field_type_rejected() {
        let err = parse_json_body::<SynthesizeRequest>(br#"{"text": "hi", "chunk_size": "big"}"#)
            .unwrap_err();
        assert!(err.starts_with("invalid json: "));
        let err = parse_json_body::<ChatCompletionRequest>(b"{not json").unwrap_err();
        assert!(err.starts_with("invalid json: "));
    }

    #[test]
    fn test_raw_text_is_lossy() {
        let cmd = SynthesizeRequest::raw_text(b"caf\xff").into_command();
        assert_eq!(cmd.text, "caf\u{fffd}");
    }

    #[test]
    fn test_completion_shape() {
        let dto = ChatCompletionDto::from(ChatCompletionResponse {
            id: "chatcmpl-1".to_string(),
            created: 1_700_000_000,
            model: "m".to_string(),
            content: "hi".to_string(),
        });
        let json = serde_json::to_value(dto).unwrap();
        assert_eq!(json["object"], "chat.completion");
        assert_eq!(json["choices"][0]["index"], 0);
        assert_eq!(json["choices"][0]["message"]["role"], "assistant");
        assert_eq!(json["choices"][0]["message"]["content"], "hi");
        assert_eq!(json["choices"][0]["finish_reason"], "stop");
    }
}
