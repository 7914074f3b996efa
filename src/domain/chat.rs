//! Chat 消息模型
//!
//! OpenAI 风格的多模态消息：content 可以是字符串，也可以是 text / image_url 片段数组

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 消息角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// `image_url` 字段：对象 `{url}` 或裸字符串
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ImageUrlField {
    Object { url: String },
    Url(String),
}

impl ImageUrlField {
    pub fn url(&self) -> &str {
        match self {
            ImageUrlField::Object { url } => url,
            ImageUrlField::Url(url) => url,
        }
    }
}

/// 内容片段
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text {
        #[serde(default)]
        text: String,
    },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrlField },
    /// 未知片段类型，忽略
    #[serde(other)]
    Other,
}

/// 消息内容
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// Chat 消息
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(default)]
    pub content: Option<MessageContent>,
}

impl ChatMessage {
    pub fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(MessageContent::Text(content.into())),
        }
    }

    /// 文本内容：字符串原样返回，片段数组拼接非空 text 片段
    pub fn text_content(&self) -> String {
        match &self.content {
            None => String::new(),
            Some(MessageContent::Text(text)) => text.clone(),
            Some(MessageContent::Parts(parts)) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } if !text.trim().is_empty() => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// 图片引用（按出现顺序）
    pub fn image_refs(&self) -> Vec<ImageRef> {
        match &self.content {
            Some(MessageContent::Parts(parts)) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::ImageUrl { image_url } => Some(ImageRef::parse(image_url.url())),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// 图片解析错误
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("invalid image data: {0}")]
    InvalidData(String),
}

/// 图片引用
#[derive(Debug, Clone, PartialEq)]
pub enum ImageRef {
    /// `data:<mime>;base64,<payload>`
    Inline {
        media_type: Option<String>,
        payload: String,
    },
    /// 外部 URL（不下载）
    External(String),
}

impl ImageRef {
    pub fn parse(url: &str) -> Self {
        match url.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest.split_once(',').unwrap_or(("", rest));
                let media_type = header
                    .split(';')
                    .next()
                    .filter(|m| !m.is_empty())
                    .map(str::to_string);
                ImageRef::Inline {
                    media_type,
                    payload: payload.to_string(),
                }
            }
            None => ImageRef::External(url.to_string()),
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, ImageRef::Inline { .. })
    }

    /// 解码内联 base64；外部 URL 返回 None
    pub fn decode(&self) -> Result<Option<InlineImage>, ImageError> {
        match self {
            ImageRef::Inline {
                media_type,
                payload,
            } => {
                let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
                let bytes = STANDARD
                    .decode(compact.as_bytes())
                    .map_err(|e| ImageError::InvalidData(e.to_string()))?;
                if bytes.is_empty() {
                    return Err(ImageError::InvalidData("empty image payload".to_string()));
                }
                Ok(Some(InlineImage {
                    media_type: media_type.clone(),
                    bytes,
                }))
            }
            ImageRef::External(_) => Ok(None),
        }
    }
}

/// 已解码的内联图片
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub media_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl InlineImage {
    /// 按 MIME 推断文件扩展名
    pub fn extension(&self) -> &'static str {
        match self.media_type.as_deref() {
            Some("image/jpeg") | Some("image/jpg") => "jpg",
            Some("image/webp") => "webp",
            Some("image/gif") => "gif",
            _ => "png",
        }
    }
}

/// 最近一条带文本的 user 消息
pub fn latest_user_text(messages: &[ChatMessage]) -> Option<String> {
    messages
        .iter()
        .rev()
        .filter(|m| m.role == Role::User)
        .map(ChatMessage::text_content)
        .find(|text| !text.trim().is_empty())
}

/// 最近一条带内联图片的 user 消息中的第一张图片
pub fn latest_user_image(messages: &[ChatMessage]) -> Result<Option<InlineImage>, ImageError> {
    for message in messages.iter().rev().filter(|m| m.role == Role::User) {
        if let Some(image) = message.image_refs().into_iter().find(ImageRef::is_inline) {
            return image.decode();
        }
    }
    Ok(None)
}

/// 纯文本对话记录，用于不支持模板的生成器
///
/// 每条消息 `ROLE: content`，末尾追加 `ASSISTANT:`
pub fn transcript_prompt(messages: &[ChatMessage]) -> String {
    let mut lines: Vec<String> = messages
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str().to_uppercase(), m.text_content()))
        .collect();
    lines.push("ASSISTANT:".to_string());
    lines.join("\n")
}
