//! API 数据结构模块

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ================================================================================================
// API 请求结构
// ================================================================================================

/// 对话消息
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Message {
    /// 角色
    pub role: Role,
    /// 内容
    pub content: String,
}

/// 角色枚举
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 系统
    System,
    /// 用户
    #[default]
    User,
    /// 机器人
    Assistant,
}

/// 流式对话请求体
///
/// 未设置的采样参数不会出现在 JSON 中。
#[derive(Debug, Serialize, Clone)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<Message>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

// ================================================================================================
// 流式 API 响应结构
// ================================================================================================

/// 流式 API 响应体
///
/// 只关心 `choices[0].delta.content`，其余字段（包括其他 choice）都不做结构校验。
/// 部分服务商会在同一条流里发送 `{"error": ...}`，这里顺带保留下来用于日志。
#[derive(Debug, Deserialize, Default)]
pub struct StreamChunk {
    /// 对话选择，保持为原始 JSON
    #[serde(default)]
    pub choices: Value,
    /// 上游错误信息
    #[serde(default)]
    pub error: Option<Value>,
}

impl StreamChunk {
    /// 取出第一条选择的非空增量文本
    pub fn into_content(mut self) -> Option<String> {
        match self.choices.pointer_mut("/0/delta/content").map(Value::take) {
            Some(Value::String(content)) if !content.is_empty() => Some(content),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_omits_unset_parameters() {
        let request = ChatRequest {
            model: "qwen/qwen3-235b-a22b-2507",
            messages: vec![Message {
                role: Role::User,
                content: "Tell me a joke.".into(),
            }],
            stream: true,
            temperature: None,
            top_p: None,
            max_tokens: None,
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "qwen/qwen3-235b-a22b-2507",
                "messages": [{ "role": "user", "content": "Tell me a joke." }],
                "stream": true
            })
        );
    }

    #[test]
    fn test_request_includes_set_parameters() {
        let request = ChatRequest {
            model: "m",
            messages: Vec::new(),
            stream: true,
            temperature: Some(0.5),
            top_p: None,
            max_tokens: Some(128),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["temperature"], json!(0.5));
        assert_eq!(value["max_tokens"], json!(128));
        assert!(value.get("top_p").is_none());
    }

    #[test]
    fn test_chunk_takes_first_choice_only() {
        let chunk: StreamChunk = serde_json::from_value(json!({
            "id": "gen-1",
            "object": "chat.completion.chunk",
            "choices": [
                { "index": 0, "delta": { "role": "assistant", "content": "first" }, "finish_reason": null },
                { "index": 1, "delta": { "content": "second" } }
            ]
        }))
        .unwrap();
        assert_eq!(chunk.into_content().as_deref(), Some("first"));
    }

    #[test]
    fn test_chunk_ignores_shape_of_later_choices() {
        let chunk: StreamChunk = serde_json::from_value(json!({
            "choices": [
                { "delta": { "content": "hi" } },
                { "delta": null },
                42
            ]
        }))
        .unwrap();
        assert_eq!(chunk.into_content().as_deref(), Some("hi"));
    }

    #[test]
    fn test_chunk_without_string_content() {
        for value in [
            json!({ "choices": null }),
            json!({ "choices": {} }),
            json!({ "choices": [{ "delta": null }] }),
            json!({ "choices": [{ "delta": { "content": 7 } }] }),
        ] {
            let chunk: StreamChunk = serde_json::from_value(value).unwrap();
            assert!(chunk.into_content().is_none());
        }
    }
}
