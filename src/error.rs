//! 错误处理模块

use reqwest::StatusCode;
use thiserror::Error;

/// NanoStream 库的统一错误类型
///
/// 解码器本身从不报错，这里的错误都来自传输层、配置或输出端
#[derive(Debug, Error)]
pub enum NanoError {
    /// HTTP 请求相关错误
    #[error("HTTP请求失败: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON 序列化/反序列化错误
    #[error("JSON处理错误: {0}")]
    Json(String),

    /// API 服务端错误
    #[error("API错误 ({status}): {message}")]
    Api { status: StatusCode, message: String },

    /// API 请求频率限制
    #[error("请求频率超限: {0}")]
    RateLimit(String),

    /// 身份验证失败
    #[error("身份验证失败: {0}")]
    Auth(String),

    /// 请求参数无效
    #[error("请求参数无效: {0}")]
    InvalidRequest(String),

    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(String),

    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// NanoStream 库的 Result 类型别名
pub type Result<T> = std::result::Result<T, NanoError>;

impl From<serde_json::Error> for NanoError {
    fn from(e: serde_json::Error) -> Self {
        NanoError::Json(e.to_string())
    }
}

impl NanoError {
    /// 根据非 2xx 状态码和响应体构造错误
    pub fn from_status(status: StatusCode, body: String) -> Self {
        let message = if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("unknown").to_string()
        } else {
            body
        };
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => NanoError::Auth(message),
            StatusCode::TOO_MANY_REQUESTS => NanoError::RateLimit(message),
            _ => NanoError::Api { status, message },
        }
    }
}
