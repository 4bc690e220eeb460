//! 配置模块
use crate::error::{NanoError, Result};
use std::env;
use std::time::Duration;

// ===============================================================================================
// 配置模块
// ===============================================================================================

const DEFAULT_MODEL: &str = "qwen/qwen3-235b-a22b-2507";
const DEFAULT_API_BASE: &str = "https://openrouter.ai/api/v1";

/// 流式客户端配置
///
/// 包含所有必要的配置参数，支持 Builder 模式和环境变量配置
#[derive(Debug, Clone)]
pub struct Config {
    /// 模型名称，原样发送，不做校验
    pub(crate) model: String,
    /// 系统消息，为空时不发送
    pub(crate) system_message: String,
    /// 温度参数 (0.0-2.0)
    pub(crate) temperature: Option<f32>,
    /// Top-p 参数 (0.0-1.0)
    pub(crate) top_p: Option<f32>,
    /// 最大生成 token 数
    pub(crate) max_tokens: Option<u32>,
    /// 整个请求（含流式读取）的超时时间，默认不限制，避免长回答被截断
    pub(crate) timeout: Option<Duration>,
    /// 两次读取之间的最长等待时间
    pub(crate) read_timeout: Duration,
    /// 建立连接的超时时间
    pub(crate) connect_timeout: Duration,
    /// API 基础 URL
    pub(crate) api_base: String,
    /// API 密钥
    pub(crate) api_key: String,
    /// TCP Keepalive
    pub(crate) tcp_keepalive: Duration,
    /// TCP Nodelay
    pub(crate) tcp_nodelay: bool,
}

impl Default for Config {
    /// 创建默认配置
    ///
    /// 默认走 OpenRouter，使用 Qwen3 235B 模型
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            system_message: String::new(),
            temperature: None,
            top_p: None,
            max_tokens: None,
            timeout: None,
            read_timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(30),
            api_base: DEFAULT_API_BASE.into(),
            api_key: String::new(),
            tcp_keepalive: Duration::from_secs(60),
            tcp_nodelay: true,
        }
    }
}

/// 生成 Config Builder 方法的宏
///
/// 自动生成 `with_field_name` 形式的 builder 方法
macro_rules! config_builder {
    ($field:ident, $type:ty) => {
        paste::paste! {
            #[doc = "设置 `"]
            #[doc = stringify!($field)]
            #[doc = "`"]
            pub fn [<with_ $field>](mut self, $field: $type) -> Self {
                self.$field = $field;
                self
            }
        }
    };
    ($field:ident, $type:ty, option) => {
        paste::paste! {
            #[doc = "设置 `"]
            #[doc = stringify!($field)]
            #[doc = "`"]
            pub fn [<with_ $field>](mut self, $field: $type) -> Self {
                self.$field = Some($field);
                self
            }
        }
    };
}

impl Config {
    /// 使用给定的 API 密钥创建配置，其余取默认值
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn model(&self) -> &str { &self.model }
    pub fn system_message(&self) -> &str { &self.system_message }
    pub fn temperature(&self) -> Option<f32> { self.temperature }
    pub fn top_p(&self) -> Option<f32> { self.top_p }
    pub fn max_tokens(&self) -> Option<u32> { self.max_tokens }
    pub fn timeout(&self) -> Option<Duration> { self.timeout }
    pub fn read_timeout(&self) -> Duration { self.read_timeout }
    pub fn api_base(&self) -> &str { &self.api_base }
    pub fn api_key(&self) -> &str { &self.api_key }

    /// 从环境变量和 `.env` 文件加载配置
    ///
    /// 环境变量会覆盖 `.env` 文件中的设置
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 通过任意键值查找函数加载配置
    ///
    /// 读取 `OPENROUTER_API_KEY`（必需）、`OPENROUTER_MODEL`、`OPENROUTER_API_BASE`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENROUTER_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| NanoError::Config("OPENROUTER_API_KEY not found".into()))?;

        let model = lookup("OPENROUTER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_base = lookup("OPENROUTER_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        Ok(Config {
            api_key,
            model,
            api_base: api_base.trim_end_matches('/').to_string(),
            ..Default::default()
        })
    }

    // 使用宏生成 builder 方法
    config_builder!(api_base, String);
    config_builder!(model, String);
    config_builder!(api_key, String);
    config_builder!(system_message, String);
    config_builder!(temperature, f32, option);
    config_builder!(top_p, f32, option);
    config_builder!(max_tokens, u32, option);
    config_builder!(timeout, Duration, option);
    config_builder!(read_timeout, Duration);
    config_builder!(connect_timeout, Duration);
    config_builder!(tcp_keepalive, Duration);
    config_builder!(tcp_nodelay, bool);
}
