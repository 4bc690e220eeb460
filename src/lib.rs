//! # NanoStream - 流式对话补全客户端
//!
//! 向 OpenAI 兼容的对话补全接口（默认 OpenRouter）发起一次流式请求，
//! 边接收边把增量文本交给调用方。
//!
//! ## 组成
//!
//! - [`decoder`]：增量 SSE/JSON 解码器，纯同步，容忍半行和坏 JSON，识别 `[DONE]`。
//! - [`stream`]：把 HTTP 字节流转换为 token 流。
//! - [`client`]：构造请求、鉴权、处理状态码。
//! - [`sink`]：把 token 原样写到终端或任意 `Write`。
//!
//! ## 快速开始
//!
//! ```rust,no_run
//! use nanostream::client::LLMClient;
//! use nanostream::config::Config;
//! use nanostream::error::Result;
//! use nanostream::sink::write_stream;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // 从环境变量加载配置 (需要设置 OPENROUTER_API_KEY)
//!     let config = Config::from_env()?;
//!     let client = LLMClient::new(config);
//!
//!     let stream = client.stream_generate("Tell me a joke.").await?;
//!     write_stream(stream, &mut std::io::stdout()).await?;
//!     Ok(())
//! }
//! ```
//!
//! 解码器也可以脱离网络单独使用：
//!
//! ```rust
//! use nanostream::decoder::DeltaDecoder;
//!
//! let mut decoder = DeltaDecoder::new();
//! assert!(decoder.feed("data: {\"choices\":[{\"delta\":{\"con").is_empty());
//! assert_eq!(decoder.feed("tent\":\"Hi\"}}]}\n"), vec!["Hi"]);
//! decoder.feed("data: [DONE]\n");
//! assert!(decoder.is_done());
//! ```

// 模块定义
pub mod client;
pub mod config;
pub mod decoder;
pub mod error;
pub mod sink;
pub mod stream;
pub mod types;
pub mod utils;

pub use client::LLMClient;
pub use decoder::DeltaDecoder;
pub use error::{NanoError, Result};
