//! 流式客户端核心模块
use crate::{
    config::Config,
    error::{NanoError, Result},
    stream::{StreamWrapper, TokenStream},
    types::{ChatRequest, Message, Role},
    utils::{message, prepare_messages},
};
use futures::TryStreamExt;
use log::{debug, error};
use reqwest::{
    Client, Response,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use std::sync::Arc;

// ================================================================================================
// 核心客户端模块
// ================================================================================================

/// LLM 流式客户端
///
/// 每次调用只发起一个流式请求，失败不重试
#[derive(Debug, Clone)]
pub struct LLMClient {
    client: Arc<Client>,
    config: Arc<Config>,
    stream_handler: StreamWrapper,
}

impl LLMClient {
    /// 创建一个新的 `LLMClient` 实例
    pub fn new(config: Config) -> Self {
        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .tcp_keepalive(config.tcp_keepalive)
            .tcp_nodelay(config.tcp_nodelay);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .unwrap_or_else(|e| {
                error!("Failed to build reqwest client: {}", e);
                Client::new()
            });

        Self {
            client: Arc::new(client),
            config: Arc::new(config),
            stream_handler: StreamWrapper::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 构建 API 请求所需的 HTTP 标头
    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.config.api_key))
                .map_err(|e| NanoError::InvalidRequest(format!("Invalid API key: {}", e)))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
        Ok(headers)
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'))
    }

    /// 发送请求，非 2xx 状态码转换为对应错误
    async fn send(&self, request: &ChatRequest<'_>) -> Result<Response> {
        let body = serde_json::to_vec(request)?;
        let endpoint = self.endpoint();
        debug!("POST {} (model: {})", endpoint, request.model);

        let response = self
            .client
            .post(&endpoint)
            .headers(self.build_headers()?)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(NanoError::from_status(status, body))
        }
    }

    /// 为给定的提示生成流式响应
    pub async fn stream_generate(&self, prompt: &str) -> Result<TokenStream> {
        let messages = vec![message(Role::User, prompt)];
        self.stream_chat(&messages).await
    }

    /// 为给定的消息列表生成流式响应
    pub async fn stream_chat(&self, messages: &[Message]) -> Result<TokenStream> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: prepare_messages(&self.config.system_message, messages),
            stream: true,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            max_tokens: self.config.max_tokens,
        };

        let response = self.send(&request).await?;
        Ok(TokenStream::new(
            self.stream_handler.stream(response.bytes_stream()),
        ))
    }

    /// 为给定的提示生成完整响应
    ///
    /// 内部仍然走流式接口，把所有 token 按顺序拼接起来
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        self.stream_generate(prompt)
            .await?
            .try_fold(String::new(), |mut text, token| async move {
                text.push_str(&token);
                Ok(text)
            })
            .await
    }
}
