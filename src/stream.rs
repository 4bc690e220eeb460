//! 流式响应处理模块
use crate::{
    decoder::DeltaDecoder,
    error::{NanoError, Result},
};
use async_stream::try_stream;
use bytes::{Buf, Bytes, BytesMut};
use futures::{Stream, StreamExt};
use log::debug;
use std::{
    pin::Pin,
    task::{Context, Poll},
};

// ================================================================================================
// UTF-8 增量解码
// ================================================================================================

/// 增量 UTF-8 解码器
///
/// 网络分块可能把一个多字节字符切成两半，未完整的尾部字节会留到下一块再解码。
/// 非法字节序列替换为 U+FFFD。
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: BytesMut,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 解码一个字节块，返回当前能确定的全部文本
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let mut text = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(valid) => {
                    text.push_str(valid);
                    self.pending.clear();
                    break;
                }
                Err(e) => {
                    let valid = self.pending.split_to(e.valid_up_to());
                    text.push_str(&String::from_utf8_lossy(&valid));
                    match e.error_len() {
                        Some(len) => {
                            self.pending.advance(len);
                            text.push(char::REPLACEMENT_CHARACTER);
                        }
                        // 不完整的尾部，等下一块
                        None => break,
                    }
                }
            }
        }
        text
    }

    /// 流结束时冲刷残留字节
    pub fn finish(&mut self) -> String {
        let rest = self.pending.split();
        String::from_utf8_lossy(&rest).into_owned()
    }
}

// ================================================================================================
// 流式响应包装器
// ================================================================================================

/// 一个无状态的流处理器，用于把 SSE 字节流转换成文本 token 流
///
/// 每次调用 [`StreamWrapper::stream`] 都会创建独立的解码状态
#[derive(Debug, Clone, Default)]
pub struct StreamWrapper;

impl StreamWrapper {
    /// 创建一个新的 `StreamWrapper` 实例
    pub fn new() -> Self {
        StreamWrapper
    }

    /// 将一个字节流转换为 token 流
    ///
    /// 传输层错误会作为最后一项产出；解码器收到 `[DONE]` 后流立即结束，不再读取传输层
    pub fn stream<S, E>(&self, bytes_stream: S) -> impl Stream<Item = Result<String>> + Send + use<S, E>
    where
        S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
        E: Send + 'static,
        NanoError: From<E>,
    {
        try_stream! {
            let mut bytes_stream = std::pin::pin!(bytes_stream);
            let mut utf8 = Utf8Decoder::new();
            let mut decoder = DeltaDecoder::new();

            while let Some(bytes_res) = bytes_stream.next().await {
                let bytes = bytes_res.map_err(NanoError::from)?;
                let text = utf8.decode(&bytes);

                for token in decoder.feed(&text) {
                    yield token;
                }
                if decoder.is_done() {
                    break;
                }
            }

            if !decoder.is_done() {
                let tail = utf8.finish();
                let leftover = format!("{}{}", decoder.remainder(), tail);
                if !leftover.is_empty() {
                    debug!("Leftover buffer: {:?}", leftover);
                }
            }
        }
    }
}

/// `Stream<Item = Result<String>>` 的简单包装
pub struct TokenStream {
    inner: Pin<Box<dyn Stream<Item = Result<String>> + Send>>,
}

impl TokenStream {
    /// 创建一个新的 `TokenStream`
    pub fn new(stream: impl Stream<Item = Result<String>> + Send + 'static) -> Self {
        Self {
            inner: Box::pin(stream),
        }
    }
}

impl std::fmt::Debug for TokenStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStream").finish_non_exhaustive()
    }
}

impl Stream for TokenStream {
    type Item = Result<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}
