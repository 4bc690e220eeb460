//! 增量 SSE/JSON 解码模块
//!
//! 把传输层按任意边界切开的文本片段还原成一行一行的 SSE 数据，
//! 再从每个 `data: ` 行里的 JSON 取出 `choices[0].delta.content`。
//! 解码器本身是纯同步的，从不阻塞，也从不因为坏数据而报错。
use crate::types::StreamChunk;
use log::{debug, warn};

// ================================================================================================
// 常量
// ================================================================================================

const DATA_PREFIX: &str = "data: ";
const DONE_CHUNK: &str = "[DONE]";

// ================================================================================================
// 行缓冲
// ================================================================================================

/// 增量行切分器
///
/// 尾部追加、头部消费。`start` 之前的字节已经作为完整行交出去了，
/// `search_from` 之前不会再有未被发现的 `\n`。
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: String,
    start: usize,
    search_from: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个片段，同时丢弃已经消费掉的头部
    pub fn push(&mut self, fragment: &str) {
        if self.start > 0 {
            self.buf.drain(..self.start);
            self.search_from -= self.start;
            self.start = 0;
        }
        self.buf.push_str(fragment);
    }

    /// 取出下一条以 `\n` 结尾的完整行（不含换行符）
    ///
    /// 没有完整行时返回 `None`，未结束的部分留在缓冲里等待下一个片段。
    pub fn next_line(&mut self) -> Option<&str> {
        match self.buf[self.search_from..].find('\n') {
            Some(offset) => {
                let end = self.search_from + offset;
                let begin = self.start;
                self.start = end + 1;
                self.search_from = end + 1;
                Some(&self.buf[begin..end])
            }
            None => {
                self.search_from = self.buf.len();
                None
            }
        }
    }

    /// 尚未构成完整行的剩余内容
    pub fn remainder(&self) -> &str {
        &self.buf[self.start..]
    }
}

// ================================================================================================
// 行分类
// ================================================================================================

/// `data: ` 之后的负载
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload<'a> {
    /// 结束哨兵 `[DONE]`
    Done,
    /// 期望是 JSON 的文本
    Json(&'a str),
}

/// 一条已去除首尾空白的 SSE 行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SseLine<'a> {
    Data(Payload<'a>),
    /// 空行、注释以及 `event:`、`id:` 等其他字段
    Ignored,
}

impl<'a> SseLine<'a> {
    pub fn parse(raw: &'a str) -> Self {
        match raw.trim().strip_prefix(DATA_PREFIX) {
            Some(DONE_CHUNK) => SseLine::Data(Payload::Done),
            Some(data) => SseLine::Data(Payload::Json(data)),
            None => SseLine::Ignored,
        }
    }
}

/// 从一段 JSON 负载中提取增量文本
///
/// 解析失败、缺少 `choices`、`content` 为空或缺失都视为“本行没有 token”。
pub fn extract_content(data: &str) -> Option<String> {
    match serde_json::from_str::<StreamChunk>(data) {
        Ok(chunk) => {
            if let Some(err) = &chunk.error {
                warn!("Upstream error event dropped: {}", err);
            }
            chunk.into_content()
        }
        Err(e) => {
            debug!("Skipping unparsable payload: {:?} ({})", data, e);
            None
        }
    }
}

// ================================================================================================
// 解码器
// ================================================================================================

/// 解码器状态，`Done` 为终态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecoderState {
    #[default]
    Streaming,
    Done,
}

/// 增量 SSE/JSON 流解码器
#[derive(Debug, Default)]
pub struct DeltaDecoder {
    lines: LineBuffer,
    state: DecoderState,
}

impl DeltaDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 喂入一个文本片段，返回其中完整行产生的全部 token
    ///
    /// 遇到 `[DONE]` 后立即停止取行，之后的调用一律返回空。
    pub fn feed(&mut self, fragment: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        if self.is_done() {
            return tokens;
        }

        self.lines.push(fragment);
        while let Some(line) = self.lines.next_line() {
            match SseLine::parse(line) {
                SseLine::Ignored => {}
                SseLine::Data(Payload::Done) => {
                    self.state = DecoderState::Done;
                    break;
                }
                SseLine::Data(Payload::Json(data)) => {
                    if let Some(token) = extract_content(data) {
                        tokens.push(token);
                    }
                }
            }
        }
        tokens
    }

    pub fn is_done(&self) -> bool {
        self.state == DecoderState::Done
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// 缓冲中未被解释的尾部内容，仅用于诊断
    pub fn remainder(&self) -> &str {
        self.lines.remainder()
    }
}
