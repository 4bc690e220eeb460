//! 输出模块
//!
//! 把 token 原样、按顺序写到任意 `Write`，中间不插入任何分隔符。
use crate::error::Result;
use futures::{Stream, StreamExt};
use std::io::Write;

/// 逐个写出 token 并立即 flush，返回拼接后的完整文本
///
/// 遇到第一个流错误即停止并返回该错误，已经写出的内容保留在 `writer` 中。
pub async fn write_stream<S, W>(stream: S, writer: &mut W) -> Result<String>
where
    S: Stream<Item = Result<String>>,
    W: Write + ?Sized,
{
    let mut stream = std::pin::pin!(stream);
    let mut text = String::new();
    while let Some(token) = stream.next().await {
        let token = token?;
        writer.write_all(token.as_bytes())?;
        writer.flush()?;
        text.push_str(&token);
    }
    Ok(text)
}
