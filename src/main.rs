//! 命令行入口：发起一次流式请求，把回答实时打印到标准输出
//!
//! 用法：`nanostream [提示词...]`，需要设置 `OPENROUTER_API_KEY`。
//! 日志写到标准错误，由 `RUST_LOG` 控制。

use nanostream::client::LLMClient;
use nanostream::config::Config;
use nanostream::error::Result;
use nanostream::sink::write_stream;
use std::io::Write;

const DEFAULT_PROMPT: &str = "Tell me a joke.";

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Config::from_env()?;
    let client = LLMClient::new(config);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let prompt = if args.is_empty() {
        DEFAULT_PROMPT.to_string()
    } else {
        args.join(" ")
    };

    let stream = client.stream_generate(&prompt).await?;
    let mut stdout = std::io::stdout().lock();
    let text = write_stream(stream, &mut stdout).await?;
    writeln!(stdout)?;

    log::debug!("Received {} chars from {}", text.chars().count(), client.config().model());
    Ok(())
}
