//! 工具函数模块
use crate::types::{Message, Role};

/// 创建消息的便捷函数
pub fn message(role: Role, content: &str) -> Message {
    Message {
        role,
        content: content.to_string(),
    }
}

/// 准备发送到 API 的消息列表
///
/// 如果系统消息不为空，则将其作为第一条消息。
pub(crate) fn prepare_messages(system_message: &str, messages: &[Message]) -> Vec<Message> {
    (!system_message.is_empty())
        .then(|| message(Role::System, system_message))
        .into_iter()
        .chain(messages.iter().cloned())
        .collect()
}
