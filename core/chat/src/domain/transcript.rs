//! 会話の transcript（挿入順 = 時系列）
//!
//! 不変条件: Pending の assistant は高々 1 件。変更は transcript_reducer::reduce 経由でのみ行う。

use super::Message;
use common::backend::WireMessage;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// ストリーミング中の assistant（あれば 1 件）
    pub fn open_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.is_pending())
    }

    pub fn pending_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_pending()).count()
    }

    /// 保存用のワイヤ形式
    pub fn to_wire(&self) -> Vec<WireMessage> {
        self.messages.iter().map(WireMessage::from).collect()
    }

    pub(crate) fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}
