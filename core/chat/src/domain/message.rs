//! 会話メッセージ
//!
//! assistant だけがストリーミング中（Pending）と確定済み（Final）の 2 状態を持つ。

use common::backend::WireMessage;

/// メッセージの送り手
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            "system" => Some(Self::System),
            _ => None,
        }
    }
}

/// assistant の応答
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantReply {
    /// ストリーミング中。内容はそれまでの受信分全体で置き換えられる
    Pending { partial_content: String },
    /// 確定済み。以後変更されない
    Final { content: String },
}

/// transcript の 1 要素
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    User(String),
    System(String),
    Assistant(AssistantReply),
    /// バックエンドが返した未知のロール（表示は system 扱い）
    Other { role: String, content: String },
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::User(content.into())
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::System(content.into())
    }

    /// 確定済みの assistant
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant(AssistantReply::Final {
            content: content.into(),
        })
    }

    /// ストリーミング中の assistant
    pub fn pending(partial_content: impl Into<String>) -> Self {
        Self::Assistant(AssistantReply::Pending {
            partial_content: partial_content.into(),
        })
    }

    pub fn from_role(role: Role, content: impl Into<String>) -> Self {
        match role {
            Role::User => Self::user(content),
            Role::Assistant => Self::assistant(content),
            Role::System => Self::system(content),
        }
    }

    pub fn role_name(&self) -> &str {
        match self {
            Self::User(_) => Role::User.as_str(),
            Self::System(_) => Role::System.as_str(),
            Self::Assistant(_) => Role::Assistant.as_str(),
            Self::Other { role, .. } => role,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::User(c) | Self::System(c) => c,
            Self::Assistant(AssistantReply::Pending { partial_content }) => partial_content,
            Self::Assistant(AssistantReply::Final { content }) => content,
            Self::Other { content, .. } => content,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Assistant(AssistantReply::Pending { .. }))
    }

    /// ワイヤ上の streamComplete 相当（assistant 以外は None）
    pub fn stream_complete(&self) -> Option<bool> {
        match self {
            Self::Assistant(AssistantReply::Pending { .. }) => Some(false),
            Self::Assistant(AssistantReply::Final { .. }) => Some(true),
            _ => None,
        }
    }

    /// Pending を現在の内容のまま確定する
    pub fn into_final(self) -> Self {
        match self {
            Self::Assistant(AssistantReply::Pending { partial_content }) => {
                Self::assistant(partial_content)
            }
            other => other,
        }
    }
}

impl From<WireMessage> for Message {
    fn from(w: WireMessage) -> Self {
        match Role::parse(&w.role) {
            Some(role) => Self::from_role(role, w.content),
            None => Self::Other {
                role: w.role,
                content: w.content,
            },
        }
    }
}

impl From<&Message> for WireMessage {
    fn from(m: &Message) -> Self {
        WireMessage::new(m.role_name(), m.content())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_names() {
        for role in [Role::User, Role::Assistant, Role::System] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("tool"), None);
    }

    #[test]
    fn test_stream_complete_only_on_assistant() {
        assert_eq!(Message::user("hi").stream_complete(), None);
        assert_eq!(Message::pending("h").stream_complete(), Some(false));
        assert_eq!(Message::assistant("hi").stream_complete(), Some(true));
    }

    #[test]
    fn test_into_final_keeps_partial_content() {
        let m = Message::pending("Hi th").into_final();
        assert_eq!(m, Message::assistant("Hi th"));
        assert_eq!(Message::user("x").into_final(), Message::user("x"));
    }

    #[test]
    fn test_from_wire_unknown_role_is_kept() {
        let m: Message = WireMessage::new("tool", "result").into();
        assert_eq!(m.role_name(), "tool");
        assert_eq!(m.content(), "result");
        assert!(matches!(m, Message::Other { .. }));
    }

    #[test]
    fn test_from_wire_assistant_is_final() {
        let m: Message = WireMessage::new("assistant", "done").into();
        assert_eq!(m, Message::assistant("done"));
    }

    #[test]
    fn test_to_wire_pending_uses_partial_content() {
        let w = WireMessage::from(&Message::pending("par"));
        assert_eq!(w.role, "assistant");
        assert_eq!(w.content, "par");
    }
}
