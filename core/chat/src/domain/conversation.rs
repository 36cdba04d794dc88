//! 会話 ID の状態
//!
//! 「未割り当て」と「割り当て済みだが空（ストリーム終了時のプレースホルダ）」を型で区別する。

use common::domain::ConversationId;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConversationRef {
    /// 新規会話（まだ一度も送っていない）
    #[default]
    New,
    /// ストリーム終了時に置いた空の ID。バックエンドの実 ID は不明のまま
    Placeholder,
    /// バックエンドが払い出した ID
    Known(ConversationId),
}

impl ConversationRef {
    /// GET /stream/{id} のパスに使う ID（New / Placeholder は空パス）
    pub fn path_id(&self) -> Option<&str> {
        match self {
            Self::Known(id) => Some(id.as_str()),
            Self::New | Self::Placeholder => None,
        }
    }

    /// POST /chat の conversationId（New は null、Placeholder は空文字）
    pub fn request_id(&self) -> Option<String> {
        match self {
            Self::New => None,
            Self::Placeholder => Some(String::new()),
            Self::Known(id) => Some(id.to_string()),
        }
    }

    /// ストリーム終了時の遷移。未割り当てのときだけプレースホルダにする
    pub fn after_stream_end(self) -> Self {
        match self {
            Self::New => Self::Placeholder,
            other => other,
        }
    }

    /// バックエンド応答の ID を採用する（空文字は採用しない）
    pub fn adopt(self, id: &str) -> Self {
        if id.is_empty() {
            self
        } else {
            Self::Known(ConversationId::new(id))
        }
    }

    pub fn known(&self) -> Option<&ConversationId> {
        match self {
            Self::Known(id) => Some(id),
            _ => None,
        }
    }
}
