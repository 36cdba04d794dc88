//! バックエンド API のワイヤ形式（JSON は camelCase）

use crate::domain::ConversationId;
use serde::{Deserialize, Deserializer, Serialize};

/// null を空文字として読む
fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

/// 会話中の 1 メッセージ（role は任意の文字列で届く）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMessage {
    pub role: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl WireMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            created_at: None,
        }
    }
}

/// GET /conversations の 1 要素、POST /conversation の応答
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: ConversationId,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub messages: Option<Vec<WireMessage>>,
}

/// GET /conversations/{id} の応答
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    #[serde(default)]
    pub id: Option<ConversationId>,
    #[serde(default)]
    pub messages: Option<Vec<WireMessage>>,
}

impl ConversationRecord {
    /// messages が無ければ空（順序はバックエンドのまま）
    pub fn into_messages(self) -> Vec<WireMessage> {
        self.messages.unwrap_or_default()
    }
}

/// GET /models の 1 要素（文字列だけの要素も受け付ける）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

impl ModelInfo {
    /// 一覧のキー（id が無ければ name）
    pub fn key(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ModelInfoRaw {
    Name(String),
    Full {
        #[serde(default)]
        id: Option<String>,
        name: String,
    },
}

impl<'de> Deserialize<'de> for ModelInfo {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(match ModelInfoRaw::deserialize(d)? {
            ModelInfoRaw::Name(name) => ModelInfo { id: None, name },
            ModelInfoRaw::Full { id, name } => ModelInfo { id, name },
        })
    }
}

/// POST /chat のリクエスト
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// None は null として送り、バックエンドに新規作成させる
    pub conversation_id: Option<String>,
    pub message: String,
    pub model: Option<String>,
    pub use_rag: bool,
    pub k: u32,
}

/// POST /chat の応答
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub conversation_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
}

/// POST /conversation のリクエスト
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveConversationRequest {
    pub messages: Vec<WireMessage>,
}

/// GET /stream/{conversationId?} の宛先
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamTarget {
    /// None のときパスは `/stream/`（新規作成を意味する）
    pub conversation_id: Option<String>,
    pub message: String,
    pub model: Option<String>,
    pub use_rag: bool,
}
