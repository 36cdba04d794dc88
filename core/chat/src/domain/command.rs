//! chat コマンドの enum（Command Pattern）と送信オプション

use super::Role;
use common::config::Settings;
use common::domain::{ConversationId, ModelName};
use std::path::PathBuf;

/// chat の実行モード
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    Help,
    /// 会話一覧
    ListConversations,
    /// 会話を読み込んで表示
    ShowConversation { id: ConversationId },
    ListModels,
    /// RAG 用文書のアップロード（POST /documents）
    Upload { paths: Vec<PathBuf> },
    /// 単一文書の取り込み（POST /documents/ingest）
    Ingest { path: PathBuf },
    /// 対話モード（conversation 指定時は読み込んでから開始）
    Interactive { conversation: Option<ConversationId> },
    /// 1 メッセージ送信
    Send {
        conversation: Option<ConversationId>,
        message: String,
    },
}

impl ChatCommand {
    /// ログ用の名前
    pub fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::ListConversations => "list",
            Self::ShowConversation { .. } => "show",
            Self::ListModels => "models",
            Self::Upload { .. } => "upload",
            Self::Ingest { .. } => "ingest",
            Self::Interactive { .. } => "interactive",
            Self::Send { .. } => "send",
        }
    }
}

/// 1 回の送信に使うオプション（対話モードでは途中で変更できる）
#[derive(Debug, Clone, PartialEq)]
pub struct SendOptions {
    /// 手元の transcript に記録するロール（user / system）
    pub role: Role,
    pub model: Option<ModelName>,
    pub use_rag: bool,
    /// RAG で取り出す文書数（POST /chat のみ）
    pub k: u32,
    /// false のとき POST /chat の一括応答
    pub stream: bool,
}

impl SendOptions {
    pub fn from_settings(settings: &Settings, role: Role) -> Self {
        Self {
            role,
            model: settings.model.clone(),
            use_rag: settings.use_rag,
            k: settings.k,
            stream: settings.stream,
        }
    }
}

impl Default for SendOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default(), Role::User)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_options_default() {
        let opts = SendOptions::default();
        assert_eq!(opts.role, Role::User);
        assert!(opts.model.is_none());
        assert!(!opts.use_rag);
        assert_eq!(opts.k, 3);
        assert!(opts.stream);
    }

    #[test]
    fn test_command_names() {
        assert_eq!(ChatCommand::Help.name(), "help");
        assert_eq!(
            ChatCommand::Send {
                conversation: None,
                message: "hi".to_string()
            }
            .name(),
            "send"
        );
    }
}
