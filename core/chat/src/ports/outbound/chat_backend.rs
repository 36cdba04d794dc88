//! チャットバックエンド Outbound ポート
//!
//! usecase は HTTP の詳細を知らず、この trait 経由でのみバックエンドを呼ぶ。

use common::backend::{
    ChatRequest, ChatResponse, ConversationRecord, ConversationSummary, ModelInfo, SseEvent,
    StreamControl, StreamTarget, WireMessage,
};
use common::error::Error;
use serde_json::Value;
use std::path::{Path, PathBuf};

pub trait ChatBackend: Send + Sync {
    fn list_conversations(&self) -> Result<Vec<ConversationSummary>, Error>;

    fn get_conversation(&self, id: &str) -> Result<ConversationRecord, Error>;

    fn list_models(&self) -> Result<Vec<ModelInfo>, Error>;

    /// POST /chat（一括応答）
    fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, Error>;

    /// GET /stream を開き、on_event が Stop を返すか接続が終わるまでブロックする。
    /// 接続・読み取りの失敗は Err。自然終了（EOF）は Ok
    fn stream(
        &self,
        target: &StreamTarget,
        on_event: &mut dyn FnMut(SseEvent) -> Result<StreamControl, Error>,
    ) -> Result<(), Error>;

    fn save_conversation(&self, messages: Vec<WireMessage>) -> Result<ConversationSummary, Error>;

    fn upload_documents(&self, paths: &[PathBuf]) -> Result<Value, Error>;

    fn ingest_document(&self, path: &Path) -> Result<Value, Error>;
}
