//! BackendClient を ChatBackend ポートとして公開し、リクエストごとにログを残す

use crate::ports::outbound::ChatBackend;
use common::backend::{
    BackendClient, ChatRequest, ChatResponse, ConversationRecord, ConversationSummary, ModelInfo,
    SseEvent, StreamControl, StreamTarget, WireMessage,
};
use common::error::Error;
use common::ports::outbound::{Log, LogLevel, LogRecord};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct HttpChatBackend {
    client: BackendClient,
    log: Arc<dyn Log>,
}

impl HttpChatBackend {
    pub fn new(client: BackendClient, log: Arc<dyn Log>) -> Self {
        Self { client, log }
    }

    /// 1 リクエスト分を実行し、結果（status）をログに書く
    fn logged<T>(&self, method: &str, path: &str, f: impl FnOnce() -> Result<T, Error>) -> Result<T, Error> {
        let result = f();
        let record = match &result {
            Ok(_) => LogRecord::new(LogLevel::Debug, "request finished"),
            Err(e) => {
                let mut r = LogRecord::new(LogLevel::Warn, e.to_string());
                if let Some(status) = e.status() {
                    r = r.field("status", status);
                }
                r
            }
        };
        let _ = self.log.log(
            &record
                .layer("adapter")
                .kind("request")
                .field("method", method)
                .field("path", path),
        );
        result
    }
}

impl ChatBackend for HttpChatBackend {
    fn list_conversations(&self) -> Result<Vec<ConversationSummary>, Error> {
        self.logged("GET", "/conversations", || self.client.list_conversations())
    }

    fn get_conversation(&self, id: &str) -> Result<ConversationRecord, Error> {
        let path = format!("/conversations/{}", id);
        self.logged("GET", &path, || self.client.get_conversation(id))
    }

    fn list_models(&self) -> Result<Vec<ModelInfo>, Error> {
        self.logged("GET", "/models", || self.client.list_models())
    }

    fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, Error> {
        self.logged("POST", "/chat", || self.client.send_chat(request))
    }

    fn stream(
        &self,
        target: &StreamTarget,
        on_event: &mut dyn FnMut(SseEvent) -> Result<StreamControl, Error>,
    ) -> Result<(), Error> {
        let url = self.client.stream_url(target)?;
        self.logged("GET", url.path(), || self.client.open_stream(target, on_event))
    }

    fn save_conversation(&self, messages: Vec<WireMessage>) -> Result<ConversationSummary, Error> {
        self.logged("POST", "/conversation", || self.client.save_conversation(messages))
    }

    fn upload_documents(&self, paths: &[PathBuf]) -> Result<Value, Error> {
        self.logged("POST", "/documents", || self.client.upload_documents(paths))
    }

    fn ingest_document(&self, path: &Path) -> Result<Value, Error> {
        self.logged("POST", "/documents/ingest", || self.client.ingest_document(path))
    }
}
