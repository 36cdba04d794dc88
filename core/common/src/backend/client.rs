//! バックエンド API の HTTP クライアント（reqwest blocking）
//!
//! 非ストリーミング呼び出しは JSON を返し、ストリームは SSE イベントをコールバックへ流す。
//! タイムアウトは設けない（無応答は転送層のエラーとしてのみ観測される）。

use crate::backend::dto::{
    ChatRequest, ChatResponse, ConversationRecord, ConversationSummary, ModelInfo,
    SaveConversationRequest, StreamTarget, WireMessage,
};
use crate::backend::sse::{read_events, SseEvent, StreamControl};
use crate::domain::BaseUrl;
use crate::error::Error;
use reqwest::blocking::{multipart, Client, Response};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// エラー応答の本文からメッセージを取り出す（JSON の message / error、なければ本文そのまま）
pub fn error_message_from_body(status: u16, body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(body) {
        let msg = v["message"]
            .as_str()
            .or_else(|| v["error"]["message"].as_str())
            .or_else(|| v["error"].as_str())
            .filter(|s| !s.is_empty());
        if let Some(msg) = msg {
            return format!("HTTP {}: {}", status, msg);
        }
    }
    if body.trim().is_empty() {
        format!("HTTP {}", status)
    } else {
        format!("HTTP {}: {}", status, body.trim())
    }
}

/// 非 2xx を Error::Http に変換する
fn check_status(response: Response) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(Error::http_status(
        status.as_u16(),
        error_message_from_body(status.as_u16(), &body),
    ))
}

/// バックエンド API クライアント
pub struct BackendClient {
    base_url: BaseUrl,
    http: Client,
}

impl BackendClient {
    pub fn new(base_url: BaseUrl) -> Result<Self, Error> {
        let http = Client::builder()
            .timeout(None::<std::time::Duration>)
            .build()
            .map_err(|e| Error::system(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { base_url, http })
    }

    fn get_json(&self, path: &str) -> Result<Value, Error> {
        let response = self
            .http
            .get(self.base_url.join(path))
            .send()
            .map_err(|e| Error::http(format!("GET {} failed: {}", path, e)))?;
        let response = check_status(response)?;
        response
            .json::<Value>()
            .map_err(|e| Error::json(format!("Failed to parse {} response: {}", path, e)))
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, Error> {
        let response = self
            .http
            .post(self.base_url.join(path))
            .json(body)
            .send()
            .map_err(|e| Error::http(format!("POST {} failed: {}", path, e)))?;
        let response = check_status(response)?;
        response
            .json::<T>()
            .map_err(|e| Error::json(format!("Failed to parse {} response: {}", path, e)))
    }

    fn post_form(&self, path: &str, form: multipart::Form) -> Result<Value, Error> {
        let response = self
            .http
            .post(self.base_url.join(path))
            .multipart(form)
            .send()
            .map_err(|e| Error::http(format!("POST {} failed: {}", path, e)))?;
        let response = check_status(response)?;
        let text = response
            .text()
            .map_err(|e| Error::http(format!("Failed to read {} response: {}", path, e)))?;
        // 取り込み結果はバックエンド依存。JSON でなければ文字列のまま返す。
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }

    /// GET /conversations（配列以外の応答は空一覧）
    pub fn list_conversations(&self) -> Result<Vec<ConversationSummary>, Error> {
        let v = self.get_json("/conversations")?;
        if !v.is_array() {
            return Ok(Vec::new());
        }
        serde_json::from_value(v)
            .map_err(|e| Error::json(format!("Invalid conversation list: {}", e)))
    }

    /// GET /conversations/{id}
    pub fn get_conversation(&self, id: &str) -> Result<ConversationRecord, Error> {
        let path = format!("/conversations/{}", id);
        let v = self.get_json(&path)?;
        serde_json::from_value(v).map_err(|e| Error::json(format!("Invalid conversation: {}", e)))
    }

    /// GET /models（null は空一覧）
    pub fn list_models(&self) -> Result<Vec<ModelInfo>, Error> {
        let v = self.get_json("/models")?;
        if v.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(v).map_err(|e| Error::json(format!("Invalid model list: {}", e)))
    }

    /// POST /chat（一括応答）
    pub fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, Error> {
        self.post_json("/chat", request)
    }

    /// POST /conversation
    pub fn save_conversation(&self, messages: Vec<WireMessage>) -> Result<ConversationSummary, Error> {
        self.post_json("/conversation", &SaveConversationRequest { messages })
    }

    /// POST /documents（files パートを複数）
    pub fn upload_documents(&self, paths: &[PathBuf]) -> Result<Value, Error> {
        let mut form = multipart::Form::new();
        for path in paths {
            form = form
                .file("files", path)
                .map_err(|e| Error::io_msg(format!("Failed to read {}: {}", path.display(), e)))?;
        }
        self.post_form("/documents", form)
    }

    /// POST /documents/ingest（file パート 1 つ）
    pub fn ingest_document(&self, path: &Path) -> Result<Value, Error> {
        let form = multipart::Form::new()
            .file("file", path)
            .map_err(|e| Error::io_msg(format!("Failed to read {}: {}", path.display(), e)))?;
        self.post_form("/documents/ingest", form)
    }

    /// GET /stream/{conversationId?}?message=&model=&useRag= の URL
    pub fn stream_url(&self, target: &StreamTarget) -> Result<Url, Error> {
        let mut url = Url::parse(&self.base_url.join("/stream/"))
            .map_err(|e| Error::invalid_argument(format!("Invalid base URL {}: {}", self.base_url, e)))?;
        if let Some(id) = target.conversation_id.as_deref() {
            url.path_segments_mut()
                .map_err(|_| Error::invalid_argument(format!("Invalid base URL {}", self.base_url)))?
                .pop_if_empty()
                .push(id);
        }
        {
            let mut q = url.query_pairs_mut();
            q.append_pair("message", &target.message);
            if let Some(model) = target.model.as_deref() {
                q.append_pair("model", model);
            }
            q.append_pair("useRag", if target.use_rag { "true" } else { "false" });
        }
        Ok(url)
    }

    /// ストリームを開き、確定した SSE イベントを順に on_event へ渡す。
    /// 接続は関数を抜けた時点で閉じる（Stop 返却・EOF・エラーのいずれでも）。
    pub fn open_stream(
        &self,
        target: &StreamTarget,
        on_event: &mut dyn FnMut(SseEvent) -> Result<StreamControl, Error>,
    ) -> Result<(), Error> {
        let url = self.stream_url(target)?;
        let response = self
            .http
            .get(url)
            .header("Accept", "text/event-stream")
            .send()
            .map_err(|e| Error::stream(format!("Failed to open stream: {}", e)))?;
        let response = check_status(response)?;
        read_events(BufReader::new(response), on_event)
    }
}
