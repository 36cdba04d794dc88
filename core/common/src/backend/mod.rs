//! チャットバックエンドとの通信
//!
//! - dto: リクエスト/レスポンスのワイヤ形式
//! - sse: text/event-stream のフレーム解析
//! - client: reqwest (blocking) による HTTP クライアント

pub mod client;
pub mod dto;
pub mod sse;

pub use client::BackendClient;
pub use dto::{
    ChatRequest, ChatResponse, ConversationRecord, ConversationSummary, ModelInfo, StreamTarget,
    WireMessage,
};
pub use sse::{read_events, SseEvent, SseParser, StreamControl};
