//! 1 回の送信に対応するストリームセッション
//!
//! 状態遷移: Open（未受信）→ Streaming（1 件以上受信）→ Completed | Errored。
//! 終端状態からは遷移しない。新しい送信は常に新しいセッションを作る。

use super::TranscriptEvent;
use common::backend::StreamTarget;

/// 明示的な完了を表すアプリケーションレベルの番兵
pub const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Streaming,
    Completed,
    Errored,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Errored)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Streaming => "streaming",
            Self::Completed => "completed",
            Self::Errored => "errored",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug)]
pub struct StreamSession {
    id: SessionId,
    target: StreamTarget,
    buffer: String,
    chunks: usize,
    state: SessionState,
}

impl StreamSession {
    pub fn open(id: SessionId, target: StreamTarget) -> Self {
        Self {
            id,
            target,
            buffer: String::new(),
            chunks: 0,
            state: SessionState::Open,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn target(&self) -> &StreamTarget {
        &self.target
    }

    /// これまでに受信した全文
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn chunks(&self) -> usize {
        self.chunks
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// chunk を連結し、開いている応答を全文で置き換えるイベントを返す。終端状態なら None
    pub fn apply_chunk(&mut self, chunk: &str) -> Option<TranscriptEvent> {
        if self.state.is_terminal() {
            return None;
        }
        self.buffer.push_str(chunk);
        self.chunks += 1;
        self.state = SessionState::Streaming;
        Some(TranscriptEvent::StreamProgress {
            content: self.buffer.clone(),
        })
    }

    /// 完了（番兵・自然終了・クローズ）。2 回目以降は None
    pub fn complete(&mut self) -> Option<TranscriptEvent> {
        self.finish(SessionState::Completed)
    }

    /// 転送エラー。確定の仕方は complete と同じ
    pub fn fail(&mut self) -> Option<TranscriptEvent> {
        self.finish(SessionState::Errored)
    }

    fn finish(&mut self, terminal: SessionState) -> Option<TranscriptEvent> {
        if self.state.is_terminal() {
            return None;
        }
        self.state = terminal;
        Some(TranscriptEvent::StreamFinished {
            content: self.buffer.clone(),
        })
    }
}
