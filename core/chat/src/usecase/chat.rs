use crate::domain::{
    reduce, ConversationRef, Message, SendOptions, SessionId, StreamSession, Transcript,
    TranscriptEvent, DONE_SENTINEL,
};
use crate::ports::outbound::{ChatBackend, InterruptChecker, TranscriptView};
use common::backend::{
    ChatRequest, ConversationSummary, ModelInfo, SseEvent, StreamControl, StreamTarget,
};
use common::domain::ConversationId;
use common::error::Error;
use common::ports::outbound::{Log, LogLevel, LogRecord};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// --- usecase が定義を所有し、wiring は組み立てるだけ

pub struct ChatDeps {
    pub backend: Arc<dyn ChatBackend>,
    pub view: Box<dyn TranscriptView>,
    pub interrupt: Arc<dyn InterruptChecker>,
    pub log: Arc<dyn Log>,
}

/// ストリーム送信の終わり方（エラーは Err で返る）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// 番兵または自然終了
    Completed,
    /// Ctrl+C でセッションを閉じた
    Interrupted,
}

/// セッションの閉じ方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Finish {
    Complete,
    Error,
    Close,
}

impl Finish {
    fn message(self) -> &'static str {
        match self {
            Self::Complete => "stream session completed",
            Self::Error => "stream session errored",
            Self::Close => "stream session closed",
        }
    }
}

/// 1 つの transcript を所有し、送信・受信・読み込みを順に適用する
///
/// transcript の変更は必ず reduce を通し、変更のたびに view を更新する。
/// 生きているストリームセッションは高々 1 つ（live）。新しい送信の前に必ず閉じる。
pub struct ChatUseCase {
    deps: ChatDeps,
    transcript: Transcript,
    conversation: ConversationRef,
    live: Option<StreamSession>,
    next_session_id: u64,
}

impl ChatUseCase {
    pub fn new(deps: ChatDeps) -> Self {
        Self {
            deps,
            transcript: Transcript::new(),
            conversation: ConversationRef::New,
            live: None,
            next_session_id: 1,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn conversation(&self) -> &ConversationRef {
        &self.conversation
    }

    pub fn live_session(&self) -> Option<&StreamSession> {
        self.live.as_ref()
    }

    fn emit(&self, record: LogRecord) {
        let _ = self.deps.log.log(&record.layer("usecase"));
    }

    fn apply(&mut self, event: TranscriptEvent) -> Result<(), Error> {
        let current = std::mem::take(&mut self.transcript);
        self.transcript = reduce(current, event);
        self.deps.view.refresh(&self.transcript)
    }

    // --- ストリームセッションのライフサイクル

    /// ユーザーの発言を transcript に追加し、新しいセッションを開く。
    /// 生きているセッションがあれば先に閉じる。ネットワークには触れない
    pub fn open_session(&mut self, message: &str, opts: &SendOptions) -> Result<SessionId, Error> {
        self.close_session()?;
        let id = SessionId(self.next_session_id);
        self.next_session_id += 1;
        let target = StreamTarget {
            conversation_id: self.conversation.path_id().map(str::to_string),
            message: message.to_string(),
            model: opts.model.as_ref().map(|m| m.to_string()),
            use_rag: opts.use_rag,
        };
        self.emit(
            LogRecord::new(LogLevel::Info, "stream session opened")
                .kind("stream")
                .field("session", id.0)
                .field("conversation", target.conversation_id.clone().unwrap_or_default())
                .field("use_rag", target.use_rag),
        );
        self.live = Some(StreamSession::open(id, target));
        self.apply(TranscriptEvent::Posted(Message::from_role(opts.role, message)))?;
        Ok(id)
    }

    /// 受信した chunk を生きているセッションに連結し、開いている応答を更新する
    pub fn on_chunk(&mut self, chunk: &str) -> Result<(), Error> {
        match self.live.as_mut().and_then(|s| s.apply_chunk(chunk)) {
            Some(event) => self.apply(event),
            None => Ok(()),
        }
    }

    /// 番兵・自然終了。応答を確定してセッションを解放する
    pub fn on_complete(&mut self) -> Result<(), Error> {
        self.finish(Finish::Complete).map(|_| ())
    }

    /// 転送エラー。確定は on_complete と同じで、err はこの呼び出しがセッションを閉じたときだけ返す
    pub fn on_error(&mut self, err: Error) -> Result<(), Error> {
        if self.finish(Finish::Error)? {
            self.emit(LogRecord::new(LogLevel::Error, err.to_string()).kind("error"));
            return Err(err);
        }
        Ok(())
    }

    /// 生きているセッションを閉じる。何度呼んでもよい
    pub fn close_session(&mut self) -> Result<(), Error> {
        self.finish(Finish::Close).map(|_| ())
    }

    /// セッションを終端状態にして解放する。閉じたら true
    fn finish(&mut self, how: Finish) -> Result<bool, Error> {
        let Some(mut session) = self.live.take() else {
            return Ok(false);
        };
        let event = match how {
            Finish::Error => session.fail(),
            Finish::Complete | Finish::Close => session.complete(),
        };
        let Some(event) = event else {
            return Ok(false);
        };
        if how != Finish::Close {
            self.conversation = std::mem::take(&mut self.conversation).after_stream_end();
        }
        self.emit(
            LogRecord::new(LogLevel::Info, how.message())
                .kind("stream")
                .field("session", session.id().0)
                .field("state", session.state().as_str())
                .field("chunks", session.chunks())
                .field("length", session.buffer().len()),
        );
        self.apply(event)?;
        Ok(true)
    }

    // --- 送信

    /// 空でないメッセージを設定に応じてストリーム / 一括で送る
    pub fn send(&mut self, message: &str, opts: &SendOptions) -> Result<StreamOutcome, Error> {
        if message.trim().is_empty() {
            return Err(Error::invalid_argument("Message is empty"));
        }
        if opts.stream {
            self.send_streaming(message, opts)
        } else {
            self.send_blocking(message, opts)?;
            Ok(StreamOutcome::Completed)
        }
    }

    /// GET /stream で送り、イベントが尽きるか番兵・割り込みが来るまでブロックする
    pub fn send_streaming(&mut self, message: &str, opts: &SendOptions) -> Result<StreamOutcome, Error> {
        self.deps.interrupt.clear();
        self.open_session(message, opts)?;
        let target = match &self.live {
            Some(session) => session.target().clone(),
            None => return Ok(StreamOutcome::Completed),
        };
        let backend = Arc::clone(&self.deps.backend);
        let interrupt = Arc::clone(&self.deps.interrupt);
        let mut outcome = StreamOutcome::Completed;
        let result = backend.stream(&target, &mut |ev: SseEvent| -> Result<StreamControl, Error> {
            if interrupt.is_interrupted() {
                outcome = StreamOutcome::Interrupted;
                return Ok(StreamControl::Stop);
            }
            if !ev.is_message() {
                return Ok(StreamControl::Continue);
            }
            if ev.data == DONE_SENTINEL {
                return Ok(StreamControl::Stop);
            }
            self.on_chunk(&ev.data)?;
            Ok(StreamControl::Continue)
        });
        match result {
            Err(e) => {
                self.on_error(e)?;
                Ok(outcome)
            }
            Ok(()) if outcome == StreamOutcome::Interrupted => {
                self.deps.interrupt.clear();
                self.close_session()?;
                Ok(outcome)
            }
            Ok(()) => {
                self.on_complete()?;
                Ok(outcome)
            }
        }
    }

    /// POST /chat で送り、応答全体を確定済みの assistant として追加する。
    /// 失敗時に transcript に残るのはユーザーの発言だけ
    pub fn send_blocking(&mut self, message: &str, opts: &SendOptions) -> Result<(), Error> {
        self.close_session()?;
        let request = ChatRequest {
            conversation_id: self.conversation.request_id(),
            message: message.to_string(),
            model: opts.model.as_ref().map(|m| m.to_string()),
            use_rag: opts.use_rag,
            k: opts.k,
        };
        self.apply(TranscriptEvent::Posted(Message::from_role(opts.role, message)))?;
        let response = self.deps.backend.send_chat(&request)?;
        self.conversation = std::mem::take(&mut self.conversation).adopt(&response.conversation_id);
        self.emit(
            LogRecord::new(LogLevel::Info, "chat response received")
                .kind("request")
                .field("conversation", response.conversation_id.clone())
                .field("length", response.message.len()),
        );
        self.apply(TranscriptEvent::Posted(Message::assistant(response.message)))
    }

    // --- 会話の切り替え

    /// 新しい会話を始める（transcript を空にし、ID を未割り当てに戻す）
    pub fn new_conversation(&mut self) -> Result<(), Error> {
        self.close_session()?;
        self.conversation = ConversationRef::New;
        self.deps.view.reset();
        self.apply(TranscriptEvent::Cleared)
    }

    /// GET /conversations/{id} の内容で transcript を置き換える（順序はそのまま）
    pub fn load_conversation(&mut self, id: &ConversationId) -> Result<usize, Error> {
        self.close_session()?;
        let record = self.deps.backend.get_conversation(id)?;
        let messages: Vec<Message> = record.into_messages().into_iter().map(Message::from).collect();
        let count = messages.len();
        self.conversation = ConversationRef::Known(id.clone());
        self.emit(
            LogRecord::new(LogLevel::Info, "conversation loaded")
                .kind("lifecycle")
                .field("conversation", id.as_str())
                .field("messages", count),
        );
        self.deps.view.reset();
        self.apply(TranscriptEvent::Replaced(messages))?;
        Ok(count)
    }

    /// 履歴を読み込まずに既存の会話 ID で続ける
    pub fn use_conversation(&mut self, id: ConversationId) {
        self.conversation = ConversationRef::Known(id);
    }

    // --- 一括リクエスト

    pub fn list_conversations(&self) -> Result<Vec<ConversationSummary>, Error> {
        self.deps.backend.list_conversations()
    }

    pub fn list_models(&self) -> Result<Vec<ModelInfo>, Error> {
        self.deps.backend.list_models()
    }

    pub fn upload_documents(&self, paths: &[PathBuf]) -> Result<Value, Error> {
        if paths.is_empty() {
            return Err(Error::invalid_argument("Select files first!"));
        }
        self.deps.backend.upload_documents(paths)
    }

    pub fn ingest_document(&self, path: &Path) -> Result<Value, Error> {
        self.deps.backend.ingest_document(path)
    }

    /// POST /conversation で現在の transcript を保存し、払い出された ID で以後の送信を続ける
    pub fn save_conversation(&mut self) -> Result<ConversationSummary, Error> {
        if self.transcript.is_empty() {
            return Err(Error::invalid_argument("No messages to save"));
        }
        let saved = self.deps.backend.save_conversation(self.transcript.to_wire())?;
        self.conversation = std::mem::take(&mut self.conversation).adopt(saved.id.as_str());
        self.emit(
            LogRecord::new(LogLevel::Info, "conversation saved")
                .kind("lifecycle")
                .field("conversation", saved.id.as_str())
                .field("messages", self.transcript.len()),
        );
        Ok(saved)
    }
}
