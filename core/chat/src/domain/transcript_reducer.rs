//! transcript の純粋な縮約関数 `(Transcript, TranscriptEvent) -> Transcript`
//!
//! 呼び出し側が保持する最新の transcript にだけ適用する。古いスナップショットを参照しない。

use super::{Message, Transcript};

/// transcript に適用するイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEvent {
    /// 確定済みメッセージの追加（ユーザー送信・一括応答）
    Posted(Message),
    /// ストリーム受信。content はそれまでの受信分全体
    StreamProgress { content: String },
    /// ストリーム終了（完了・エラー・クローズ）。content で確定する
    StreamFinished { content: String },
    /// バックエンドから読み込んだ会話で置き換え
    Replaced(Vec<Message>),
    Cleared,
}

/// Pending を現在の内容のまま確定する
fn finalize_pending(messages: Vec<Message>) -> Vec<Message> {
    messages.into_iter().map(Message::into_final).collect()
}

pub fn reduce(transcript: Transcript, event: TranscriptEvent) -> Transcript {
    match event {
        TranscriptEvent::Posted(message) => {
            // 新しい発言の前に開いている応答を閉じる（Pending は常に末尾の 1 件）
            let mut messages = finalize_pending(transcript.into_messages());
            messages.push(message.into_final());
            Transcript::from_messages(messages)
        }
        TranscriptEvent::StreamProgress { content } => {
            let mut messages = transcript.into_messages();
            match messages.last_mut() {
                Some(last) if last.is_pending() => *last = Message::pending(content),
                _ => messages.push(Message::pending(content)),
            }
            Transcript::from_messages(messages)
        }
        TranscriptEvent::StreamFinished { content } => {
            let mut messages = transcript.into_messages();
            if let Some(open) = messages.iter_mut().rev().find(|m| m.is_pending()) {
                *open = Message::assistant(content);
            }
            Transcript::from_messages(messages)
        }
        TranscriptEvent::Replaced(messages) => Transcript::from_messages(messages),
        TranscriptEvent::Cleared => Transcript::new(),
    }
}
