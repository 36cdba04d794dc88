//! Ctrl+C（SIGINT）による割り込みを検知する Outbound ポート
//!
//! ストリーミング中にユーザーが中断したとき、受信済みの内容で応答を確定してストリームを閉じるために使う。

/// 割り込みが要求されたかどうかを返す能力
///
/// usecase はストリームのコールバック内でこの trait を参照し、true ならストリームを止める。
pub trait InterruptChecker: Send + Sync {
    fn is_interrupted(&self) -> bool;

    /// 次の送信に備えてフラグを下ろす
    fn clear(&self);
}
