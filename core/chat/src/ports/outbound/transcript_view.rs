//! transcript の表示先

use crate::domain::Transcript;
use common::error::Error;

/// transcript が変わるたびに最新の全体を受け取る
///
/// 実装は前回表示した位置を覚えておき、差分だけを出力してよい。
pub trait TranscriptView: Send {
    fn refresh(&mut self, transcript: &Transcript) -> Result<(), Error>;

    /// 会話の切り替え（新規・読み込み）後、最初から表示し直す
    fn reset(&mut self);
}
