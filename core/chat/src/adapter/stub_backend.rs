//! テスト用: 決められた応答を返す ChatBackend と、表示を記録する TranscriptView


#[cfg(test)]
pub use stub::{InterruptAfter, RecordingView, StreamScript, StubBackend};
