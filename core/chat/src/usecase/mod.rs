//! ユースケース（ポート経由でのみ外界に触れる）

pub mod chat;

pub use chat::{ChatDeps, ChatUseCase, StreamOutcome};
