//! Outbound ポート: usecase が外界を使うための trait

pub mod chat_backend;
pub mod interrupt_checker;
pub mod transcript_view;

pub use chat_backend::ChatBackend;
pub use interrupt_checker::InterruptChecker;
pub use transcript_view::TranscriptView;
