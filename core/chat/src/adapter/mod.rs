//! Outbound ポートの標準実装とテスト用スタブ

pub(crate) mod http_backend;
pub(crate) mod sigint_checker;
pub(crate) mod stub_backend;
pub(crate) mod terminal_view;

pub(crate) use http_backend::HttpChatBackend;
pub(crate) use sigint_checker::{NoopInterruptChecker, SigintChecker};
#[cfg(test)]
pub(crate) use stub_backend::{InterruptAfter, RecordingView, StreamScript, StubBackend};
pub(crate) use terminal_view::TerminalView;
