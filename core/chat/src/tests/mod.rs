//! usecase をスタブのバックエンドで通しで動かすテスト

mod stream_session_tests;

use crate::adapter::{NoopInterruptChecker, RecordingView, StubBackend};
use crate::ports::outbound::{ChatBackend, InterruptChecker};
use crate::usecase::{ChatDeps, ChatUseCase};
use common::adapter::NoopLog;
use std::sync::Arc;

/// スタブのバックエンドと記録用 view で ChatUseCase を組み立てる
pub(crate) fn use_case_with(backend: Arc<StubBackend>) -> (ChatUseCase, RecordingView) {
    use_case_with_interrupt(backend, Arc::new(NoopInterruptChecker))
}

pub(crate) fn use_case_with_interrupt(
    backend: Arc<StubBackend>,
    interrupt: Arc<dyn InterruptChecker>,
) -> (ChatUseCase, RecordingView) {
    let view = RecordingView::new();
    let backend: Arc<dyn ChatBackend> = backend;
    let use_case = ChatUseCase::new(ChatDeps {
        backend,
        view: Box::new(view.clone()),
        interrupt,
        log: Arc::new(NoopLog),
    });
    (use_case, view)
}
