//! Ctrl+C（SIGINT）で割り込みフラグを立てる InterruptChecker 実装
//!
//! フラグが立ったまま 2 回目の Ctrl+C を受けたらプロセスを終了する（対話モードのプロンプト待ちで抜けられるように）。

use crate::ports::outbound::InterruptChecker;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// SIGINT で終了したときの終了コード（128 + 2）
const SIGINT_EXIT_CODE: i32 = 130;

pub struct SigintChecker {
    flag: Arc<AtomicBool>,
}

impl SigintChecker {
    /// ハンドラを登録する。ctrlc はプロセスに 1 つしか登録できないため、2 回目以降は Err。
    pub fn new() -> Result<Self, ctrlc::Error> {
        let flag = Arc::new(AtomicBool::new(false));
        let flag_clone = Arc::clone(&flag);
        ctrlc::set_handler(move || {
            if flag_clone.swap(true, Ordering::SeqCst) {
                std::process::exit(SIGINT_EXIT_CODE);
            }
        })?;
        Ok(Self { flag })
    }
}

impl InterruptChecker for SigintChecker {
    fn is_interrupted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    fn clear(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// 割り込みを検知しないスタブ（ハンドラ登録に失敗した場合などに使用）
pub struct NoopInterruptChecker;

impl InterruptChecker for NoopInterruptChecker {
    fn is_interrupted(&self) -> bool {
        false
    }

    fn clear(&self) {}
}
