//! 環境変数解決 Outbound ポート
//!
//! ホームディレクトリと設定用の環境変数を解決する。
//! usecase / wiring はこの trait 経由でのみ環境変数にアクセスする。

use crate::domain::Dirs;
use crate::error::Error;

/// 環境変数解決抽象（Outbound ポート）
///
/// 実装は `common::adapter::StdEnvResolver` やテスト用のモックなど。
pub trait EnvResolver: Send + Sync {
    /// 空文字は未設定として扱う
    fn var(&self, name: &str) -> Option<String>;

    /// config / state ディレクトリを解決する
    ///
    /// 優先順位:
    /// 1. CHAT_HOME（設定されていれば）
    /// 2. $XDG_CONFIG_HOME/chat
    /// 3. $HOME/.config/chat
    fn resolve_dirs(&self) -> Result<Dirs, Error>;
}
