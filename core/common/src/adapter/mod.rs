//! アダプター（外界の I/O を trait の標準実装として提供）
//!
//! usecase はポート経由でのみログ・環境変数に触れる。
//! 実装は標準実装（Std*）やテスト用のモックを注入する。

pub mod file_json_log;
pub mod std_env_resolver;
pub mod stderr_log;

pub use file_json_log::{FileJsonLog, NoopLog};
pub use std_env_resolver::StdEnvResolver;
pub use stderr_log::{CompositeLog, StderrLog};
