//! common が定義するポート
//!
//! outbound のみ（ログ出力と環境変数の解決）。chat 固有のポートは chat 側に置く。

pub mod outbound;
