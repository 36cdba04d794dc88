//! Ports & Adapters のポート定義
//!
//! - inbound: ドライバ（CLI）がアプリを呼び出すインターフェース
//! - outbound: アプリが外界（バックエンド・端末表示・割り込み）を使うための trait

pub mod inbound;
pub mod outbound;
