//! chat 共通ライブラリ
//!
//! `chat` コマンドが使うエラー型・ログ・設定・バックエンドクライアントを提供します。

/// アダプター（ログ出力・環境変数解決の標準実装）
pub mod adapter;

/// バックエンド API クライアントと SSE パーサ
pub mod backend;

/// config.json と実行時設定の解決
pub mod config;

/// ドメイン型（Newtype）
pub mod domain;

/// エラーハンドリング
pub mod error;

/// Outbound ポート
pub mod ports;
