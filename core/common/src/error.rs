//! エラーハンドリング
//!
//! 終了コードは sysexits.h に合わせる（64: 使い方, 65: データ, 69: 接続先, 70: 内部, 74: I/O, 78: 設定）。

use thiserror::Error as ThisError;

/// chat 全体で使うエラー型
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error {
    /// 引数不正（usage を表示する）
    #[error("{0}")]
    InvalidArgument(String),
    /// 非ストリーミング呼び出しの失敗（接続失敗・非 2xx）
    #[error("{message}")]
    Http { status: Option<u16>, message: String },
    /// ストリーム中の転送エラー
    #[error("stream error: {0}")]
    Stream(String),
    #[error("{0}")]
    Json(String),
    #[error("{0}")]
    Io(String),
    /// config.json の不正
    #[error("{0}")]
    Config(String),
    #[error("{0}")]
    Env(String),
    #[error("{0}")]
    System(String),
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http {
            status: None,
            message: msg.into(),
        }
    }

    pub fn http_status(status: u16, msg: impl Into<String>) -> Self {
        Self::Http {
            status: Some(status),
            message: msg.into(),
        }
    }

    pub fn stream(msg: impl Into<String>) -> Self {
        Self::Stream(msg.into())
    }

    pub fn json(msg: impl Into<String>) -> Self {
        Self::Json(msg.into())
    }

    pub fn io_msg(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn env(msg: impl Into<String>) -> Self {
        Self::Env(msg.into())
    }

    pub fn system(msg: impl Into<String>) -> Self {
        Self::System(msg.into())
    }

    /// HTTP ステータス（分かる場合のみ）
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => *status,
            _ => None,
        }
    }

    /// プロセス終了コード
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument(_) => 64,
            Self::Json(_) => 65,
            Self::Http { .. } | Self::Stream(_) => 69,
            Self::System(_) => 70,
            Self::Io(_) => 74,
            Self::Config(_) | Self::Env(_) => 78,
        }
    }

    /// usage を表示すべきエラーか
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}
