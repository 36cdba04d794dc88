//! 実行時ディレクトリ（CHAT_HOME / XDG 解決結果）
//!
//! EnvResolver::resolve_dirs() で取得し、設定ファイル・ログのパス計算に使う。

use std::path::{Path, PathBuf};

/// 解決済みの config / state ディレクトリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dirs {
    pub config_dir: PathBuf,
    pub state_dir: PathBuf,
}

impl Dirs {
    /// ホーム直下に config/ と state/ を置く
    pub fn from_home(home: &Path) -> Self {
        Self {
            config_dir: home.join("config"),
            state_dir: home.join("state"),
        }
    }

    /// 設定ファイル（config/config.json）
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }

    /// ログ格納ディレクトリ（state/logs）
    pub fn logs_dir(&self) -> PathBuf {
        self.state_dir.join("logs")
    }

    /// JSONL ログファイル
    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join("chat.jsonl")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_from_home() {
        let dirs = Dirs::from_home(Path::new("/home/u/.config/chat"));
        assert_eq!(dirs.config_file(), PathBuf::from("/home/u/.config/chat/config/config.json"));
        assert_eq!(dirs.log_file(), PathBuf::from("/home/u/.config/chat/state/logs/chat.jsonl"));
    }
}
