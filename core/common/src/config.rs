//! config.json 用の設定型と実行時設定の解決
//!
//! 優先順位は CLI > 環境変数 > config.json > 組み込みデフォルト。

use crate::domain::{BaseUrl, ModelName};
use crate::error::Error;
use crate::ports::outbound::EnvResolver;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::Path;

/// RAG 検索で取り出す文書数のデフォルト
pub const DEFAULT_K: u32 = 3;

/// config.json のルート（すべて省略可）
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FileConfig {
    /// API のベース URL
    #[serde(alias = "api_base")]
    pub base_url: Option<String>,
    /// 既定のモデル名
    #[serde(alias = "default_model")]
    pub model: Option<String>,
    pub use_rag: Option<bool>,
    pub k: Option<u32>,
    /// false のとき POST /chat の一括応答を使う
    pub stream: Option<bool>,
    /// false のとき JSONL ログを書かない
    pub log: Option<bool>,
}

impl FileConfig {
    /// JSON 文字列からパース（ファイル読みは load で行う）
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// ファイルが無ければ Ok(None)。壊れていれば Error::Config。
    pub fn load(path: &Path) -> Result<Option<Self>, Error> {
        let json = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::io_msg(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        Self::parse(&json)
            .map(Some)
            .map_err(|e| Error::config(format!("Invalid {}: {}", path.display(), e)))
    }
}

/// CLI から渡される上書き値
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsOverrides {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub use_rag: Option<bool>,
    pub k: Option<u32>,
    pub stream: Option<bool>,
}

/// 解決済みの実行時設定
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: BaseUrl,
    pub model: Option<ModelName>,
    pub use_rag: bool,
    pub k: u32,
    pub stream: bool,
    pub log_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: BaseUrl::default(),
            model: None,
            use_rag: false,
            k: DEFAULT_K,
            stream: true,
            log_enabled: true,
        }
    }
}

impl Settings {
    /// CLI > 環境変数（CHAT_API_BASE / CHAT_MODEL）> config.json > デフォルト
    pub fn resolve(
        overrides: &SettingsOverrides,
        env: &dyn EnvResolver,
        file: Option<&FileConfig>,
    ) -> Self {
        let defaults = Settings::default();
        let file = file.cloned().unwrap_or_default();

        let base_url = overrides
            .base_url
            .clone()
            .or_else(|| env.var("CHAT_API_BASE"))
            .or(file.base_url)
            .map(BaseUrl::new)
            .unwrap_or(defaults.base_url);
        let model = overrides
            .model
            .clone()
            .or_else(|| env.var("CHAT_MODEL"))
            .or(file.model)
            .filter(|m| !m.is_empty())
            .map(ModelName::new);

        Self {
            base_url,
            model,
            use_rag: overrides.use_rag.or(file.use_rag).unwrap_or(defaults.use_rag),
            k: overrides.k.or(file.k).unwrap_or(defaults.k),
            stream: overrides.stream.or(file.stream).unwrap_or(defaults.stream),
            log_enabled: file.log.unwrap_or(defaults.log_enabled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Dirs;
    use std::collections::HashMap;

    struct MapEnv(HashMap<&'static str, &'static str>);

    impl EnvResolver for MapEnv {
        fn var(&self, name: &str) -> Option<String> {
            self.0.get(name).map(|s| s.to_string())
        }

        fn resolve_dirs(&self) -> Result<Dirs, Error> {
            Ok(Dirs::from_home(Path::new("/tmp/chat-test")))
        }
    }

    fn env(pairs: &[(&'static str, &'static str)]) -> MapEnv {
        MapEnv(pairs.iter().cloned().collect())
    }

    #[test]
    fn test_parse_empty_object() {
        let cfg = FileConfig::parse("{}").unwrap();
        assert_eq!(cfg, FileConfig::default());
    }

    #[test]
    fn test_parse_all_fields() {
        let json = r#"
        {
            "base_url": "http://backend:9000/api/v1",
            "default_model": "local-llm",
            "use_rag": true,
            "k": 5,
            "stream": false,
            "log": false
        }
        "#;
        let cfg = FileConfig::parse(json).unwrap();
        assert_eq!(cfg.base_url.as_deref(), Some("http://backend:9000/api/v1"));
        assert_eq!(cfg.model.as_deref(), Some("local-llm"));
        assert_eq!(cfg.use_rag, Some(true));
        assert_eq!(cfg.k, Some(5));
        assert_eq!(cfg.stream, Some(false));
        assert_eq!(cfg.log, Some(false));
    }

    #[test]
    fn test_defaults_without_any_source() {
        let settings = Settings::resolve(&SettingsOverrides::default(), &env(&[]), None);
        assert_eq!(settings, Settings::default());
        assert_eq!(&*settings.base_url, "http://localhost:8080/api/v1");
        assert_eq!(settings.k, 3);
        assert!(settings.stream);
    }

    #[test]
    fn test_precedence_cli_env_file() {
        let file = FileConfig {
            base_url: Some("http://file/api".to_string()),
            model: Some("file-model".to_string()),
            use_rag: Some(true),
            k: Some(7),
            stream: Some(false),
            log: None,
        };
        let e = env(&[("CHAT_API_BASE", "http://env/api"), ("CHAT_MODEL", "env-model")]);

        let from_env = Settings::resolve(&SettingsOverrides::default(), &e, Some(&file));
        assert_eq!(&*from_env.base_url, "http://env/api");
        assert_eq!(from_env.model.as_deref(), Some("env-model"));
        assert!(from_env.use_rag);
        assert_eq!(from_env.k, 7);
        assert!(!from_env.stream);

        let overrides = SettingsOverrides {
            base_url: Some("http://cli/api/".to_string()),
            model: Some("cli-model".to_string()),
            use_rag: None,
            k: Some(1),
            stream: None,
        };
        let from_cli = Settings::resolve(&overrides, &e, Some(&file));
        assert_eq!(&*from_cli.base_url, "http://cli/api");
        assert_eq!(from_cli.model.as_deref(), Some("cli-model"));
        assert_eq!(from_cli.k, 1);
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let got = FileConfig::load(&dir.path().join("config.json")).unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn test_load_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = FileConfig::load(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(err.exit_code(), 78);
    }
}
