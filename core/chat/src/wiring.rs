//! 配線: 設定を解決し、標準アダプタで ChatUseCase を組み立てる

use std::sync::Arc;

use common::adapter::{CompositeLog, FileJsonLog, NoopLog, StdEnvResolver, StderrLog};
use common::backend::BackendClient;
use common::config::{FileConfig, Settings};
use common::error::Error;
use common::ports::outbound::{EnvResolver, Log, LogLevel, LogRecord};

use crate::adapter::{HttpChatBackend, NoopInterruptChecker, SigintChecker, TerminalView};
use crate::cli::Config;
use crate::ports::outbound::{ChatBackend, InterruptChecker, TranscriptView};
use crate::usecase::{ChatDeps, ChatUseCase};

/// main が使う組み立て済みの部品
pub struct App {
    pub settings: Settings,
    pub logger: Arc<dyn Log>,
    pub chat: ChatUseCase,
}

/// CLI > 環境変数 > config.json > デフォルト の順で設定を解決し、App を組み立てる。
/// HOME が解決できないときは config.json もファイルログも使わない
pub fn wire_chat(config: &Config) -> Result<App, Error> {
    let env_resolver = StdEnvResolver;
    let dirs = env_resolver.resolve_dirs().ok();
    let file_config = match &dirs {
        Some(d) => FileConfig::load(&d.config_file())?,
        None => None,
    };
    let settings = Settings::resolve(&config.overrides(), &env_resolver, file_config.as_ref());

    let mut logs: Vec<Arc<dyn Log>> = Vec::new();
    if settings.log_enabled {
        if let Some(d) = &dirs {
            logs.push(Arc::new(FileJsonLog::new(d.log_file())));
        }
    }
    if config.verbose {
        logs.push(Arc::new(StderrLog));
    }
    let logger: Arc<dyn Log> = if logs.is_empty() {
        Arc::new(NoopLog)
    } else {
        Arc::new(CompositeLog::new(logs))
    };

    let client = BackendClient::new(settings.base_url.clone())?;
    let backend: Arc<dyn ChatBackend> = Arc::new(HttpChatBackend::new(client, Arc::clone(&logger)));
    let interrupt: Arc<dyn InterruptChecker> = match SigintChecker::new() {
        Ok(checker) => Arc::new(checker),
        Err(e) => {
            let _ = logger.log(
                &LogRecord::new(LogLevel::Warn, format!("Ctrl+C handler not installed: {}", e))
                    .layer("cli")
                    .kind("lifecycle"),
            );
            Arc::new(NoopInterruptChecker)
        }
    };
    Ok(assemble(
        settings,
        logger,
        backend,
        Box::new(TerminalView::stdout()),
        interrupt,
    ))
}

/// 部品から App を組み立てる（テストではスタブを渡す）
pub fn assemble(
    settings: Settings,
    logger: Arc<dyn Log>,
    backend: Arc<dyn ChatBackend>,
    view: Box<dyn TranscriptView>,
    interrupt: Arc<dyn InterruptChecker>,
) -> App {
    let chat = ChatUseCase::new(ChatDeps {
        backend,
        view,
        interrupt,
        log: Arc::clone(&logger),
    });
    App {
        settings,
        logger,
        chat,
    }
}
