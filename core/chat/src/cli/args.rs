use crate::domain::{ChatCommand, Role};
use clap::builder::ArgAction;
use clap::value_parser;
use clap_complete::Shell;
use common::config::SettingsOverrides;
use common::domain::ConversationId;
use common::error::Error;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub help: bool,
    /// -l / --list: 会話一覧を表示
    pub list: bool,
    /// --show: 会話を読み込んで表示
    pub show: Option<ConversationId>,
    /// --models: 利用できるモデル一覧を表示
    pub models: bool,
    pub upload: Vec<PathBuf>,
    pub ingest: Option<PathBuf>,
    /// -i / --interactive: 対話モード
    pub interactive: bool,
    /// -v / --verbose: 不具合調査用のログを stderr にも出力する
    pub verbose: bool,
    /// -c / --conversation: 既存の会話に続けて送る
    pub conversation: Option<ConversationId>,
    pub role: Role,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub rag: bool,
    pub k: Option<u32>,
    /// --no-stream: POST /chat で一括応答を受け取る
    pub no_stream: bool,
    pub message_args: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            help: false,
            list: false,
            show: None,
            models: false,
            upload: Vec::new(),
            ingest: None,
            interactive: false,
            verbose: false,
            conversation: None,
            role: Role::User,
            base_url: None,
            model: None,
            rag: false,
            k: None,
            no_stream: false,
            message_args: Vec::new(),
        }
    }
}

impl Config {
    /// 設定解決に渡す CLI 側の上書き値（未指定のフラグは None）
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            use_rag: self.rag.then_some(true),
            k: self.k,
            stream: self.no_stream.then_some(false),
        }
    }
}

/// 解析結果: 通常の Config / 補完スクリプト生成
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Config(Config),
    GenerateCompletion(Shell),
}

fn build_clap_command() -> clap::Command {
    clap::Command::new("chat")
        .about("Chat with the backend from the terminal (streamed replies, RAG documents)")
        .disable_help_flag(true)
        .arg(
            clap::Arg::new("help")
                .short('h')
                .long("help")
                .help("Show this help message")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("list")
                .short('l')
                .long("list")
                .help("List conversations")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("show")
                .long("show")
                .value_name("id")
                .help("Load a conversation and print it")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("models")
                .long("models")
                .help("List available models")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("upload")
                .long("upload")
                .value_name("file")
                .help("Upload documents for RAG")
                .value_parser(value_parser!(PathBuf))
                .num_args(1..)
                .action(ArgAction::Append),
        )
        .arg(
            clap::Arg::new("ingest")
                .long("ingest")
                .value_name("file")
                .help("Ingest a single document")
                .value_parser(value_parser!(PathBuf))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("interactive")
                .short('i')
                .long("interactive")
                .help("Start an interactive session")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Emit verbose debug logs to stderr (for troubleshooting)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("conversation")
                .short('c')
                .long("conversation")
                .value_name("id")
                .help("Continue an existing conversation")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("role")
                .long("role")
                .value_name("role")
                .help("Send the message as user or system")
                .value_parser(["user", "system"])
                .num_args(1),
        )
        .arg(
            clap::Arg::new("base-url")
                .long("base-url")
                .value_name("url")
                .help("Backend API base URL (default: http://localhost:8080/api/v1)")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("model")
                .short('m')
                .long("model")
                .value_name("model")
                .help("Specify model name")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("rag")
                .long("rag")
                .help("Answer with retrieved documents (RAG)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("k")
                .short('k')
                .value_name("n")
                .help("Number of documents to retrieve with --rag (non-streaming only)")
                .value_parser(value_parser!(u32))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("no-stream")
                .long("no-stream")
                .help("Wait for the whole reply instead of streaming it")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("generate")
                .long("generate")
                .value_name("shell")
                .help("Generate shell completion script")
                .value_parser(value_parser!(Shell))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("message")
                .index(1)
                .help("Message words")
                .num_args(0..)
                .trailing_var_arg(true),
        )
}

fn matches_to_config(matches: &clap::ArgMatches) -> Config {
    let role = matches
        .get_one::<String>("role")
        .and_then(|s| Role::parse(s))
        .unwrap_or(Role::User);
    Config {
        help: matches.get_flag("help"),
        list: matches.get_flag("list"),
        show: matches
            .get_one::<String>("show")
            .map(|s| ConversationId::new(s.clone())),
        models: matches.get_flag("models"),
        upload: matches
            .get_many::<PathBuf>("upload")
            .map(|i| i.cloned().collect())
            .unwrap_or_default(),
        ingest: matches.get_one::<PathBuf>("ingest").cloned(),
        interactive: matches.get_flag("interactive"),
        verbose: matches.get_flag("verbose"),
        conversation: matches
            .get_one::<String>("conversation")
            .map(|s| ConversationId::new(s.clone())),
        role,
        base_url: matches.get_one::<String>("base-url").cloned(),
        model: matches.get_one::<String>("model").cloned(),
        rag: matches.get_flag("rag"),
        k: matches.get_one::<u32>("k").copied(),
        no_stream: matches.get_flag("no-stream"),
        message_args: matches
            .get_many::<String>("message")
            .map(|i| i.cloned().collect())
            .unwrap_or_default(),
    }
}

/// コマンドラインを解析する。補完生成が要求された場合は ParseOutcome::GenerateCompletion を返す。
pub fn parse_args() -> Result<ParseOutcome, Error> {
    let matches = build_clap_command()
        .try_get_matches()
        .map_err(|e| Error::invalid_argument(e.to_string()))?;

    if let Some(&shell) = matches.get_one::<Shell>("generate") {
        return Ok(ParseOutcome::GenerateCompletion(shell));
    }

    Ok(ParseOutcome::Config(matches_to_config(&matches)))
}

/// テスト用: 引数スライスから解析する
#[allow(dead_code)]
pub fn parse_args_from(args: &[String]) -> Result<Config, Error> {
    let matches = build_clap_command()
        .try_get_matches_from(args)
        .map_err(|e| Error::invalid_argument(e.to_string()))?;
    Ok(matches_to_config(&matches))
}

/// 補完スクリプトを標準出力に出力する。
pub fn print_completion(shell: Shell) {
    let mut cmd = build_clap_command();
    clap_complete::generate(shell, &mut cmd, "chat", &mut std::io::stdout());
}

/// Config を ChatCommand に変換する（複数指定時は上にあるものを優先）
pub fn config_to_command(config: Config) -> ChatCommand {
    if config.help {
        return ChatCommand::Help;
    }

    if config.list {
        return ChatCommand::ListConversations;
    }

    if let Some(id) = config.show {
        return ChatCommand::ShowConversation { id };
    }

    if config.models {
        return ChatCommand::ListModels;
    }

    if !config.upload.is_empty() {
        return ChatCommand::Upload {
            paths: config.upload,
        };
    }

    if let Some(path) = config.ingest {
        return ChatCommand::Ingest { path };
    }

    if config.interactive {
        return ChatCommand::Interactive {
            conversation: config.conversation,
        };
    }

    ChatCommand::Send {
        conversation: config.conversation,
        message: config.message_args.join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config, Error> {
        let args: Vec<String> = std::iter::once("chat")
            .chain(args.iter().copied())
            .map(String::from)
            .collect();
        parse_args_from(&args)
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(!config.help);
        assert!(!config.interactive);
        assert_eq!(config.role, Role::User);
        assert!(config.conversation.is_none());
        assert!(config.message_args.is_empty());
        assert_eq!(config.overrides(), SettingsOverrides::default());
    }

    #[test]
    fn test_parse_args_no_args() {
        let config = parse(&[]).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_args_help_short() {
        assert!(parse(&["-h"]).unwrap().help);
        assert!(parse(&["--help"]).unwrap().help);
    }

    #[test]
    fn test_parse_args_unknown_option() {
        let err = parse(&["--unknown"]).unwrap_err();
        assert_eq!(err.exit_code(), 64);
        assert!(err.is_usage());
    }

    #[test]
    fn test_parse_args_message_words() {
        let config = parse(&["-c", "c-1", "hello", "world"]).unwrap();
        assert_eq!(config.conversation, Some(ConversationId::new("c-1")));
        assert_eq!(config.message_args, vec!["hello", "world"]);
        assert_eq!(
            config_to_command(config),
            ChatCommand::Send {
                conversation: Some(ConversationId::new("c-1")),
                message: "hello world".to_string()
            }
        );
    }

    #[test]
    fn test_parse_args_role_system() {
        let config = parse(&["--role", "system", "be brief"]).unwrap();
        assert_eq!(config.role, Role::System);
        assert!(parse(&["--role", "assistant", "x"]).is_err());
    }

    #[test]
    fn test_parse_args_overrides() {
        let config = parse(&["--base-url", "http://h/api", "-m", "gpt", "--rag", "-k", "5", "--no-stream"]).unwrap();
        let o = config.overrides();
        assert_eq!(o.base_url.as_deref(), Some("http://h/api"));
        assert_eq!(o.model.as_deref(), Some("gpt"));
        assert_eq!(o.use_rag, Some(true));
        assert_eq!(o.k, Some(5));
        assert_eq!(o.stream, Some(false));
    }

    #[test]
    fn test_parse_args_k_must_be_number() {
        assert!(parse(&["-k", "many"]).is_err());
    }

    #[test]
    fn test_parse_args_upload_multiple_files() {
        let config = parse(&["--upload", "a.pdf", "b.txt"]).unwrap();
        assert_eq!(
            config_to_command(config),
            ChatCommand::Upload {
                paths: vec![PathBuf::from("a.pdf"), PathBuf::from("b.txt")]
            }
        );
    }

    #[test]
    fn test_config_to_command_priority() {
        assert_eq!(config_to_command(parse(&["-h", "-l"]).unwrap()), ChatCommand::Help);
        assert_eq!(config_to_command(parse(&["-l", "--models"]).unwrap()), ChatCommand::ListConversations);
        assert_eq!(
            config_to_command(parse(&["--show", "c-9"]).unwrap()),
            ChatCommand::ShowConversation { id: ConversationId::new("c-9") }
        );
        assert_eq!(config_to_command(parse(&["--models"]).unwrap()), ChatCommand::ListModels);
        assert_eq!(
            config_to_command(parse(&["--ingest", "doc.md"]).unwrap()),
            ChatCommand::Ingest { path: PathBuf::from("doc.md") }
        );
        assert_eq!(
            config_to_command(parse(&["-i", "-c", "c-2"]).unwrap()),
            ChatCommand::Interactive { conversation: Some(ConversationId::new("c-2")) }
        );
    }

    #[test]
    fn test_parse_args_generate_is_not_config_flag() {
        let config = parse(&["--generate", "bash"]).unwrap();
        assert!(!config.help);
        assert!(parse(&["--generate", "nosuchshell"]).is_err());
    }
}
