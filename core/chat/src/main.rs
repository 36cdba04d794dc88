mod adapter;
mod cli;
mod domain;
mod ports;
mod repl;
mod usecase;
mod wiring;

#[cfg(test)]
mod tests;

use std::io;
use std::process;

use cli::present::{conversation_line, document_result, model_line};
use cli::{config_to_command, parse_args, print_completion, Config, ParseOutcome};
use common::error::Error;
use common::ports::outbound::{LogLevel, LogRecord};
use domain::{ChatCommand, SendOptions};
use ports::inbound::UseCaseRunner;
use repl::Repl;
use usecase::StreamOutcome;
use wiring::{wire_chat, App};

/// Ctrl+C で送信を打ち切ったときの終了コード
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Command をディスパッチする Runner（match は main レイヤーに集約）
struct Runner {
    app: App,
}

impl Runner {
    fn dispatch(&mut self, cmd: ChatCommand, opts: SendOptions) -> Result<i32, Error> {
        let chat = &mut self.app.chat;
        match cmd {
            ChatCommand::Help => {
                print_help();
                Ok(0)
            }
            ChatCommand::ListConversations => {
                for c in &chat.list_conversations()? {
                    println!("{}", conversation_line(c));
                }
                Ok(0)
            }
            ChatCommand::ShowConversation { id } => {
                chat.load_conversation(&id)?;
                Ok(0)
            }
            ChatCommand::ListModels => {
                for m in &chat.list_models()? {
                    println!("{}", model_line(m, opts.model.as_ref()));
                }
                Ok(0)
            }
            ChatCommand::Upload { paths } => {
                println!("{}", document_result(&chat.upload_documents(&paths)?));
                Ok(0)
            }
            ChatCommand::Ingest { path } => {
                println!("{}", document_result(&chat.ingest_document(&path)?));
                Ok(0)
            }
            ChatCommand::Interactive { conversation } => {
                if let Some(id) = conversation {
                    chat.load_conversation(&id)?;
                }
                let mut out = io::stdout();
                let mut err = io::stderr();
                Repl::new(chat, opts, &mut out, &mut err).run(io::stdin().lock())
            }
            ChatCommand::Send {
                conversation,
                message,
            } => {
                if message.trim().is_empty() {
                    return Err(Error::invalid_argument(
                        "No message provided. Use -i or --interactive for a session.",
                    ));
                }
                if let Some(id) = conversation {
                    chat.use_conversation(id);
                }
                match chat.send(&message, &opts)? {
                    StreamOutcome::Completed => Ok(0),
                    StreamOutcome::Interrupted => Ok(INTERRUPTED_EXIT_CODE),
                }
            }
        }
    }

    fn log(&self, record: LogRecord) {
        let _ = self.app.logger.log(&record.layer("cli"));
    }
}

impl UseCaseRunner for Runner {
    fn run(&mut self, config: Config) -> Result<i32, Error> {
        let opts = SendOptions::from_settings(&self.app.settings, config.role);
        let cmd = config_to_command(config);
        let command_name = cmd.name();
        self.log(
            LogRecord::new(LogLevel::Info, "command started")
                .kind("lifecycle")
                .field("command", command_name)
                .field("base_url", self.app.settings.base_url.to_string()),
        );

        let result = self.dispatch(cmd, opts);

        let code = result.as_ref().map_or_else(|e| e.exit_code(), |c| *c);
        self.log(
            LogRecord::new(LogLevel::Info, "command finished")
                .kind("lifecycle")
                .field("command", command_name)
                .field("exit_code", code),
        );
        if let Err(ref e) = result {
            self.log(LogRecord::new(LogLevel::Error, e.to_string()).kind("error"));
        }
        result
    }
}

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            if e.is_usage() {
                print_usage();
            }
            eprintln!("chat: {}", e);
            e.exit_code()
        }
    };
    process::exit(exit_code);
}

pub fn run() -> Result<i32, Error> {
    let config = match parse_args()? {
        ParseOutcome::Config(c) => c,
        ParseOutcome::GenerateCompletion(shell) => {
            print_completion(shell);
            return Ok(0);
        }
    };
    if config.help {
        print_help();
        return Ok(0);
    }
    let app = wire_chat(&config)?;
    let mut runner = Runner { app };
    runner.run(config)
}

fn print_usage() {
    eprintln!("Usage: chat [options] [message...]");
}

fn print_help() {
    println!("Usage: chat [options] [message...]");
    println!("Options:");
    println!("  -h, --help                    Show this help message");
    println!("  -c, --conversation <id>       Continue an existing conversation");
    println!("      --role <user|system>      Send the message as user (default) or system");
    println!("  -l, --list                    List conversations (id prefix and last update)");
    println!("      --show <id>               Load a conversation and print it");
    println!("      --models                  List available models");
    println!("      --upload <file>...        Upload documents for RAG (POST /documents)");
    println!("      --ingest <file>           Ingest a single document (POST /documents/ingest)");
    println!("  -i, --interactive             Start an interactive session (type /help inside)");
    println!("  -m, --model <model>           Specify model name. Default: backend default");
    println!("      --rag                     Answer with retrieved documents");
    println!("  -k <n>                        Number of documents to retrieve (non-streaming only, default 3)");
    println!("      --no-stream               Wait for the whole reply instead of streaming it");
    println!("      --base-url <url>          Backend API base URL (default: http://localhost:8080/api/v1)");
    println!("  -v, --verbose                 Emit verbose debug logs to stderr");
    println!("      --generate <shell>        Generate shell completion script (bash, zsh, fish)");
    println!();
    println!("Environment:");
    println!("  CHAT_API_BASE   Backend API base URL (overridden by --base-url)");
    println!("  CHAT_MODEL      Default model (overridden by -m)");
    println!("  CHAT_HOME       Home directory. Config: $CHAT_HOME/config/config.json;");
    println!("                  logs: $CHAT_HOME/state/logs/chat.jsonl");
    println!("                  If unset, $XDG_CONFIG_HOME/chat (e.g. ~/.config/chat) is used.");
    println!();
    println!("Examples:");
    println!("  chat Hello, how are you?");
    println!("  chat -c 0f8fad5b-d9cb-469f-a165-70867728950e And then?");
    println!("  chat --rag --no-stream -k 5 What do the documents say about billing?");
    println!("  chat -i");
}
