//! 対話モード: 1 行ずつ読み、スラッシュコマンドかメッセージ送信として実行する
//!
//! 1 つのコマンドの失敗は stderr に出して次の行に進む（ループは止めない）。

use crate::cli::present::{conversation_line, document_result, model_line};
use crate::domain::{Role, SendOptions};
use crate::usecase::{ChatUseCase, StreamOutcome};
use common::domain::{ConversationId, ModelName};
use common::error::Error;
use std::io::{BufRead, Write};
use std::path::PathBuf;

const PROMPT: &str = "> ";

const HELP: &str = "\
Commands:
  /new                 Start a new conversation
  /load <id>           Load a conversation
  /list                List conversations
  /models              List models
  /model [name]        Select a model (no name: backend default)
  /rag on|off          Toggle RAG
  /role user|system    Role for the next messages
  /upload <file>...    Upload documents for RAG
  /ingest <file>       Ingest a single document
  /save                Save the current conversation
  /help                Show this help
  /quit                Exit
Anything else is sent as a message. Ctrl+C stops a streaming reply.";

/// 1 行分のコマンド
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    /// 空行（何もしない）
    Empty,
    Send(String),
    New,
    Load(ConversationId),
    List,
    Models,
    Model(Option<ModelName>),
    Rag(bool),
    Role(Role),
    Upload(Vec<PathBuf>),
    Ingest(PathBuf),
    Save,
    Help,
    Quit,
}

fn usage(text: &str) -> Error {
    Error::invalid_argument(format!("Usage: {}", text))
}

impl ReplCommand {
    pub fn parse(line: &str) -> Result<Self, Error> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(Self::Empty);
        }
        if !trimmed.starts_with('/') {
            return Ok(Self::Send(line.to_string()));
        }
        let mut words = trimmed.split_whitespace();
        let name = words.next().unwrap_or_default();
        let args: Vec<&str> = words.collect();
        match (name, args.as_slice()) {
            ("/new", []) => Ok(Self::New),
            ("/load", [id]) => Ok(Self::Load(ConversationId::new(*id))),
            ("/load", _) => Err(usage("/load <id>")),
            ("/list", []) => Ok(Self::List),
            ("/models", []) => Ok(Self::Models),
            ("/model", []) => Ok(Self::Model(None)),
            ("/model", [m]) => Ok(Self::Model(Some(ModelName::new(*m)))),
            ("/model", _) => Err(usage("/model [name]")),
            ("/rag", ["on"]) => Ok(Self::Rag(true)),
            ("/rag", ["off"]) => Ok(Self::Rag(false)),
            ("/rag", _) => Err(usage("/rag on|off")),
            ("/role", [r]) => Role::parse(r)
                .filter(|r| *r != Role::Assistant)
                .map(Self::Role)
                .ok_or_else(|| usage("/role user|system")),
            ("/role", _) => Err(usage("/role user|system")),
            ("/upload", []) => Err(Error::invalid_argument("Select files first!")),
            ("/upload", files) => Ok(Self::Upload(files.iter().map(PathBuf::from).collect())),
            ("/ingest", [file]) => Ok(Self::Ingest(PathBuf::from(file))),
            ("/ingest", _) => Err(usage("/ingest <file>")),
            ("/save", []) => Ok(Self::Save),
            ("/help", _) => Ok(Self::Help),
            ("/quit", _) | ("/exit", _) => Ok(Self::Quit),
            (other, _) => Err(Error::invalid_argument(format!(
                "Unknown command: {} (try /help)",
                other
            ))),
        }
    }
}

enum Flow {
    Continue,
    Quit,
}

/// 対話ループ。ChatUseCase を借り、送信オプションはループの間だけ変更できる
pub struct Repl<'a> {
    use_case: &'a mut ChatUseCase,
    opts: SendOptions,
    out: &'a mut dyn Write,
    err: &'a mut dyn Write,
}

impl<'a> Repl<'a> {
    pub fn new(
        use_case: &'a mut ChatUseCase,
        opts: SendOptions,
        out: &'a mut dyn Write,
        err: &'a mut dyn Write,
    ) -> Self {
        Self {
            use_case,
            opts,
            out,
            err,
        }
    }

    #[cfg(test)]
    pub fn options(&self) -> &SendOptions {
        &self.opts
    }

    fn println(&mut self, text: &str) -> Result<(), Error> {
        writeln!(self.out, "{}", text)
            .map_err(|e| Error::io_msg(format!("Failed to write stdout: {}", e)))
    }

    fn prompt(&mut self) -> Result<(), Error> {
        write!(self.out, "{}", PROMPT)
            .and_then(|_| self.out.flush())
            .map_err(|e| Error::io_msg(format!("Failed to write stdout: {}", e)))
    }

    /// 入力が尽きるか /quit で 0 を返す
    pub fn run(&mut self, input: impl BufRead) -> Result<i32, Error> {
        self.prompt()?;
        for line in input.lines() {
            let line = line.map_err(|e| Error::io_msg(format!("Failed to read stdin: {}", e)))?;
            let result = ReplCommand::parse(&line).and_then(|cmd| self.execute(cmd));
            match result {
                Ok(Flow::Quit) => return Ok(0),
                Ok(Flow::Continue) => {}
                Err(e) => {
                    let _ = writeln!(self.err, "chat: {}", e);
                }
            }
            self.prompt()?;
        }
        let _ = writeln!(self.out);
        Ok(0)
    }

    fn execute(&mut self, cmd: ReplCommand) -> Result<Flow, Error> {
        match cmd {
            ReplCommand::Empty => {}
            ReplCommand::Send(message) => {
                if self.use_case.send(&message, &self.opts)? == StreamOutcome::Interrupted {
                    self.println("(interrupted)")?;
                }
            }
            ReplCommand::New => {
                self.use_case.new_conversation()?;
                self.println("Started a new conversation")?;
            }
            ReplCommand::Load(id) => {
                self.use_case.load_conversation(&id)?;
            }
            ReplCommand::List => {
                let conversations = self.use_case.list_conversations()?;
                for c in &conversations {
                    self.println(&conversation_line(c))?;
                }
            }
            ReplCommand::Models => {
                let models = self.use_case.list_models()?;
                let selected = self.opts.model.clone();
                for m in &models {
                    self.println(&model_line(m, selected.as_ref()))?;
                }
            }
            ReplCommand::Model(model) => {
                let text = match &model {
                    Some(m) => format!("Model: {}", m),
                    None => "Model: (backend default)".to_string(),
                };
                self.opts.model = model;
                self.println(&text)?;
            }
            ReplCommand::Rag(on) => {
                self.opts.use_rag = on;
                self.println(if on { "RAG: on" } else { "RAG: off" })?;
            }
            ReplCommand::Role(role) => {
                self.opts.role = role;
                self.println(&format!("Role: {}", role.as_str()))?;
            }
            ReplCommand::Upload(paths) => {
                let result = self.use_case.upload_documents(&paths)?;
                self.println(&document_result(&result))?;
            }
            ReplCommand::Ingest(path) => {
                let result = self.use_case.ingest_document(&path)?;
                self.println(&document_result(&result))?;
            }
            ReplCommand::Save => {
                let saved = self.use_case.save_conversation()?;
                self.println(&format!("Saved as {}", saved.id))?;
            }
            ReplCommand::Help => self.println(HELP)?,
            ReplCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }
}
