//! 端末への transcript 表示
//!
//! 受け取るたびに全体を描き直すのではなく、まだ出していない部分だけを書き足す。
//! ストリーミング中の応答は受信分を追記し、確定した時点で改行する。

use crate::domain::Transcript;
use crate::ports::outbound::TranscriptView;
use common::error::Error;
use std::io::{self, Write};

pub struct TerminalView<W: Write + Send> {
    out: W,
    /// 表示し終えた（改行まで出した）メッセージ数
    shown: usize,
    /// shown 番目のメッセージを途中まで出しているとき、出したバイト数
    partial: Option<usize>,
}

impl TerminalView<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            shown: 0,
            partial: None,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, s: &str) -> Result<(), Error> {
        self.out
            .write_all(s.as_bytes())
            .map_err(|e| Error::io_msg(format!("Failed to write transcript: {}", e)))
    }
}

impl<W: Write + Send> TranscriptView for TerminalView<W> {
    fn refresh(&mut self, transcript: &Transcript) -> Result<(), Error> {
        if transcript.len() < self.shown {
            self.reset();
        }
        for (i, message) in transcript.messages().iter().enumerate().skip(self.shown) {
            let content = message.content();
            match self.partial.take() {
                Some(printed) => self.write(content.get(printed..).unwrap_or(""))?,
                None => self.write(&format!("{}> {}", message.role_name(), content))?,
            }
            if message.is_pending() {
                self.partial = Some(content.len());
                break;
            }
            self.write("\n")?;
            self.shown = i + 1;
        }
        self.out
            .flush()
            .map_err(|e| Error::io_msg(format!("Failed to flush stdout: {}", e)))
    }

    fn reset(&mut self) {
        self.shown = 0;
        self.partial = None;
    }
}
