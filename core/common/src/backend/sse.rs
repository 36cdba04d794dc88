//! text/event-stream のフレーム解析
//!
//! 行単位で field:value を読み、空行でイベントを確定する（ブラウザの EventSource と同じ規則）。
//! - data 行は "\n" で連結
//! - 値の先頭の空白 1 つは除去
//! - ":" で始まる行はコメント
//! - data が空のイベントは配信しない
//! - EOF 時に空行で閉じていないイベントは捨てる

use crate::error::Error;
use std::io::{BufRead, ErrorKind};

/// 確定した 1 イベント
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SseEvent {
    /// event フィールド（未指定は None = "message"）
    pub event: Option<String>,
    pub data: String,
    /// 直近の id（イベントをまたいで保持される）
    pub id: Option<String>,
}

impl SseEvent {
    pub fn message(data: impl Into<String>) -> Self {
        Self {
            event: None,
            data: data.into(),
            id: None,
        }
    }

    /// EventSource の onmessage に届く種別か
    pub fn is_message(&self) -> bool {
        matches!(self.event.as_deref(), None | Some("message"))
    }
}

/// コールバックからの継続指示。Stop で接続を閉じる。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamControl {
    Continue,
    Stop,
}

/// 行を受け取ってイベントを組み立てる状態機械
#[derive(Debug, Default)]
pub struct SseParser {
    data: String,
    event: Option<String>,
    last_event_id: Option<String>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// 改行を除いた 1 行を入力する。空行でイベントが確定すれば返す。
    pub fn feed_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.find(':') {
            Some(i) => {
                let v = &line[i + 1..];
                (&line[..i], v.strip_prefix(' ').unwrap_or(v))
            }
            None => (line, ""),
        };
        match field {
            "data" => {
                self.data.push_str(value);
                self.data.push('\n');
            }
            "event" => self.event = Some(value.to_string()),
            "id" => {
                if !value.contains('\0') {
                    self.last_event_id = Some(value.to_string());
                }
            }
            // 再接続はしないため retry は読み捨てる
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take().filter(|e| !e.is_empty());
        if self.data.is_empty() {
            return None;
        }
        let mut data = std::mem::take(&mut self.data);
        data.pop();
        Some(SseEvent {
            event,
            data,
            id: self.last_event_id.clone(),
        })
    }
}

/// reader から行を読み、確定したイベントを順に on_event へ渡す。
/// 行末（LF / CRLF / CR）が届いた時点で行を処理するので、単独の CR でも次の LF を待たない。
/// on_event が Stop を返したら読み取りをやめる（接続の解放は呼び出し側の drop）。
pub fn read_events<R: BufRead>(
    mut reader: R,
    on_event: &mut dyn FnMut(SseEvent) -> Result<StreamControl, Error>,
) -> Result<(), Error> {
    let mut parser = SseParser::new();
    let mut line: Vec<u8> = Vec::new();
    // 直前が CR なら続く LF は同じ行末（CRLF）
    let mut after_cr = false;
    loop {
        let chunk = match reader.fill_buf() {
            Ok(chunk) => chunk,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::stream(format!("Failed to read stream: {}", e))),
        };
        if chunk.is_empty() {
            return Ok(());
        }
        let mut used = 0;
        let mut stopped = false;
        for &byte in chunk {
            used += 1;
            if after_cr && byte == b'\n' {
                after_cr = false;
                continue;
            }
            after_cr = byte == b'\r';
            if byte != b'\r' && byte != b'\n' {
                line.push(byte);
                continue;
            }
            let text = String::from_utf8_lossy(&line).into_owned();
            line.clear();
            if let Some(ev) = parser.feed_line(&text) {
                if on_event(ev)? == StreamControl::Stop {
                    stopped = true;
                    break;
                }
            }
        }
        reader.consume(used);
        if stopped {
            return Ok(());
        }
    }
}
