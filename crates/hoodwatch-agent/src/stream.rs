//! # NDJSON Writer
//!
//! Writes one JSON message per line and flushes after each, so a reader on
//! the other end of a pipe sees every reply as soon as it is produced.

use std::io::Write;

use serde::Serialize;
use serde_json::Value;

/// Line-delimited JSON writer.
///
/// Not synchronized; the server loop owns its writer.
pub struct NdjsonWriter<W: Write> {
    writer: W,
    written: u64,
}

impl<W: Write> NdjsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Serializes `message` onto a single line and flushes.
    pub fn write_message<T: Serialize>(&mut self, message: &T) -> Result<(), StreamError> {
        let payload = serde_json::to_string(message)?;
        self.writer.write_all(payload.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.written += 1;
        Ok(())
    }

    /// Number of messages written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parses NDJSON output back into messages, skipping blank lines.
pub fn parse_messages(input: &str) -> Result<Vec<Value>, serde_json::Error> {
    input
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line))
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn writes_one_message_per_line() {
        let mut writer = NdjsonWriter::new(Vec::new());
        writer
            .write_message(&json!({ "id": 1, "text": "multi\nline" }))
            .expect("write");
        writer.write_message(&json!({ "id": 2 })).expect("write");
        assert_eq!(writer.written(), 2);

        let output = String::from_utf8(writer.into_inner()).expect("utf8");
        assert_eq!(output.lines().count(), 2);

        let messages = parse_messages(&output).expect("parse");
        assert_eq!(messages[0]["text"], "multi\nline");
        assert_eq!(messages[1]["id"], 2);
    }

    #[test]
    fn parse_rejects_malformed_lines() {
        assert!(parse_messages("{\"ok\":true}\nnot json\n").is_err());
    }
}
