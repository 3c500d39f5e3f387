//! Output sinks

use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

/// Append-only destination for rendered log lines
pub trait Sink: Send {
    /// Write a chunk of a line. Chunks of one call arrive in order.
    fn write_str(&mut self, text: &str) -> io::Result<()>;

    /// Current terminal width, `None` when unknown.
    fn columns(&self) -> Option<usize> {
        None
    }
}

/// Process error stream
#[derive(Debug, Default)]
pub struct StderrSink;

impl Sink for StderrSink {
    fn write_str(&mut self, text: &str) -> io::Result<()> {
        io::stderr().lock().write_all(text.as_bytes())
    }

    fn columns(&self) -> Option<usize> {
        crossterm::terminal::size()
            .ok()
            .map(|(cols, _)| cols as usize)
            .filter(|cols| *cols > 0)
    }
}

/// In-memory sink whose clones share one buffer
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<String>>,
    columns: Option<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a fixed terminal width
    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Everything written so far
    pub fn contents(&self) -> String {
        self.buffer.lock().clone()
    }

    /// Written lines, without their terminators
    pub fn lines(&self) -> Vec<String> {
        self.buffer.lock().lines().map(str::to_string).collect()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl Sink for MemorySink {
    fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.buffer.lock().push_str(text);
        Ok(())
    }

    fn columns(&self) -> Option<usize> {
        self.columns
    }
}

/// Any writer, with an optional fixed width
pub struct WriterSink<W> {
    writer: W,
    columns: Option<usize>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            columns: None,
        }
    }

    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = Some(columns);
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.writer.write_all(text.as_bytes())
    }

    fn columns(&self) -> Option<usize> {
        self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_shares_buffer() {
        let sink = MemorySink::new().with_columns(80);
        let mut writer = sink.clone();

        writer.write_str("first\n").unwrap();
        writer.write_str("second").unwrap();

        assert_eq!(sink.contents(), "first\nsecond");
        assert_eq!(sink.lines(), vec!["first", "second"]);
        assert_eq!(writer.columns(), Some(80));

        sink.clear();
        assert!(writer.contents().is_empty());
    }

    #[test]
    fn test_writer_sink() {
        let mut sink = WriterSink::new(Vec::new());
        sink.write_str("abc").unwrap();
        assert_eq!(sink.columns(), None);
        assert_eq!(sink.into_inner(), b"abc");
    }
}
