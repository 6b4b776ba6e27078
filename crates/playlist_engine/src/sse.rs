//! Incremental Server-Sent Events framing.
//!
//! Chunks may split lines (and UTF-8 sequences) anywhere; bytes are buffered
//! until a newline arrives and a frame is emitted on each blank line.

use engine_logging::engine_warn;

/// One dispatched SSE frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SseFrame {
    pub event: Option<String>,
    pub id: Option<String>,
    /// Reconnection hint in milliseconds.
    pub retry: Option<u64>,
    /// `data:` lines joined with `\n`.
    pub data: String,
}

/// Longest line kept while waiting for its newline.
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

#[derive(Debug)]
pub struct SseParser {
    buffer: Vec<u8>,
    pending: SseFrame,
    data_lines: Vec<String>,
    has_fields: bool,
    max_line_bytes: usize,
    /// Set after an oversized line was dropped; bytes are skipped up to its newline.
    skipping: bool,
}

impl Default for SseParser {
    fn default() -> Self {
        Self::with_max_line_bytes(DEFAULT_MAX_LINE_BYTES)
    }
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line_bytes(max_line_bytes: usize) -> Self {
        Self {
            buffer: Vec::new(),
            pending: SseFrame::default(),
            data_lines: Vec::new(),
            has_fields: false,
            max_line_bytes,
            skipping: false,
        }
    }

    /// Feeds a chunk and returns every frame it completed.
    ///
    /// A line longer than the limit is dropped together with the frame it belongs to.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        let mut frames = Vec::new();
        let mut chunk = chunk;
        if self.skipping {
            match chunk.iter().position(|byte| *byte == b'\n') {
                Some(pos) => {
                    self.skipping = false;
                    chunk = &chunk[pos + 1..];
                }
                None => return frames,
            }
        }

        self.buffer.extend_from_slice(chunk);
        while let Some(pos) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line).into_owned();
            if let Some(frame) = self.process_line(&line) {
                frames.push(frame);
            }
        }

        if self.buffer.len() > self.max_line_bytes {
            engine_warn!(
                "Dropping event stream line longer than {} bytes",
                self.max_line_bytes
            );
            self.buffer.clear();
            self.pending = SseFrame::default();
            self.data_lines.clear();
            self.has_fields = false;
            self.skipping = true;
        }
        frames
    }

    /// Flushes a trailing frame when the stream ends without a blank line.
    pub fn finish(&mut self) -> Option<SseFrame> {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&rest).into_owned();
            let line = line.trim_end_matches('\r');
            if let Some(frame) = self.process_line(line) {
                return Some(frame);
            }
        }
        self.take_frame()
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.take_frame();
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = line
            .split_once(':')
            .map(|(field, value)| (field, value.strip_prefix(' ').unwrap_or(value)))
            .unwrap_or((line, ""));
        match field {
            "event" => self.pending.event = Some(value.to_string()),
            "data" => self.data_lines.push(value.to_string()),
            "id" => self.pending.id = Some(value.to_string()),
            "retry" => self.pending.retry = value.parse().ok(),
            _ => return None,
        }
        self.has_fields = true;
        None
    }

    fn take_frame(&mut self) -> Option<SseFrame> {
        if !std::mem::take(&mut self.has_fields) {
            return None;
        }
        let mut frame = std::mem::take(&mut self.pending);
        frame.data = std::mem::take(&mut self.data_lines).join("\n");
        Some(frame)
    }
}
