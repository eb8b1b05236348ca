//! Incremental decoding of backend response bodies into JSON frames.
//!
//! Two framings are supported: newline-delimited JSON and server-sent events.
//! Input is buffered as bytes so records and UTF-8 characters may be split
//! across chunks at any position.
//!
//! ```rust
//! use pprovider::{FrameDecoder, FramingMode};
//!
//! let mut decoder = FrameDecoder::new(FramingMode::EventStream);
//! let mut frames = decoder.push(b"data: {\"n\":1}\n\ndata: {\"n\"").expect("decode");
//! frames.extend(decoder.push(b":2}\n\ndata: [DONE]\n\n").expect("decode"));
//!
//! assert_eq!(frames.len(), 2);
//! assert!(frames.iter().all(|frame| !frame.terminal));
//! assert!(decoder.is_finished());
//! ```

use std::pin::Pin;

use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use serde_json::Value;

use crate::ProviderError;

pub type FrameStream<'a> = Pin<Box<dyn Stream<Item = Result<Frame, ProviderError>> + Send + 'a>>;

const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramingMode {
    Ndjson,
    EventStream,
}

/// One decoded record. `terminal` is set when the record itself ends the
/// stream (`"done": true`); `[DONE]` and end of input end it without a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub value: Value,
    pub terminal: bool,
}

impl Frame {
    pub fn new(value: Value, terminal: bool) -> Self {
        Self { value, terminal }
    }
}

#[derive(Debug)]
pub struct FrameDecoder {
    framing: FramingMode,
    buffer: Vec<u8>,
    scanned: usize,
    event_data: Vec<String>,
    finished: bool,
}

impl FrameDecoder {
    pub fn new(framing: FramingMode) -> Self {
        Self {
            framing,
            buffer: Vec::new(),
            scanned: 0,
            event_data: Vec::new(),
            finished: false,
        }
    }

    pub fn framing(&self) -> FramingMode {
        self.framing
    }

    /// True once a terminal record or `[DONE]` was seen, or `finish` ran.
    /// Further input is ignored.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Returns every record completed by `chunk` right away. Only bytes appended
    /// since the last call are scanned for line breaks.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<Frame>, ProviderError> {
        let mut frames = Vec::new();
        if self.finished {
            return Ok(frames);
        }

        self.buffer.extend_from_slice(chunk);
        let mut start = 0;
        let mut search_from = self.scanned;
        while let Some(offset) = find_newline(&self.buffer[search_from..]) {
            let newline = search_from + offset;
            let line = decode_line(&self.buffer[start..newline])?;
            start = newline + 1;
            search_from = start;
            self.process_line(line, &mut frames)?;

            if self.finished {
                self.buffer.clear();
                self.scanned = 0;
                return Ok(frames);
            }
        }

        self.buffer.drain(..start);
        self.scanned = self.buffer.len();
        Ok(frames)
    }

    /// Flushes any unterminated trailing record.
    pub fn finish(&mut self) -> Result<Vec<Frame>, ProviderError> {
        let mut frames = Vec::new();
        if self.finished {
            return Ok(frames);
        }

        if !self.buffer.is_empty() {
            self.scanned = 0;
            let rest = std::mem::take(&mut self.buffer);
            let line = decode_line(&rest)?;
            self.process_line(line, &mut frames)?;
        }

        if !self.finished && self.framing == FramingMode::EventStream {
            self.dispatch_event(&mut frames)?;
        }

        self.end();
        Ok(frames)
    }

    fn process_line(&mut self, line: String, frames: &mut Vec<Frame>) -> Result<(), ProviderError> {
        match self.framing {
            FramingMode::Ndjson => {
                let record = line.trim();
                if record.is_empty() {
                    return Ok(());
                }
                let value = parse_record(record)?;
                self.accept(value, frames);
            }
            FramingMode::EventStream => {
                if line.trim().is_empty() {
                    return self.dispatch_event(frames);
                }
                if line.starts_with(':') {
                    return Ok(());
                }
                if let Some(data) = line.strip_prefix("data:") {
                    let data = data.strip_prefix(' ').unwrap_or(data);
                    self.event_data.push(data.to_string());
                }
            }
        }

        Ok(())
    }

    fn dispatch_event(&mut self, frames: &mut Vec<Frame>) -> Result<(), ProviderError> {
        if self.event_data.is_empty() {
            return Ok(());
        }

        let payload = self.event_data.join("\n");
        self.event_data.clear();

        if payload.trim() == DONE_SENTINEL {
            self.end();
            return Ok(());
        }

        let value = parse_record(&payload)?;
        self.accept(value, frames);
        Ok(())
    }

    fn accept(&mut self, value: Value, frames: &mut Vec<Frame>) {
        let done = value.get("done").and_then(Value::as_bool).unwrap_or(false);
        frames.push(Frame::new(value, done));
        if done {
            self.end();
        }
    }

    fn end(&mut self) {
        self.finished = true;
        self.event_data.clear();
    }
}

/// Lazily decodes a byte-chunk stream. Each frame is yielded as soon as its
/// record is complete. The stream stops at the first terminal frame, `[DONE]`
/// or decode error and cannot be restarted.
pub fn decode_frames<'a, S, B>(chunks: S, framing: FramingMode) -> FrameStream<'a>
where
    S: Stream<Item = Result<B, ProviderError>> + Send + 'a,
    B: AsRef<[u8]> + Send + 'a,
{
    let stream = try_stream! {
        let mut decoder = FrameDecoder::new(framing);
        let mut chunks = Box::pin(chunks);

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            for frame in decoder.push(chunk.as_ref())? {
                yield frame;
            }
            if decoder.is_finished() {
                break;
            }
        }

        for frame in decoder.finish()? {
            yield frame;
        }
    };

    Box::pin(stream) as FrameStream<'a>
}

/// Treats a complete non-streaming response body as a single terminal frame.
pub fn decode_document(body: &[u8]) -> Result<Frame, ProviderError> {
    let text = decode_line(body)?;
    let value = parse_record(text.trim())?;
    Ok(Frame::new(value, true))
}

fn find_newline(bytes: &[u8]) -> Option<usize> {
    bytes.iter().position(|byte| *byte == b'\n')
}

fn decode_line(bytes: &[u8]) -> Result<String, ProviderError> {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8(bytes.to_vec()).map_err(|err| {
        ProviderError::decode(String::from_utf8_lossy(bytes), format!("invalid UTF-8: {err}"))
    })
}

fn parse_record(raw: &str) -> Result<Value, ProviderError> {
    let value = serde_json::from_str::<Value>(raw)
        .map_err(|err| ProviderError::decode(raw, err.to_string()))?;

    if !value.is_object() {
        return Err(ProviderError::decode(raw, "expected a JSON object"));
    }

    Ok(value)
}
