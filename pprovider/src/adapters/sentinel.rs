//! Extraction of DeepSeek-style tool calls written inline as marker text.
//!
//! Some self-hosted models emit tool calls inside the content channel:
//!
//! ```text
//! <|tool▁calls▁begin|><|tool▁call▁begin|>function<|tool▁sep|>get_weather
//! ```json
//! {"location":"Warsaw"}
//! ```<|tool▁call▁end|><|tool▁calls▁end|>
//! ```
//!
//! The extractor consumes content fragments as they stream in, passes plain text
//! through, and holds back anything that might still turn into a marker.

const CALLS_BEGIN: &str = "<|tool▁calls▁begin|>";
const CALLS_END: &str = "<|tool▁calls▁end|>";
const CALL_BEGIN: &str = "<|tool▁call▁begin|>";
const CALL_END: &str = "<|tool▁call▁end|>";
const SEPARATOR: &str = "<|tool▁sep|>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExtractedCall {
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct SentinelOutput {
    pub text: String,
    pub calls: Vec<ExtractedCall>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Wrapped,
    Single,
}

impl Block {
    fn end_marker(self) -> &'static str {
        match self {
            Self::Wrapped => CALLS_END,
            Self::Single => CALL_END,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct SentinelExtractor {
    pending: String,
    block: Option<Block>,
}

impl SentinelExtractor {
    pub fn push(&mut self, fragment: &str) -> SentinelOutput {
        self.pending.push_str(fragment);
        let mut output = SentinelOutput::default();

        loop {
            match self.block {
                None => match find_block_start(&self.pending) {
                    Some((start, block, marker_len)) => {
                        output.text.push_str(&self.pending[..start]);
                        self.pending.drain(..start + marker_len);
                        self.block = Some(block);
                    }
                    None => {
                        let emit = self.pending.len() - partial_marker_len(&self.pending);
                        output.text.push_str(&self.pending[..emit]);
                        self.pending.drain(..emit);
                        break;
                    }
                },
                Some(block) => {
                    let marker = block.end_marker();
                    let Some(end) = self.pending.find(marker) else {
                        break;
                    };
                    output.calls.extend(parse_block(&self.pending[..end]));
                    self.pending.drain(..end + marker.len());
                    self.block = None;
                }
            }
        }

        output
    }

    /// Releases held text. An unterminated block yields whatever calls it
    /// already describes and its marker text is dropped.
    pub fn finish(&mut self) -> SentinelOutput {
        let pending = std::mem::take(&mut self.pending);
        match self.block.take() {
            None => SentinelOutput {
                text: pending,
                calls: Vec::new(),
            },
            Some(_) => SentinelOutput {
                text: String::new(),
                calls: parse_block(&pending),
            },
        }
    }
}

fn find_block_start(text: &str) -> Option<(usize, Block, usize)> {
    let wrapped = text
        .find(CALLS_BEGIN)
        .map(|start| (start, Block::Wrapped, CALLS_BEGIN.len()));
    let single = text
        .find(CALL_BEGIN)
        .map(|start| (start, Block::Single, CALL_BEGIN.len()));

    match (wrapped, single) {
        (Some(wrapped), Some(single)) => Some(if wrapped.0 <= single.0 { wrapped } else { single }),
        (wrapped, single) => wrapped.or(single),
    }
}

/// Length of the longest suffix of `text` that is a proper prefix of a start
/// marker.
fn partial_marker_len(text: &str) -> usize {
    [CALLS_BEGIN, CALL_BEGIN]
        .into_iter()
        .flat_map(|marker| {
            marker
                .char_indices()
                .map(|(index, _)| index)
                .skip(1)
                .filter(move |&len| text.ends_with(&marker[..len]))
        })
        .max()
        .unwrap_or(0)
}

fn parse_block(block: &str) -> Vec<ExtractedCall> {
    block
        .split(CALL_BEGIN)
        .filter_map(|segment| {
            let segment = segment.split(CALL_END).next().unwrap_or_default();
            parse_call(segment)
        })
        .collect()
}

fn parse_call(segment: &str) -> Option<ExtractedCall> {
    let body = match segment.split_once(SEPARATOR) {
        Some((_, rest)) => rest,
        None => segment,
    };
    let body = body.trim();

    let (name, rest) = match body.find(['\n', '{']) {
        Some(split) => (body[..split].trim(), &body[split..]),
        None => (body, ""),
    };
    if name.is_empty() {
        return None;
    }

    let arguments = strip_fence(rest);
    Some(ExtractedCall {
        name: name.to_string(),
        arguments: if arguments.is_empty() {
            "{}".to_string()
        } else {
            arguments.to_string()
        },
    })
}

fn strip_fence(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(fenced) = text.strip_prefix("```") {
        text = match fenced.split_once('\n') {
            Some((_, rest)) => rest,
            None => fenced.trim_start_matches("json"),
        };
    }
    text.trim().trim_end_matches("```").trim()
}
