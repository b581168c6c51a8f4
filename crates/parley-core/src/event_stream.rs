//! Incremental decoder for `data: ` framed chat replies
//!
//! Frames are separated by a blank line (`\n\n`). Inside a frame every line
//! starting with `data: ` carries either the `[DONE]` sentinel or a JSON
//! object `{"text": "..."}`. Bytes are buffered across chunks so a frame split
//! between two network reads still decodes; `[DONE]` drops whatever is left of
//! the chunk it arrived in.

use serde::Deserialize;
use std::ops::ControlFlow;

pub const DATA_PREFIX: &str = "data: ";
pub const DONE_SENTINEL: &str = "[DONE]";

const FRAME_SEPARATOR: &[u8] = b"\n\n";

/// A decoded item from the reply stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamItem {
    /// A text delta to append to the reply
    Text(String),
    /// The `[DONE]` sentinel
    Done,
}

#[derive(Deserialize)]
struct DataLine {
    text: String,
}

/// Buffers raw bytes and yields complete [`StreamItem`]s.
#[derive(Debug, Default)]
pub struct EventStreamDecoder {
    buffer: Vec<u8>,
}

impl EventStreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one network chunk and return the items of every complete frame.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamItem> {
        self.buffer.extend_from_slice(chunk);

        let mut items = Vec::new();
        while let Some(end) = find_separator(&self.buffer) {
            let frame: Vec<u8> = self.buffer.drain(..end + FRAME_SEPARATOR.len()).collect();
            let frame = String::from_utf8_lossy(&frame[..end]);

            if decode_frame(&frame, &mut items).is_break() {
                self.buffer.clear();
                break;
            }
        }
        items
    }

    /// Decode whatever is left once the stream has ended.
    pub fn finish(&mut self) -> Vec<StreamItem> {
        let rest = std::mem::take(&mut self.buffer);
        let mut items = Vec::new();
        let frame = String::from_utf8_lossy(&rest);
        if !frame.trim().is_empty() {
            let _ = decode_frame(&frame, &mut items);
        }
        items
    }

    /// Bytes held back waiting for a frame separator.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

fn find_separator(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(FRAME_SEPARATOR.len())
        .position(|window| window == FRAME_SEPARATOR)
}

fn decode_frame(frame: &str, items: &mut Vec<StreamItem>) -> ControlFlow<()> {
    for line in frame.lines() {
        let Some(data) = line.strip_prefix(DATA_PREFIX) else {
            continue;
        };

        if data == DONE_SENTINEL {
            items.push(StreamItem::Done);
            return ControlFlow::Break(());
        }

        match serde_json::from_str::<DataLine>(data) {
            Ok(parsed) => items.push(StreamItem::Text(parsed.text)),
            Err(e) => tracing::warn!(error = %e, line = %data, "Skipping malformed stream data line"),
        }
    }
    ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> StreamItem {
        StreamItem::Text(s.to_string())
    }

    #[test]
    fn test_decodes_text_frames_and_done() {
        let mut decoder = EventStreamDecoder::new();
        let items = decoder.feed(b"data: {\"text\":\"Hel\"}\n\ndata: {\"text\":\"lo\"}\n\ndata: [DONE]\n\n");
        assert_eq!(items, vec![text("Hel"), text("lo"), StreamItem::Done]);
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_frame_split_across_chunks() {
        let mut decoder = EventStreamDecoder::new();
        assert!(decoder.feed(b"data: {\"te").is_empty());
        assert!(decoder.feed(b"xt\":\"Hi\"}\n").is_empty());
        assert_eq!(decoder.feed(b"\n"), vec![text("Hi")]);
    }

    #[test]
    fn test_multibyte_text_split_mid_character() {
        let frame = "data: {\"text\":\"héllo 👋\"}\n\n".as_bytes();
        let (a, b) = frame.split_at(17);
        let mut decoder = EventStreamDecoder::new();
        let mut items = decoder.feed(a);
        items.extend(decoder.feed(b));
        assert_eq!(items, vec![text("héllo 👋")]);
    }

    #[test]
    fn test_malformed_json_is_skipped() {
        let mut decoder = EventStreamDecoder::new();
        let items = decoder.feed(b"data: {not json\n\ndata: {\"text\":\"ok\"}\n\n");
        assert_eq!(items, vec![text("ok")]);
    }

    #[test]
    fn test_missing_text_field_is_skipped() {
        let mut decoder = EventStreamDecoder::new();
        let items = decoder.feed(b"data: {\"content\":\"x\"}\n\n");
        assert!(items.is_empty());
    }

    #[test]
    fn test_non_data_lines_ignored() {
        let mut decoder = EventStreamDecoder::new();
        let items = decoder.feed(b": keepalive\n\nevent: message\ndata: {\"text\":\"a\"}\n\n");
        assert_eq!(items, vec![text("a")]);
    }

    #[test]
    fn test_done_discards_rest_of_chunk_only() {
        let mut decoder = EventStreamDecoder::new();
        let items = decoder.feed(b"data: [DONE]\n\ndata: {\"text\":\"late\"}\n\ndata: {\"te");
        assert_eq!(items, vec![StreamItem::Done]);
        assert_eq!(decoder.pending(), 0);

        // A later chunk is processed again
        assert_eq!(decoder.feed(b"data: {\"text\":\"next\"}\n\n"), vec![text("next")]);
    }

    #[test]
    fn test_finish_flushes_unterminated_frame() {
        let mut decoder = EventStreamDecoder::new();
        assert!(decoder.feed(b"data: {\"text\":\"tail\"}").is_empty());
        assert_eq!(decoder.finish(), vec![text("tail")]);
        assert!(decoder.finish().is_empty());
    }
}
