use parley_core::{Role, Turn};
use serde_json::json;

pub const DONE_FRAME: &str = "data: [DONE]\n\n";

const NOTHING_TO_ECHO: &str = "(nothing to echo)";

/// The text an echoing upstream replies with: the content of the last user turn.
pub fn echo_text(turns: &[Turn]) -> String {
    turns
        .iter()
        .rev()
        .find(|turn| turn.role == Role::User)
        .map(|turn| turn.content.clone())
        .filter(|content| !content.is_empty())
        .unwrap_or_else(|| NOTHING_TO_ECHO.to_string())
}

/// Split `text` into `data:` frames of at most `chunk_chars` characters each,
/// followed by the terminator frame.
pub fn reply_frames(text: &str, chunk_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut frames: Vec<String> = chars
        .chunks(chunk_chars.max(1))
        .map(|piece| {
            let piece: String = piece.iter().collect();
            format!("data: {}\n\n", json!({ "text": piece }))
        })
        .collect();
    frames.push(DONE_FRAME.to_string());
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::{EventStreamDecoder, StreamItem};

    #[test]
    fn test_echo_uses_last_user_turn() {
        let turns = vec![
            Turn::user("first"),
            Turn::assistant("reply"),
            Turn::user("second"),
            Turn::assistant("trailing"),
        ];
        assert_eq!(echo_text(&turns), "second");
        assert_eq!(echo_text(&[Turn::assistant("only me")]), NOTHING_TO_ECHO);
    }

    #[test]
    fn test_frames_decode_back_to_text() {
        let frames = reply_frames("héllo, wörld", 4);
        assert_eq!(frames.len(), 5);
        assert_eq!(frames.last().map(String::as_str), Some(DONE_FRAME));

        let mut decoder = EventStreamDecoder::new();
        let mut text = String::new();
        let mut done = false;
        for frame in &frames {
            for item in decoder.feed(frame.as_bytes()) {
                match item {
                    StreamItem::Text(t) => text.push_str(&t),
                    StreamItem::Done => done = true,
                }
            }
        }
        assert_eq!(text, "héllo, wörld");
        assert!(done);
    }

    #[test]
    fn test_quotes_and_newlines_are_escaped() {
        let frames = reply_frames("say \"hi\"\nbye", 100);
        assert_eq!(frames[0], "data: {\"text\":\"say \\\"hi\\\"\\nbye\"}\n\n");
    }
}
