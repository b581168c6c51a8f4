//! Property-based tests for the reply stream decoder
//!
//! However the network splits a well-formed reply into chunks, the decoder
//! must yield the same text deltas in the same order, including when a split
//! lands inside a multi-byte character.

use parley_core::{EventStreamDecoder, StreamItem};
use proptest::prelude::*;

fn frame(text: &str) -> String {
    format!("data: {}\n\n", serde_json::json!({ "text": text }))
}

fn encode(deltas: &[String]) -> Vec<u8> {
    let mut body: String = deltas.iter().map(|d| frame(d)).collect();
    body.push_str("data: [DONE]\n\n");
    body.into_bytes()
}

fn decode_in_chunks(body: &[u8], cuts: &[usize]) -> Vec<StreamItem> {
    let mut decoder = EventStreamDecoder::new();
    let mut items = Vec::new();
    let mut start = 0;
    for &cut in cuts {
        items.extend(decoder.feed(&body[start..cut]));
        start = cut;
    }
    items.extend(decoder.feed(&body[start..]));
    items.extend(decoder.finish());
    items
}

fn delta_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 .,!?]{1,20}",
        "[\\u{00e0}-\\u{00ff}\\u{4e00}-\\u{4e20}]{1,6}",
        Just("🦀 ok".to_string()),
        Just("line\nbreak".to_string()),
    ]
}

fn body_and_cuts() -> impl Strategy<Value = (Vec<String>, Vec<u8>, Vec<usize>)> {
    prop::collection::vec(delta_strategy(), 0..8).prop_flat_map(|deltas| {
        let body = encode(&deltas);
        let len = body.len();
        let cuts = prop::collection::vec(0..=len, 0..6).prop_map(|mut cuts| {
            cuts.sort_unstable();
            cuts
        });
        (Just(deltas), Just(body), cuts)
    })
}

proptest! {
    #[test]
    fn prop_chunking_does_not_change_decoded_text((deltas, body, cuts) in body_and_cuts()) {
        let items = decode_in_chunks(&body, &cuts);

        let mut expected: Vec<StreamItem> =
            deltas.iter().cloned().map(StreamItem::Text).collect();
        expected.push(StreamItem::Done);
        prop_assert_eq!(items, expected);
    }

    #[test]
    fn prop_decoder_never_holds_a_complete_frame(deltas in prop::collection::vec(delta_strategy(), 1..5)) {
        let body: String = deltas.iter().map(|d| frame(d)).collect();
        let mut decoder = EventStreamDecoder::new();
        let items = decoder.feed(body.as_bytes());

        prop_assert_eq!(items.len(), deltas.len());
        prop_assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn prop_garbage_lines_are_skipped(noise in "[a-z ]{0,30}", text in "[a-z]{1,10}") {
        let body = format!("{noise}\n\ndata: not json\n\n{}", frame(&text));
        let items = decode_in_chunks(body.as_bytes(), &[]);
        prop_assert_eq!(items, vec![StreamItem::Text(text)]);
    }
}
