//! Local streaming simulator
//!
//! Reveals a complete string a few characters at a time so canned messages
//! (welcome, apology) look like streamed replies. No network involved.

use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_SLICE_LEN: usize = 5;
pub const DEFAULT_REVEAL_INTERVAL: Duration = Duration::from_millis(25);

/// Pacing of a simulated reveal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealOptions {
    /// Maximum characters of a word revealed per tick
    pub slice_len: usize,
    /// Delay after each revealed slice
    pub interval: Duration,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            slice_len: DEFAULT_SLICE_LEN,
            interval: DEFAULT_REVEAL_INTERVAL,
        }
    }
}

/// How a reveal ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    Completed,
    Cancelled,
}

/// Split `message` into the deltas revealed on each tick.
///
/// Words are cut into pieces of at most `slice_len` characters. A piece never
/// spans a space: the space separating two words is carried as the leading
/// character of the next word's first piece. Concatenating the slices always
/// gives back `message`.
pub fn reveal_slices(message: &str, slice_len: usize) -> Vec<String> {
    let slice_len = slice_len.max(1);
    let mut slices = Vec::new();
    let mut pending = String::new();

    for (i, word) in message.split(' ').enumerate() {
        if i > 0 {
            pending.push(' ');
        }
        let chars: Vec<char> = word.chars().collect();
        for piece in chars.chunks(slice_len) {
            let mut slice = std::mem::take(&mut pending);
            slice.extend(piece);
            slices.push(slice);
        }
    }

    // Trailing spaces have no word to ride on
    if !pending.is_empty() {
        slices.push(pending);
    }
    slices
}

/// Progressively reveal `message`, calling `on_step` with the full revealed
/// prefix after each slice.
///
/// `cancel` is checked before every slice and interrupts the inter-slice
/// delay; once it fires `on_step` is never called again.
pub async fn reveal<F>(
    message: &str,
    options: RevealOptions,
    cancel: &CancellationToken,
    mut on_step: F,
) -> RevealOutcome
where
    F: FnMut(&str),
{
    let mut revealed = String::with_capacity(message.len());

    for slice in reveal_slices(message, options.slice_len) {
        if cancel.is_cancelled() {
            return RevealOutcome::Cancelled;
        }

        revealed.push_str(&slice);
        on_step(&revealed);

        tokio::select! {
            _ = cancel.cancelled() => return RevealOutcome::Cancelled,
            _ = tokio::time::sleep(options.interval) => {}
        }
    }

    RevealOutcome::Completed
}
