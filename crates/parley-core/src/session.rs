//! Client conversation state
//!
//! [`ChatSession`] is the single owned copy of the displayed conversation and
//! its loading flags. It is plain data: the [`crate::controller`] decides when
//! to mutate it, and renderers only read it.

use crate::turn::{DisplayTurn, Role, Turn};
use std::time::Duration;
use tokio::time::Instant;

/// Who produced an assistant update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    /// Text decoded from the proxy's event stream
    Network,
    /// Text revealed by the local simulator
    Simulated,
}

#[derive(Debug, Default)]
pub struct ChatSession {
    turns: Vec<DisplayTurn>,
    is_loading: bool,
    is_streaming: bool,
    is_simulated: bool,
    welcome_shown: bool,
    loading_since: Option<Instant>,
    revision: u64,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[DisplayTurn] {
        &self.turns
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_streaming(&self) -> bool {
        self.is_streaming
    }

    pub fn is_simulated(&self) -> bool {
        self.is_simulated
    }

    pub fn welcome_shown(&self) -> bool {
        self.welcome_shown
    }

    /// Bumped on every change to the turn list. Renderers compare it to decide
    /// when to snap back to the newest turn.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The wire form of the conversation, in order.
    pub fn history(&self) -> Vec<Turn> {
        self.turns.iter().map(DisplayTurn::to_turn).collect()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(DisplayTurn::new(Role::User, content, true));
        self.revision += 1;
    }

    /// Replace the trailing assistant turn's content, or append a new
    /// assistant turn when the conversation ends with a user turn.
    pub fn upsert_assistant(&mut self, content: &str, source: ReplySource) {
        match self.turns.last_mut() {
            Some(last) if last.is_assistant() => {
                last.content.clear();
                last.content.push_str(content);
                if source == ReplySource::Simulated {
                    last.animated = false;
                }
            }
            _ => {
                let animated = source == ReplySource::Simulated;
                self.turns
                    .push(DisplayTurn::new(Role::Assistant, content, animated));
            }
        }
        self.revision += 1;
    }

    pub fn begin_loading(&mut self) {
        self.is_loading = true;
        self.loading_since = Some(Instant::now());
    }

    pub fn end_loading(&mut self) {
        self.is_loading = false;
        self.loading_since = None;
    }

    pub fn set_streaming(&mut self, streaming: bool) {
        self.is_streaming = streaming;
    }

    pub fn set_simulated(&mut self, simulated: bool) {
        self.is_simulated = simulated;
    }

    pub fn mark_welcome_shown(&mut self) {
        self.welcome_shown = true;
    }

    /// Whether the delayed "assistant is thinking" placeholder should show:
    /// loading for at least `delay` with neither a stream nor a simulation
    /// producing text yet.
    pub fn thinking_visible(&self, delay: Duration) -> bool {
        if !self.is_loading || self.is_streaming || self.is_simulated {
            return false;
        }
        self.loading_since
            .is_some_and(|since| since.elapsed() >= delay)
    }

    /// Drop every turn and reset all flags, so the welcome plays again.
    pub fn reset(&mut self) {
        let revision = self.revision + 1;
        *self = Self {
            revision,
            ..Self::default()
        };
    }
}
