//! Conversation view
//!
//! Turns are laid out top to bottom: a role label, then the body indented by
//! two columns. User turns are plain wrapped text, assistant turns are
//! markdown. While the assistant is "thinking" an extra placeholder turn with
//! animated dots is appended.

use parley_core::{DisplayTurn, Role};

use super::markdown::MarkdownRenderer;
use super::text::{Line, Span};
use super::theme::Element;

const BODY_INDENT: &str = "  ";

/// Ticks an animated turn is drawn dimmed after it first appears
pub const ENTRANCE_TICKS: u64 = 3;

/// Three dots with one highlighted position, cycling with `tick`.
pub fn typing_dots(tick: u64) -> String {
    let lit = (tick % 3) as usize;
    (0..3)
        .map(|i| if i == lit { '●' } else { '·' })
        .map(String::from)
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct MessageList {
    markdown: MarkdownRenderer,
    /// Lines scrolled up from the bottom; 0 follows the newest turn
    scroll: usize,
    last_revision: Option<u64>,
    last_thinking: bool,
    /// Tick at which each turn index was first drawn
    first_seen: Vec<u64>,
}

impl Default for MessageList {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageList {
    pub fn new() -> Self {
        Self {
            markdown: MarkdownRenderer::new(),
            scroll: 0,
            last_revision: None,
            last_thinking: false,
            first_seen: Vec::new(),
        }
    }

    /// Record the session state before drawing. Snaps back to the newest turn
    /// whenever the turn list changed or the thinking placeholder toggled.
    pub fn sync(&mut self, revision: u64, thinking: bool, turn_count: usize, tick: u64) {
        if self.last_revision != Some(revision) || self.last_thinking != thinking {
            self.scroll = 0;
        }
        self.last_revision = Some(revision);
        self.last_thinking = thinking;

        self.first_seen.truncate(turn_count);
        while self.first_seen.len() < turn_count {
            self.first_seen.push(tick);
        }
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    /// Lay out the whole conversation for `width` columns.
    pub fn render(
        &self,
        turns: &[DisplayTurn],
        thinking: bool,
        width: usize,
        tick: u64,
    ) -> Vec<Line> {
        let mut lines = Vec::new();
        for (index, turn) in turns.iter().enumerate() {
            let entering = turn.animated
                && self
                    .first_seen
                    .get(index)
                    .is_some_and(|seen| tick.saturating_sub(*seen) < ENTRANCE_TICKS);
            lines.extend(self.render_turn(turn, width, tick, entering));
        }
        if thinking {
            let placeholder = DisplayTurn::typing_placeholder();
            lines.extend(self.render_turn(&placeholder, width, tick, false));
        }
        lines
    }

    /// The `height` rows to show, clamping the scroll offset to the content.
    pub fn visible<'a>(&mut self, lines: &'a [Line], height: usize) -> &'a [Line] {
        let max_scroll = lines.len().saturating_sub(height);
        self.scroll = self.scroll.min(max_scroll);
        let end = lines.len() - self.scroll;
        let start = end.saturating_sub(height);
        &lines[start..end]
    }

    fn render_turn(&self, turn: &DisplayTurn, width: usize, tick: u64, entering: bool) -> Vec<Line> {
        let body_width = width.saturating_sub(BODY_INDENT.len()).max(1);

        let (label, label_element) = match turn.role {
            Role::User => ("You", Element::UserLabel),
            Role::Assistant => ("Assistant", Element::AssistantLabel),
        };

        let body = if turn.is_typing {
            vec![Line::styled(typing_dots(tick), Element::TypingDots)]
        } else {
            match turn.role {
                Role::User => plain_lines(&turn.content, body_width),
                Role::Assistant => self.markdown.render(&turn.content, body_width),
            }
        };

        let mut lines = vec![Line::styled(label, label_element)];
        lines.extend(
            body.into_iter()
                .map(|line| line.prefixed(BODY_INDENT, Element::Text)),
        );
        lines.push(Line::blank());

        if entering {
            lines = lines.into_iter().map(dimmed).collect();
        }
        lines
    }
}

/// Wrap user text as typed, keeping its own line breaks.
fn plain_lines(content: &str, width: usize) -> Vec<Line> {
    textwrap::wrap(content, width)
        .into_iter()
        .map(|row| Line::styled(row.into_owned(), Element::Text))
        .collect()
}

fn dimmed(line: Line) -> Line {
    Line::from_spans(
        line.spans
            .into_iter()
            .map(|span| Span::new(span.text, Element::Status))
            .collect(),
    )
}
