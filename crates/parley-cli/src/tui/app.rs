//! Chat TUI event loop
//!
//! [`ChatApp`] owns the session controller. Key presses, background session
//! updates and the animation ticker are multiplexed with `tokio::select!`, so
//! every mutation of the conversation happens on this one task.

use anyhow::Result;
use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use parley_core::{ChatTransport, ControllerSettings, SessionController, SessionUpdate};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use unicode_width::UnicodeWidthStr;

use super::input::{map_key_event, InputAction, InputBuffer};
use super::message_list::MessageList;
use super::terminal::{Frame, Terminal};
use super::text::{Line, Span};
use super::theme::{Element, Theme};

/// Animation and redraw cadence
const TICK: Duration = Duration::from_millis(150);

const PROMPT: &str = "> ";
const CONTINUATION: &str = "  ";
const KEY_HINTS: &str =
    "  Enter send · Shift+Enter newline · Ctrl+N new chat · PgUp/PgDn scroll · Esc quit";

/// Header, separator and a one-line prompt
const CHROME_ROWS: usize = 3;

/// Tallest the prompt grows before it scrolls with the cursor
const MAX_PROMPT_ROWS: usize = 5;

pub struct ChatApp<T: ?Sized> {
    controller: SessionController<T>,
    updates: mpsc::UnboundedReceiver<SessionUpdate>,
    input: InputBuffer,
    list: MessageList,
    theme: Theme,
    tick: u64,
    should_quit: bool,
}

impl<T> ChatApp<T>
where
    T: ChatTransport + ?Sized + 'static,
{
    pub fn new(transport: Arc<T>, settings: ControllerSettings) -> Self {
        let (controller, updates) = SessionController::new(transport, settings);
        Self {
            controller,
            updates,
            input: InputBuffer::new(),
            list: MessageList::new(),
            theme: Theme,
            tick: 0,
            should_quit: false,
        }
    }

    pub fn controller(&self) -> &SessionController<T> {
        &self.controller
    }

    pub fn input(&self) -> &InputBuffer {
        &self.input
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Start the conversation: plays the welcome message.
    pub fn mount(&mut self) {
        self.controller.mount();
    }

    /// Wait for the next background update and apply it, along with any
    /// others already queued.
    pub async fn next_update(&mut self) {
        if let Some(update) = self.updates.recv().await {
            self.controller.apply(update);
        }
        while let Ok(update) = self.updates.try_recv() {
            self.controller.apply(update);
        }
    }

    /// Apply one key action. `page` is the scroll distance for PageUp/PageDown.
    pub fn handle_action(&mut self, action: InputAction, page: usize) {
        // The prompt is disabled while a reply or reveal is in flight
        let editable = self.controller.is_idle();

        match action {
            InputAction::Exit => self.should_quit = true,
            InputAction::NewChat => self.controller.new_chat(),
            InputAction::PageUp => self.list.scroll_up(page),
            InputAction::PageDown => self.list.scroll_down(page),
            _ if !editable => {}
            InputAction::Submit => self.submit(),
            InputAction::InsertChar(c) => self.input.insert(c),
            InputAction::InsertNewline => self.input.insert_newline(),
            InputAction::DeleteBack => self.input.delete_back(),
            InputAction::DeleteForward => self.input.delete_forward(),
            InputAction::MoveCursorLeft => self.input.move_left(),
            InputAction::MoveCursorRight => self.input.move_right(),
            InputAction::MoveCursorHome => self.input.move_home(),
            InputAction::MoveCursorEnd => self.input.move_end(),
            InputAction::None => {}
        }
    }

    fn submit(&mut self) {
        if self.input.is_blank() {
            return;
        }
        let text = self.input.take();
        if let Err(e) = self.controller.submit(&text) {
            tracing::warn!(error = %e, "Submission rejected");
        }
    }

    /// Lay out a full screen of `width` x `height`.
    pub fn frame(&mut self, width: usize, height: usize) -> Frame {
        let session = self.controller.session();
        let thinking = self.controller.thinking_visible();
        self.list
            .sync(session.revision(), thinking, session.turns().len(), self.tick);

        let idle = self.controller.is_idle();
        let (prompt, cursor_row, cursor_column) = self.prompt_lines(idle);

        let mut rows = Vec::with_capacity(height);
        rows.push(Line::from_spans(vec![
            Span::new("parley", Element::AssistantLabel),
            Span::new(KEY_HINTS, Element::Status),
        ]));

        let body_height = height.saturating_sub(2 + prompt.len());
        let lines = self
            .list
            .render(session.turns(), thinking, width, self.tick);
        let visible = self.list.visible(&lines, body_height);
        rows.extend(visible.iter().cloned());
        rows.resize(1 + body_height, Line::blank());

        rows.push(Line::styled("─".repeat(width), Element::Rule));

        let cursor = cursor_row.map(|row| {
            let column = cursor_column.min(width.saturating_sub(1));
            (column as u16, (rows.len() + row) as u16)
        });
        rows.extend(prompt);
        rows.truncate(height);

        Frame { rows, cursor }
    }

    /// The visible prompt rows, plus the cursor's row among them and its
    /// column. There is no cursor while the prompt is disabled.
    fn prompt_lines(&self, idle: bool) -> (Vec<Line>, Option<usize>, usize) {
        if !idle {
            let mut line = Line::styled(PROMPT, Element::Prompt);
            line.push(Span::new("waiting for reply…", Element::Status));
            return (vec![line], None, 0);
        }

        let lines = self.input.lines();
        let (cursor_line, cursor_chars) = self.input.cursor_position();
        let start = (cursor_line + 1).saturating_sub(MAX_PROMPT_ROWS);
        let end = (start + MAX_PROMPT_ROWS).min(lines.len());

        let rows = lines[start..end]
            .iter()
            .enumerate()
            .map(|(offset, text)| {
                let lead = if start + offset == 0 { PROMPT } else { CONTINUATION };
                let mut line = Line::styled(lead, Element::Prompt);
                line.push(Span::plain(*text));
                line
            })
            .collect();

        let before: String = lines[cursor_line].chars().take(cursor_chars).collect();
        let lead = if cursor_line == 0 { PROMPT } else { CONTINUATION };
        (rows, Some(cursor_line - start), lead.width() + before.width())
    }

    /// Drive the UI until the user quits.
    pub async fn run(mut self, terminal: &mut Terminal) -> Result<()> {
        let mut events = EventStream::new();
        let mut ticker = tokio::time::interval(TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        self.mount();

        while !self.should_quit {
            let (width, height) = terminal.size();
            let frame = self.frame(width as usize, height as usize);
            terminal.draw(&frame, &self.theme)?;

            tokio::select! {
                Some(update) = self.updates.recv() => {
                    self.controller.apply(update);
                    while let Ok(update) = self.updates.try_recv() {
                        self.controller.apply(update);
                    }
                }
                event = events.next() => match event {
                    Some(Ok(Event::Key(key))) => {
                        let page = (height as usize).saturating_sub(CHROME_ROWS).max(1);
                        self.handle_action(map_key_event(&key), page);
                    }
                    Some(Ok(Event::Resize(width, height))) => terminal.handle_resize(width, height),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                },
                _ = ticker.tick() => self.tick += 1,
            }
        }

        tracing::debug!("Chat UI closed");
        Ok(())
    }
}
