use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{PrintStyledContent, StyledContent},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Stdout, Write};
use unicode_width::UnicodeWidthChar;

use super::text::Line;
use super::theme::Theme;

/// One full screen of content
#[derive(Debug, Default)]
pub struct Frame {
    pub rows: Vec<Line>,
    /// Where to show the cursor, if anywhere
    pub cursor: Option<(u16, u16)>,
}

/// Raw-mode alternate screen. Restored on [`Terminal::exit`] or drop.
pub struct Terminal {
    stdout: Stdout,
    width: u16,
    height: u16,
    keyboard_enhanced: bool,
    active: bool,
}

impl Terminal {
    pub fn new() -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self {
            stdout: io::stdout(),
            width,
            height,
            keyboard_enhanced: false,
            active: false,
        })
    }

    pub fn enter(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        self.active = true;

        if execute!(
            self.stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )
        .is_ok()
        {
            self.keyboard_enhanced = true;
            tracing::debug!("kitty keyboard enhancement enabled");
        }

        execute!(self.stdout, EnterAlternateScreen, Hide, Clear(ClearType::All))
    }

    pub fn exit(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        execute!(self.stdout, Show, LeaveAlternateScreen)?;
        if self.keyboard_enhanced {
            let _ = execute!(self.stdout, PopKeyboardEnhancementFlags);
        }
        terminal::disable_raw_mode()?;
        self.stdout.flush()
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn handle_resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    /// Repaint every row, clipping lines to the terminal width.
    pub fn draw(&mut self, frame: &Frame, theme: &Theme) -> io::Result<()> {
        queue!(self.stdout, Hide)?;

        for row in 0..self.height {
            queue!(self.stdout, MoveTo(0, row))?;
            if let Some(line) = frame.rows.get(row as usize) {
                let mut remaining = self.width as usize;
                for span in &line.spans {
                    if remaining == 0 {
                        break;
                    }
                    let text = clip(&span.text, &mut remaining);
                    let styled = StyledContent::new(theme.style_for(span.element), text);
                    queue!(self.stdout, PrintStyledContent(styled))?;
                }
            }
            queue!(self.stdout, Clear(ClearType::UntilNewLine))?;
        }

        if let Some((column, row)) = frame.cursor {
            queue!(self.stdout, MoveTo(column, row), Show)?;
        }
        self.stdout.flush()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.exit();
    }
}

/// The prefix of `text` that fits in `remaining` columns.
fn clip<'a>(text: &'a str, remaining: &mut usize) -> &'a str {
    let mut end = 0;
    for (i, c) in text.char_indices() {
        let width = c.width().unwrap_or(0);
        if width > *remaining {
            return &text[..i];
        }
        *remaining -= width;
        end = i + c.len_utf8();
    }
    &text[..end]
}
