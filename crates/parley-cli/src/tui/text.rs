//! Styled text produced by the renderers

use super::theme::Element;
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub element: Element,
}

impl Span {
    pub fn new(text: impl Into<String>, element: Element) -> Self {
        Self {
            text: text.into(),
            element,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Element::Text)
    }
}

/// One terminal row worth of spans
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn from_spans(spans: Vec<Span>) -> Self {
        let mut line = Self::blank();
        for span in spans {
            line.push(span);
        }
        line
    }

    pub fn styled(text: impl Into<String>, element: Element) -> Self {
        Self::from_spans(vec![Span::new(text, element)])
    }

    /// Append a span, merging it into the last one when the style matches.
    pub fn push(&mut self, span: Span) {
        if span.text.is_empty() {
            return;
        }
        match self.spans.last_mut() {
            Some(last) if last.element == span.element => last.text.push_str(&span.text),
            _ => self.spans.push(span),
        }
    }

    /// Prepend `prefix` as its own span.
    pub fn prefixed(mut self, prefix: &str, element: Element) -> Self {
        if !prefix.is_empty() {
            self.spans.insert(0, Span::new(prefix, element));
        }
        self
    }

    pub fn is_blank(&self) -> bool {
        self.spans.iter().all(|s| s.text.trim().is_empty())
    }

    /// Unstyled content of the line.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Display width in terminal columns.
    pub fn width(&self) -> usize {
        self.spans.iter().map(|s| s.text.width()).sum()
    }
}
