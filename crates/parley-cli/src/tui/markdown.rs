//! Markdown to terminal lines
//!
//! Parses with markdown-it (CommonMark plus GFM tables) and lays the AST out
//! as [`Line`]s for a given width. Paragraph text is wrapped with textwrap's
//! first-fit algorithm over styled word fragments, so styling survives line
//! breaks. Strong emphasis is rendered as plain text.

use markdown_it::parser::inline::Text;
use markdown_it::plugins::cmark::block::blockquote::Blockquote;
use markdown_it::plugins::cmark::block::code::CodeBlock;
use markdown_it::plugins::cmark::block::fence::CodeFence;
use markdown_it::plugins::cmark::block::heading::ATXHeading;
use markdown_it::plugins::cmark::block::hr::ThematicBreak;
use markdown_it::plugins::cmark::block::list::{BulletList, ListItem, OrderedList};
use markdown_it::plugins::cmark::block::paragraph::Paragraph;
use markdown_it::plugins::cmark::inline::backticks::CodeInline;
use markdown_it::plugins::cmark::inline::emphasis::Em;
use markdown_it::plugins::cmark::inline::link::Link;
use markdown_it::plugins::cmark::inline::newline::{Hardbreak, Softbreak};
use markdown_it::plugins::extra::tables::{Table, TableBody, TableCell, TableHead, TableRow};
use markdown_it::{MarkdownIt, Node};
use textwrap::core::Fragment;
use textwrap::wrap_algorithms::wrap_first_fit;
use unicode_width::UnicodeWidthStr;

use super::text::{Line, Span};
use super::theme::Element;

const MAX_RULE_WIDTH: usize = 40;

mod box_chars {
    pub const TOP_LEFT: char = '┌';
    pub const TOP_RIGHT: char = '┐';
    pub const BOTTOM_LEFT: char = '└';
    pub const BOTTOM_RIGHT: char = '┘';
    pub const HORIZONTAL: char = '─';
    pub const VERTICAL: char = '│';
    pub const TOP_T: char = '┬';
    pub const BOTTOM_T: char = '┴';
    pub const LEFT_T: char = '├';
    pub const RIGHT_T: char = '┤';
    pub const CROSS: char = '┼';
}

pub struct MarkdownRenderer {
    parser: MarkdownIt,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        let mut parser = MarkdownIt::new();
        markdown_it::plugins::cmark::add(&mut parser);
        markdown_it::plugins::extra::tables::add(&mut parser);
        Self { parser }
    }

    /// Render `markdown` into lines no wider than `width` (code blocks and
    /// tables may overflow and are clipped when painted).
    pub fn render(&self, markdown: &str, width: usize) -> Vec<Line> {
        let ast = self.parser.parse(markdown);
        render_blocks(&ast.children, width.max(1), true)
    }
}

/// Lay out sibling blocks, optionally separated by blank lines.
///
/// Tight list items hold their inline content directly rather than inside a
/// paragraph, so runs of inline nodes are wrapped together as one paragraph.
fn render_blocks(nodes: &[Node], width: usize, loose: bool) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut inline_run: Vec<Span> = Vec::new();

    let emit = |block: Vec<Line>, lines: &mut Vec<Line>| {
        if block.is_empty() {
            return;
        }
        if loose && !lines.is_empty() {
            lines.push(Line::blank());
        }
        lines.extend(block);
    };

    for node in nodes {
        if !is_block(node) {
            collect_inline(node, Element::Text, &mut inline_run);
            continue;
        }
        if !inline_run.is_empty() {
            emit(wrap_spans(&std::mem::take(&mut inline_run), width), &mut lines);
        }
        emit(render_block(node, width), &mut lines);
    }
    if !inline_run.is_empty() {
        emit(wrap_spans(&inline_run, width), &mut lines);
    }
    lines
}

fn is_block(node: &Node) -> bool {
    node.is::<Paragraph>()
        || node.is::<ATXHeading>()
        || node.is::<CodeFence>()
        || node.is::<CodeBlock>()
        || node.is::<Blockquote>()
        || node.is::<BulletList>()
        || node.is::<OrderedList>()
        || node.is::<ThematicBreak>()
        || node.is::<Table>()
}

fn render_block(node: &Node, width: usize) -> Vec<Line> {
    if node.cast::<ATXHeading>().is_some() {
        return wrap_spans(&inline_spans(node, Element::Heading), width);
    }

    if let Some(fence) = node.cast::<CodeFence>() {
        return code_lines(&fence.content);
    }

    if let Some(code) = node.cast::<CodeBlock>() {
        return code_lines(&code.content);
    }

    if node.cast::<Blockquote>().is_some() {
        let inner = render_blocks(&node.children, width.saturating_sub(2).max(1), true);
        return inner
            .into_iter()
            .map(|line| line.prefixed("│ ", Element::Blockquote))
            .collect();
    }

    if node.cast::<BulletList>().is_some() {
        return render_list(node, width, |_| "- ".to_string());
    }

    if let Some(list) = node.cast::<OrderedList>() {
        let start = list.start as usize;
        return render_list(node, width, |i| format!("{}. ", start + i));
    }

    if node.cast::<ThematicBreak>().is_some() {
        let rule: String = std::iter::repeat(box_chars::HORIZONTAL)
            .take(width.min(MAX_RULE_WIDTH))
            .collect();
        return vec![Line::styled(rule, Element::Rule)];
    }

    if node.cast::<Table>().is_some() {
        return render_table(node);
    }

    wrap_spans(&inline_spans(node, Element::Text), width)
}

fn code_lines(content: &str) -> Vec<Line> {
    content
        .trim_end_matches('\n')
        .lines()
        .map(|line| Line::styled(format!("  {line}"), Element::CodeBlock))
        .collect()
}

/// Render list items with a marker on the first line and a hanging indent on
/// the rest. Nested lists stay tight under their item.
fn render_list<F>(node: &Node, width: usize, marker: F) -> Vec<Line>
where
    F: Fn(usize) -> String,
{
    let mut lines = Vec::new();
    let items = node.children.iter().filter(|c| c.cast::<ListItem>().is_some());

    for (i, item) in items.enumerate() {
        let marker = marker(i);
        let indent = " ".repeat(marker.width());
        let inner_width = width.saturating_sub(marker.width()).max(1);
        let body = render_blocks(&item.children, inner_width, false);

        if body.is_empty() {
            lines.push(Line::styled(marker.trim_end(), Element::ListMarker));
            continue;
        }
        for (row, line) in body.into_iter().enumerate() {
            if row == 0 {
                lines.push(line.prefixed(&marker, Element::ListMarker));
            } else {
                lines.push(line.prefixed(&indent, Element::Text));
            }
        }
    }
    lines
}

/// Flatten a node's inline children into styled spans. A `"\n"` span marks a
/// hard break.
fn inline_spans(node: &Node, element: Element) -> Vec<Span> {
    let mut spans = Vec::new();
    for child in node.children.iter() {
        collect_inline(child, element, &mut spans);
    }
    spans
}

fn collect_inline(node: &Node, element: Element, spans: &mut Vec<Span>) {
    if let Some(text) = node.cast::<Text>() {
        spans.push(Span::new(text.content.clone(), element));
        return;
    }

    if node.cast::<CodeInline>().is_some() {
        spans.push(Span::new(collect_text(node), Element::InlineCode));
        return;
    }

    if node.cast::<Em>().is_some() {
        for child in node.children.iter() {
            collect_inline(child, Element::Emphasis, spans);
        }
        return;
    }

    if let Some(link) = node.cast::<Link>() {
        let label = collect_text(node);
        let shows_target = label != link.url;
        spans.push(Span::new(label, Element::Link));
        if shows_target {
            spans.push(Span::new(format!(" ({})", link.url), Element::LinkTarget));
        }
        return;
    }

    if node.cast::<Softbreak>().is_some() {
        spans.push(Span::new(" ", element));
        return;
    }

    if node.cast::<Hardbreak>().is_some() {
        spans.push(Span::new("\n", element));
        return;
    }

    // Strong and anything unrecognised keep the surrounding style
    for child in node.children.iter() {
        collect_inline(child, element, spans);
    }
}

fn collect_text(node: &Node) -> String {
    let mut text = String::new();
    if let Some(t) = node.cast::<Text>() {
        text.push_str(&t.content);
    }
    for child in node.children.iter() {
        text.push_str(&collect_text(child));
    }
    text
}

/// A styled word plus the whitespace that followed it
#[derive(Debug)]
struct Word<'a> {
    text: &'a str,
    whitespace: &'a str,
    element: Element,
}

impl Fragment for Word<'_> {
    fn width(&self) -> f64 {
        self.text.width() as f64
    }

    fn whitespace_width(&self) -> f64 {
        self.whitespace.width() as f64
    }

    fn penalty_width(&self) -> f64 {
        0.0
    }
}

/// Wrap styled spans to `width`, honouring hard breaks.
fn wrap_spans(spans: &[Span], width: usize) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut segment: Vec<Word<'_>> = Vec::new();

    for span in spans {
        if span.text == "\n" {
            lines.extend(wrap_words(&segment, width));
            segment.clear();
            continue;
        }
        split_words(&span.text, span.element, &mut segment);
    }
    lines.extend(wrap_words(&segment, width));

    if lines.iter().all(Line::is_blank) {
        return Vec::new();
    }
    lines
}

fn split_words<'a>(text: &'a str, element: Element, words: &mut Vec<Word<'a>>) {
    let mut rest = text;

    // Leading whitespace belongs to the previous word
    let trimmed = rest.trim_start();
    let leading = &rest[..rest.len() - trimmed.len()];
    if !leading.is_empty() {
        match words.last_mut() {
            Some(prev) if prev.whitespace.is_empty() => prev.whitespace = leading,
            _ => {}
        }
    }
    rest = trimmed;

    while !rest.is_empty() {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let (word, after) = rest.split_at(end);
        let next = after.trim_start();
        let whitespace = &after[..after.len() - next.len()];
        words.push(Word {
            text: word,
            whitespace,
            element,
        });
        rest = next;
    }
}

fn wrap_words(words: &[Word<'_>], width: usize) -> Vec<Line> {
    if words.is_empty() {
        return Vec::new();
    }

    wrap_first_fit(words, &[width as f64])
        .into_iter()
        .map(|row| {
            let mut line = Line::blank();
            for (i, word) in row.iter().enumerate() {
                line.push(Span::new(word.text, word.element));
                let Some(next) = row.get(i + 1) else {
                    break;
                };
                if !word.whitespace.is_empty() {
                    // A space between two differently styled words stays plain
                    let element = if next.element == word.element {
                        word.element
                    } else {
                        Element::Text
                    };
                    line.push(Span::new(" ", element));
                }
            }
            line
        })
        .collect()
}

/// Render a GFM table with box-drawing borders. Header cells are bold.
fn render_table(node: &Node) -> Vec<Line> {
    let mut header: Vec<Vec<String>> = Vec::new();
    let mut body: Vec<Vec<String>> = Vec::new();

    for section in node.children.iter() {
        let target = if section.cast::<TableHead>().is_some() {
            &mut header
        } else if section.cast::<TableBody>().is_some() {
            &mut body
        } else {
            continue;
        };
        for row in section.children.iter().filter(|r| r.cast::<TableRow>().is_some()) {
            let cells = row
                .children
                .iter()
                .filter(|c| c.cast::<TableCell>().is_some())
                .map(|c| {
                    inline_spans(c, Element::Text)
                        .iter()
                        .map(|s| s.text.as_str())
                        .collect::<String>()
                        .trim()
                        .to_string()
                })
                .collect();
            target.push(cells);
        }
    }

    let columns = header
        .iter()
        .chain(body.iter())
        .map(Vec::len)
        .max()
        .unwrap_or(0);
    if columns == 0 {
        return Vec::new();
    }

    let mut widths = vec![0usize; columns];
    for row in header.iter().chain(body.iter()) {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.width());
        }
    }

    let mut lines = vec![border(
        &widths,
        box_chars::TOP_LEFT,
        box_chars::TOP_T,
        box_chars::TOP_RIGHT,
    )];
    for row in &header {
        lines.push(data_row(row, &widths, Element::TableHeader));
    }
    if !header.is_empty() && !body.is_empty() {
        lines.push(border(
            &widths,
            box_chars::LEFT_T,
            box_chars::CROSS,
            box_chars::RIGHT_T,
        ));
    }
    for row in &body {
        lines.push(data_row(row, &widths, Element::Text));
    }
    lines.push(border(
        &widths,
        box_chars::BOTTOM_LEFT,
        box_chars::BOTTOM_T,
        box_chars::BOTTOM_RIGHT,
    ));
    lines
}

fn border(widths: &[usize], left: char, middle: char, right: char) -> Line {
    let mut text = String::new();
    text.push(left);
    for (i, width) in widths.iter().enumerate() {
        if i > 0 {
            text.push(middle);
        }
        text.extend(std::iter::repeat(box_chars::HORIZONTAL).take(width + 2));
    }
    text.push(right);
    Line::styled(text, Element::TableBorder)
}

fn data_row(cells: &[String], widths: &[usize], element: Element) -> Line {
    let vertical = box_chars::VERTICAL.to_string();
    let mut line = Line::styled(vertical.clone(), Element::TableBorder);
    for (i, width) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        let padding = " ".repeat(width - cell.width());
        line.push(Span::plain(" "));
        line.push(Span::new(cell, element));
        line.push(Span::plain(format!("{padding} ")));
        line.push(Span::new(vertical.clone(), Element::TableBorder));
    }
    line
}
