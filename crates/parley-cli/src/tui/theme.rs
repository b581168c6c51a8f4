//! Terminal styles for rendered elements

use crossterm::style::{Attribute, Attributes, Color, ContentStyle};

/// What a span of rendered text represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Element {
    #[default]
    Text,
    Heading,
    Emphasis,
    InlineCode,
    CodeBlock,
    Link,
    LinkTarget,
    ListMarker,
    Blockquote,
    TableBorder,
    TableHeader,
    Rule,
    UserLabel,
    AssistantLabel,
    TypingDots,
    Status,
    Prompt,
}

/// Maps elements to crossterm styles
#[derive(Debug, Clone, Copy, Default)]
pub struct Theme;

impl Theme {
    pub fn style_for(&self, element: Element) -> ContentStyle {
        match element {
            Element::Text => ContentStyle::new(),
            Element::Heading => styled(Some(Color::Cyan), &[Attribute::Bold]),
            Element::Emphasis => styled(None, &[Attribute::Italic]),
            Element::InlineCode | Element::CodeBlock => styled(Some(Color::Yellow), &[]),
            Element::Link => styled(Some(Color::Blue), &[Attribute::Underlined]),
            Element::LinkTarget | Element::Rule | Element::TableBorder | Element::Status => {
                styled(None, &[Attribute::Dim])
            }
            Element::ListMarker => styled(Some(Color::DarkGrey), &[]),
            Element::Blockquote => styled(Some(Color::DarkGrey), &[Attribute::Italic]),
            Element::TableHeader => styled(None, &[Attribute::Bold]),
            Element::UserLabel => styled(Some(Color::Green), &[Attribute::Bold]),
            Element::AssistantLabel => styled(Some(Color::Magenta), &[Attribute::Bold]),
            Element::TypingDots => styled(Some(Color::Magenta), &[]),
            Element::Prompt => styled(Some(Color::Green), &[Attribute::Bold]),
        }
    }
}

fn styled(foreground: Option<Color>, attributes: &[Attribute]) -> ContentStyle {
    let mut style = ContentStyle::new();
    style.foreground_color = foreground;
    style.attributes = attributes
        .iter()
        .fold(Attributes::default(), |acc, attr| acc | *attr);
    style
}
