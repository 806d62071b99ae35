//! Message list widget for displaying the chat transcript

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Who a rendered message is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

/// A single message in the transcript view
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub speaker: Speaker,
    pub content: String,
    /// Render the content in the error style
    pub is_error: bool,
}

impl ChatMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            content: content.into(),
            is_error: false,
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            content: content.into(),
            is_error: false,
        }
    }

    /// Create an assistant message rendered as an error
    pub fn error(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            content: content.into(),
            is_error: true,
        }
    }
}

/// Widget for displaying a list of chat messages
pub struct MessageList<'a> {
    messages: &'a [ChatMessage],
    theme: &'a Theme,
    scroll: usize,
}

impl<'a> MessageList<'a> {
    /// Create a new message list
    pub fn new(messages: &'a [ChatMessage], theme: &'a Theme) -> Self {
        Self {
            messages,
            theme,
            scroll: 0,
        }
    }

    /// Set scroll offset (in lines)
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    fn render_message(&self, msg: &ChatMessage, width: usize) -> Vec<Line<'static>> {
        let (header, header_style) = match msg.speaker {
            Speaker::User => ("▶ You".to_string(), self.theme.accent_bold()),
            Speaker::Assistant => (
                "◀ Assistant".to_string(),
                self.theme.success_style().add_modifier(Modifier::BOLD),
            ),
        };

        let content_style = if msg.is_error {
            self.theme.error_style()
        } else {
            self.theme.base_style()
        };

        let mut lines = vec![Line::from(Span::styled(header, header_style))];
        let content_width = width.saturating_sub(2).max(1);
        for wrapped in textwrap::wrap(&msg.content, content_width) {
            lines.push(Line::from(Span::styled(
                format!("  {wrapped}"),
                content_style,
            )));
        }
        // Blank separator between messages
        lines.push(Line::from(""));
        lines
    }
}

impl Widget for MessageList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let width = area.width as usize;
        let mut all_lines: Vec<Line> = Vec::new();
        for msg in self.messages {
            all_lines.extend(self.render_message(msg, width));
        }

        let visible: Vec<Line> = all_lines
            .into_iter()
            .skip(self.scroll)
            .take(area.height as usize)
            .collect();

        Paragraph::new(visible).render(area, buf);
    }
}

/// Total rendered height of the transcript at the given width. Used by the
/// caller for scroll clamping and stick-to-bottom behavior; must stay in
/// step with `render_message`.
pub fn transcript_height(messages: &[ChatMessage], width: usize) -> usize {
    let content_width = width.saturating_sub(2).max(1);
    messages
        .iter()
        .map(|msg| 2 + textwrap::wrap(&msg.content, content_width).len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_counts_header_content_and_separator() {
        let messages = vec![ChatMessage::assistant("hi")];
        // header + one content line + separator
        assert_eq!(transcript_height(&messages, 40), 3);
    }

    #[test]
    fn test_height_grows_with_wrapping() {
        let messages = vec![ChatMessage::user("a".repeat(50))];
        let wide = transcript_height(&messages, 80);
        let narrow = transcript_height(&messages, 20);
        assert!(narrow > wide);
    }

    #[test]
    fn test_height_handles_tiny_width() {
        let messages = vec![ChatMessage::user("hello world")];
        // Must not panic or underflow when the area is narrower than padding
        assert!(transcript_height(&messages, 1) >= 3);
    }
}
