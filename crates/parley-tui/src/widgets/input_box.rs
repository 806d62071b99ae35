//! Single-line text input widget

use crate::input::Action;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

/// Single-line text input with cursor movement and horizontal scrolling
#[derive(Debug, Default)]
pub struct InputBox {
    /// Current input text
    content: String,
    /// Cursor position as a character index
    cursor: usize,
    /// Horizontal scroll offset (in display columns)
    scroll: usize,
    /// Placeholder text shown while empty
    placeholder: String,
    /// Whether the input is focused
    focused: bool,
}

impl InputBox {
    /// Create a new input box
    pub fn new() -> Self {
        Self::default()
    }

    /// Set placeholder text
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Set focus state
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Get the current content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Clear the content
    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
        self.scroll = 0;
    }

    /// Byte offset of the character index `idx`
    fn byte_at(&self, idx: usize) -> usize {
        self.content
            .char_indices()
            .nth(idx)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    /// Display width of the text before the cursor
    fn cursor_column(&self) -> usize {
        self.content
            .chars()
            .take(self.cursor)
            .map(|c| c.width().unwrap_or(0))
            .sum()
    }

    fn insert_char(&mut self, c: char) {
        let at = self.byte_at(self.cursor);
        self.content.insert(at, c);
        self.cursor += 1;
    }

    /// Remove the character at character index `idx`
    fn remove_char(&mut self, idx: usize) {
        let start = self.byte_at(idx);
        let end = self.byte_at(idx + 1);
        self.content.drain(start..end);
    }

    /// Handle an input action; returns true if the action was consumed
    pub fn handle_action(&mut self, action: &Action, width: u16) -> bool {
        let char_count = self.content.chars().count();

        let consumed = match action {
            Action::Char(c) => {
                self.insert_char(*c);
                true
            }
            Action::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.remove_char(self.cursor);
                    true
                } else {
                    false
                }
            }
            Action::Delete => {
                if self.cursor < char_count {
                    self.remove_char(self.cursor);
                    true
                } else {
                    false
                }
            }
            Action::Left => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    true
                } else {
                    false
                }
            }
            Action::Right => {
                if self.cursor < char_count {
                    self.cursor += 1;
                    true
                } else {
                    false
                }
            }
            Action::Home => {
                self.cursor = 0;
                true
            }
            Action::End => {
                self.cursor = char_count;
                true
            }
            Action::ClearLine => {
                self.clear();
                true
            }
            Action::DeleteWord => {
                let chars: Vec<char> = self.content.chars().collect();
                let mut start = self.cursor;
                while start > 0 && chars[start - 1] == ' ' {
                    start -= 1;
                }
                while start > 0 && chars[start - 1] != ' ' {
                    start -= 1;
                }
                let (from, to) = (self.byte_at(start), self.byte_at(self.cursor));
                self.content.drain(from..to);
                self.cursor = start;
                true
            }
            Action::Paste(text) => {
                // Flatten pasted newlines into spaces for single-line input
                for c in text.chars() {
                    match c {
                        '\n' | '\r' => {
                            if !self.content.ends_with(' ') && self.cursor > 0 {
                                self.insert_char(' ');
                            }
                        }
                        _ => self.insert_char(c),
                    }
                }
                true
            }
            _ => false,
        };

        if consumed {
            self.update_scroll(width as usize);
        }
        consumed
    }

    fn update_scroll(&mut self, width: usize) {
        // Account for borders and a padding column
        let visible = width.saturating_sub(4);
        let column = self.cursor_column();

        if column < self.scroll {
            self.scroll = column;
        } else if visible > 0 && column >= self.scroll + visible {
            self.scroll = column - visible + 1;
        }
    }

    /// Render the input box
    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(if self.focused {
                theme.accent_style()
            } else {
                theme.border_style()
            });

        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let (text, style) = if self.content.is_empty() {
            (self.placeholder.clone(), theme.dim_style())
        } else {
            (self.visible_slice(inner.width as usize), theme.base_style())
        };
        Paragraph::new(text).style(style).render(inner, buf);

        if self.focused {
            let cursor_x = self.cursor_column().saturating_sub(self.scroll);
            if cursor_x < inner.width as usize {
                let pos = (inner.x + cursor_x as u16, inner.y);
                if let Some(cell) = buf.cell_mut(pos) {
                    cell.set_style(Style::default().bg(theme.accent));
                }
            }
        }
    }

    /// The horizontally scrolled portion of the content that fits the width
    fn visible_slice(&self, width: usize) -> String {
        let mut column = 0;
        let mut out = String::new();
        for c in self.content.chars() {
            let w = c.width().unwrap_or(0);
            if column + w <= self.scroll {
                column += w;
                continue;
            }
            if column + w > self.scroll + width {
                break;
            }
            out.push(c);
            column += w;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(input: &mut InputBox, s: &str) {
        for c in s.chars() {
            input.handle_action(&Action::Char(c), 80);
        }
    }

    #[test]
    fn test_typing_and_clear() {
        let mut input = InputBox::new();
        type_str(&mut input, "hello");
        assert_eq!(input.content(), "hello");
        input.clear();
        assert_eq!(input.content(), "");
    }

    #[test]
    fn test_backspace_at_cursor() {
        let mut input = InputBox::new();
        type_str(&mut input, "hallo");
        input.handle_action(&Action::Left, 80);
        input.handle_action(&Action::Left, 80);
        input.handle_action(&Action::Left, 80);
        input.handle_action(&Action::Backspace, 80);
        input.handle_action(&Action::Char('e'), 80);
        assert_eq!(input.content(), "hello");
    }

    #[test]
    fn test_backspace_on_empty_not_consumed() {
        let mut input = InputBox::new();
        assert!(!input.handle_action(&Action::Backspace, 80));
    }

    #[test]
    fn test_multibyte_editing() {
        let mut input = InputBox::new();
        type_str(&mut input, "héllo");
        input.handle_action(&Action::Home, 80);
        input.handle_action(&Action::Right, 80);
        input.handle_action(&Action::Right, 80);
        input.handle_action(&Action::Backspace, 80);
        assert_eq!(input.content(), "hllo");
    }

    #[test]
    fn test_delete_word() {
        let mut input = InputBox::new();
        type_str(&mut input, "what's the weather");
        input.handle_action(&Action::DeleteWord, 80);
        assert_eq!(input.content(), "what's the ");
    }

    #[test]
    fn test_paste_flattens_newlines() {
        let mut input = InputBox::new();
        input.handle_action(&Action::Paste("one\r\ntwo".to_string()), 80);
        assert_eq!(input.content(), "one two");
    }

    #[test]
    fn test_submit_not_consumed() {
        let mut input = InputBox::new();
        type_str(&mut input, "hi");
        assert!(!input.handle_action(&Action::Submit, 80));
        assert_eq!(input.content(), "hi");
    }
}
