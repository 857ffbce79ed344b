//! Advice chat view.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::prompt::chat_user_message;
use crate::tui::styles::SunTheme;

use super::{render_footer, render_header};

/// Longest message the input box accepts.
pub const MAX_INPUT_LEN: usize = 500;

const GREETING: &str = "Hi! Ask me anything about protecting your skin today.";

/// Who wrote a chat line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// One chat message.
#[derive(Debug, Clone)]
pub struct ChatLine {
    pub role: ChatRole,
    pub text: String,
}

/// Chat screen state
pub struct ChatState {
    pub messages: Vec<ChatLine>,
    pub input: String,
    pub streaming: bool,
    pub error: Option<String>,
}

impl Default for ChatState {
    fn default() -> Self {
        Self {
            messages: vec![ChatLine {
                role: ChatRole::Assistant,
                text: GREETING.to_string(),
            }],
            input: String::new(),
            streaming: false,
            error: None,
        }
    }
}

impl ChatState {
    pub fn input_char(&mut self, c: char) {
        if !c.is_control() && self.input.chars().count() < MAX_INPUT_LEN {
            self.input.push(c);
        }
    }

    pub fn delete_char(&mut self) {
        self.input.pop();
    }

    /// Take the input as a new user message and open an empty assistant
    /// message for the reply. Blank input sends the default greeting.
    /// Returns `None` while a reply is still streaming.
    pub fn submit(&mut self) -> Option<String> {
        if self.streaming {
            return None;
        }
        let text = chat_user_message(&self.input);
        self.input.clear();
        self.error = None;
        self.messages.push(ChatLine {
            role: ChatRole::User,
            text: text.clone(),
        });
        self.begin_reply();
        Some(text)
    }

    /// Open an empty assistant message that chunks are appended to.
    pub fn begin_reply(&mut self) {
        self.messages.push(ChatLine {
            role: ChatRole::Assistant,
            text: String::new(),
        });
        self.streaming = true;
    }

    /// Append a streamed fragment to the open assistant message.
    pub fn push_chunk(&mut self, chunk: &str) {
        match self.messages.last_mut() {
            Some(line) if line.role == ChatRole::Assistant => line.text.push_str(chunk),
            _ => self.messages.push(ChatLine {
                role: ChatRole::Assistant,
                text: chunk.to_string(),
            }),
        }
    }

    /// Replace the open assistant message with a complete text.
    pub fn finish_reply(&mut self, text: &str) {
        self.push_chunk("");
        if let Some(line) = self.messages.last_mut() {
            line.text = text.to_string();
        }
        self.streaming = false;
    }

    pub fn end_stream(&mut self) {
        self.streaming = false;
    }

    /// Drop an unanswered assistant message and show `message` instead.
    pub fn fail(&mut self, message: String) {
        if self
            .messages
            .last()
            .is_some_and(|l| l.role == ChatRole::Assistant && l.text.is_empty())
        {
            self.messages.pop();
        }
        self.streaming = false;
        self.error = Some(message);
    }
}

/// Render the chat screen
pub fn render_chat(f: &mut Frame, area: Rect, state: &ChatState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Messages
            Constraint::Length(3), // Input
            Constraint::Length(2), // Footer
        ])
        .split(area);

    render_header(f, chunks[0], "Advice Chat", "Personalized sun-safety assistant");

    let mut lines = Vec::new();
    for message in &state.messages {
        let (who, style) = match message.role {
            ChatRole::User => ("You", SunTheme::info()),
            ChatRole::Assistant => ("AtmosGuard", SunTheme::subtitle()),
        };
        lines.push(Line::from(Span::styled(format!("{who}:"), style)));
        for text_line in message.text.lines() {
            lines.push(Line::from(Span::styled(
                format!("  {text_line}"),
                SunTheme::text(),
            )));
        }
        lines.push(Line::from(""));
    }

    // Keep the newest lines in view.
    let visible = usize::from(chunks[1].height.saturating_sub(2));
    let scroll = lines.len().saturating_sub(visible);
    let scroll = u16::try_from(scroll).unwrap_or(u16::MAX);
    f.render_widget(
        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(SunTheme::border()),
            )
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0)),
        chunks[1],
    );

    let input = Paragraph::new(Line::from(vec![
        Span::styled(" > ", SunTheme::key_hint()),
        Span::styled(state.input.as_str(), SunTheme::text()),
        Span::styled("▌", SunTheme::cursor()),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(SunTheme::border_focused()),
    );
    f.render_widget(input, chunks[2]);

    let busy = state.streaming.then_some("Thinking");
    render_footer(
        f,
        chunks[3],
        state.error.as_deref(),
        busy,
        &[("Enter", "Send"), ("Tab", "Today's advice"), ("Esc", "Back")],
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_opens_reply() {
        let mut state = ChatState::default();
        for c in "Do I need a hat?".chars() {
            state.input_char(c);
        }

        assert_eq!(state.submit().as_deref(), Some("Do I need a hat?"));
        assert!(state.input.is_empty());
        assert!(state.streaming);

        state.push_chunk("Yes, ");
        state.push_chunk("a wide brim.");
        state.end_stream();

        let last = state.messages.last().expect("Should have reply");
        assert_eq!(last.role, ChatRole::Assistant);
        assert_eq!(last.text, "Yes, a wide brim.");
        assert!(!state.streaming);
    }

    #[test]
    fn test_blank_submit_sends_greeting() {
        let mut state = ChatState::default();
        state.input = "   ".to_string();
        assert_eq!(
            state.submit().as_deref(),
            Some("Hello! Give me today's sun protection advice.")
        );
    }

    #[test]
    fn test_busy_submit_is_ignored() {
        let mut state = ChatState::default();
        state.input = "hello".to_string();
        state.streaming = true;
        assert!(state.submit().is_none());
        assert_eq!(state.input, "hello");
    }

    #[test]
    fn test_fail_drops_empty_reply() {
        let mut state = ChatState::default();
        state.begin_reply();
        state.fail("Please set your location first".to_string());

        assert_eq!(state.messages.len(), 1);
        assert!(!state.streaming);
        assert_eq!(state.error.as_deref(), Some("Please set your location first"));
    }

    #[test]
    fn test_input_is_capped() {
        let mut state = ChatState::default();
        for _ in 0..(MAX_INPUT_LEN + 10) {
            state.input_char('a');
        }
        assert_eq!(state.input.chars().count(), MAX_INPUT_LEN);
    }
}
