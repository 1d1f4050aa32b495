//! Chat transcript.
//!
//! The client keeps an append-only, bounded transcript of system notices
//! and player messages. Sending, moderation and fan-out are the server's
//! business; this side only records what arrives.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Default transcript capacity.
pub const DEFAULT_HISTORY: usize = 200;

/// One transcript line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatLine {
    /// Server-originated notice.
    System(String),
    /// Player-originated message.
    Message { from: String, text: String },
}

impl std::fmt::Display for ChatLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatLine::System(text) => write!(f, "* {text}"),
            ChatLine::Message { from, text } => write!(f, "{from}: {text}"),
        }
    }
}

/// Bounded append-only transcript.
#[derive(Debug)]
pub struct ChatLog {
    lines: VecDeque<ChatLine>,
    max: usize,
    /// Total lines ever appended, including evicted ones. Lets a display
    /// layer track what it has already shown.
    total: u64,
}

impl ChatLog {
    pub fn new(max: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            max,
            total: 0,
        }
    }

    pub fn push_system(&mut self, text: impl Into<String>) {
        self.push(ChatLine::System(text.into()));
    }

    pub fn push_message(&mut self, from: impl Into<String>, text: impl Into<String>) {
        self.push(ChatLine::Message {
            from: from.into(),
            text: text.into(),
        });
    }

    fn push(&mut self, line: ChatLine) {
        self.lines.push_back(line);
        self.total += 1;
        while self.lines.len() > self.max {
            self.lines.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total lines ever appended (monotonic).
    pub fn total(&self) -> u64 {
        self.total
    }

    /// The most recent `count` lines, oldest first.
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &ChatLine> {
        let skip = self.lines.len().saturating_sub(count);
        self.lines.iter().skip(skip)
    }
}

impl Default for ChatLog {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_appends_in_order() {
        let mut log = ChatLog::new(10);
        log.push_system("Alice joined");
        log.push_message("Alice", "hello");

        let lines: Vec<_> = log.recent(10).cloned().collect();
        assert_eq!(
            lines,
            vec![
                ChatLine::System("Alice joined".into()),
                ChatLine::Message {
                    from: "Alice".into(),
                    text: "hello".into()
                },
            ]
        );
    }

    #[test]
    fn transcript_drops_oldest_past_cap() {
        let mut log = ChatLog::new(3);
        for i in 0..5 {
            log.push_system(format!("line {i}"));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.total(), 5);
        let first = log.recent(3).next().cloned().unwrap();
        assert_eq!(first, ChatLine::System("line 2".into()));
    }

    #[test]
    fn line_display_formats() {
        assert_eq!(ChatLine::System("Game ended.".into()).to_string(), "* Game ended.");
        assert_eq!(
            ChatLine::Message {
                from: "Bob".into(),
                text: "hi".into()
            }
            .to_string(),
            "Bob: hi"
        );
    }
}
