//! Size-capped conversation buffer fed back into every prompt.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Label prefixed to the student's side of an exchange.
pub const STUDENT_LABEL: &str = "Student";

/// Label prefixed to the tutor's side of an exchange.
pub const ASSISTANT_LABEL: &str = "Chat Jee";

/// Ordered, bounded history of labelled conversation lines.
///
/// Every exchange adds two lines (`Student: ...` and `Chat Jee: ...`). Once
/// the buffer holds more than `capacity` lines the oldest lines are dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl ConversationBuffer {
    /// Default number of retained lines (20 exchanges).
    pub const DEFAULT_CAPACITY: usize = 40;

    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(256)),
            capacity,
        }
    }

    /// Record a completed question/answer pair.
    pub fn push_exchange(&mut self, question: &str, reply: &str) {
        self.lines
            .push_back(format!("{}: {}", STUDENT_LABEL, question));
        self.lines
            .push_back(format!("{}: {}", ASSISTANT_LABEL, reply));

        while self.lines.len() > self.capacity {
            self.lines.pop_front();
        }
    }

    /// The last `n` lines, oldest first.
    pub fn recent(&self, n: usize) -> Vec<&str> {
        let skip = self.lines.len().saturating_sub(n);
        self.lines.iter().skip(skip).map(String::as_str).collect()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl Default for ConversationBuffer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
