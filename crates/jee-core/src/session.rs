//! Per-user study session: transcript, conversation context and materials.

use crate::conversation::ConversationBuffer;
use crate::library::{Document, DocumentLibrary};
use crate::types::{ChatMessage, Notice, UserInfo};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Everything the chat page renders for one signed-in user.
#[derive(Debug, Clone)]
pub struct StudySession {
    pub user: Option<UserInfo>,
    /// Messages shown in the transcript.
    pub messages: Vec<ChatMessage>,
    /// Context fed back to the model.
    pub conversation: ConversationBuffer,
    pub library: DocumentLibrary,
    pub started_at: DateTime<Utc>,
    /// Number of successful model replies.
    pub total_messages: u64,
    pub pdf_files_processed: usize,
    notices: Vec<Notice>,
}

/// Summary numbers shown in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub duration: String,
    pub messages: u64,
    pub pdfs_processed: usize,
    pub has_materials: bool,
}

impl StudySession {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            user: None,
            messages: Vec::new(),
            conversation: ConversationBuffer::new(history_capacity),
            library: DocumentLibrary::new(),
            started_at: Utc::now(),
            total_messages: 0,
            pdf_files_processed: 0,
            notices: Vec::new(),
        }
    }

    pub fn with_user(mut self, user: UserInfo) -> Self {
        self.user = Some(user);
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn has_materials(&self) -> bool {
        !self.library.is_empty()
    }

    /// Materials text for the prompt, or `None` when nothing was uploaded.
    pub fn materials(&self) -> Option<String> {
        if self.library.is_empty() {
            None
        } else {
            Some(self.library.combined_text())
        }
    }

    /// Replace the loaded materials with a freshly processed batch.
    pub fn load_materials(&mut self, documents: Vec<Document>) {
        self.library.clear();
        self.pdf_files_processed = documents.len();
        for doc in documents {
            self.library.insert(doc);
        }
    }

    pub fn clear_history(&mut self) {
        self.messages.clear();
        self.conversation.clear();
    }

    pub fn clear_materials(&mut self) {
        self.library.clear();
        self.pdf_files_processed = 0;
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    /// Take all pending notices; they are shown exactly once.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn stats(&self) -> SessionStats {
        self.stats_at(Utc::now())
    }

    pub fn stats_at(&self, now: DateTime<Utc>) -> SessionStats {
        SessionStats {
            duration: format_duration(now - self.started_at),
            messages: self.total_messages,
            pdfs_processed: self.pdf_files_processed,
            has_materials: self.has_materials(),
        }
    }
}

impl Default for StudySession {
    fn default() -> Self {
        Self::new(ConversationBuffer::DEFAULT_CAPACITY)
    }
}

/// Format an elapsed duration as `H:MM:SS`, dropping fractional seconds.
pub fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.num_seconds().max(0);
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::seconds(0)), "0:00:00");
        assert_eq!(format_duration(Duration::seconds(75)), "0:01:15");
        assert_eq!(format_duration(Duration::seconds(3 * 3600 + 5)), "3:00:05");
        assert_eq!(format_duration(Duration::milliseconds(1999)), "0:00:01");
        assert_eq!(format_duration(Duration::seconds(-4)), "0:00:00");
    }

    #[test]
    fn test_stats_reflect_state() {
        let mut session = StudySession::default();
        let start = session.started_at;

        let stats = session.stats_at(start + Duration::seconds(61));
        assert_eq!(stats.duration, "0:01:01");
        assert_eq!(stats.messages, 0);
        assert!(!stats.has_materials);

        session.load_materials(vec![Document::new("a.pdf", "text")]);
        session.total_messages = 3;
        let stats = session.stats_at(start);
        assert_eq!(stats.pdfs_processed, 1);
        assert_eq!(stats.messages, 3);
        assert!(stats.has_materials);
    }

    #[test]
    fn test_clear_history_keeps_materials() {
        let mut session = StudySession::default();
        session.messages.push(ChatMessage::user("hi"));
        session.conversation.push_exchange("hi", "hello");
        session.load_materials(vec![Document::new("a.pdf", "text")]);

        session.clear_history();

        assert!(session.messages.is_empty());
        assert!(session.conversation.is_empty());
        assert!(session.has_materials());
    }

    #[test]
    fn test_clear_materials_resets_counter() {
        let mut session = StudySession::default();
        session.load_materials(vec![
            Document::new("a.pdf", "one"),
            Document::new("b.pdf", "two"),
        ]);
        assert_eq!(session.pdf_files_processed, 2);
        assert!(session.materials().unwrap().contains("Content from b.pdf"));

        session.clear_materials();
        assert_eq!(session.pdf_files_processed, 0);
        assert!(session.materials().is_none());
    }

    #[test]
    fn test_notices_are_drained_once() {
        let mut session = StudySession::default();
        session.push_notice(Notice::success("Chat history cleared!"));

        assert_eq!(session.drain_notices().len(), 1);
        assert!(session.drain_notices().is_empty());
    }
}
