//! Jee Core - Core types and per-user study session state for Chat Jee.

mod conversation;
mod library;
mod session;
mod types;

pub use conversation::{ConversationBuffer, ASSISTANT_LABEL, STUDENT_LABEL};
pub use library::{Document, DocumentLibrary};
pub use session::{SessionStats, StudySession};
pub use types::*;
