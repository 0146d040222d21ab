//! One chat turn: validate the question, prompt the model, update the session.

use crate::client::GeminiClient;
use crate::error::GeminiError;
use crate::format::clean_response;
use crate::prompt::{build_tutor_prompt, PromptLimits};
use jee_config::{ChatConfig, GeminiConfig};
use jee_core::{ChatMessage, StudySession};
use tracing::{error, info, warn};

const NOT_AVAILABLE: &str = "❌ **Gemini AI module not available**

Please ensure that:
1. A Gemini API key is set (`GEMINI_API_KEY` or `gemini.api_key` in the config file)
2. The Gemini API is reachable from this machine
3. The configured model name is correct

You can still use this interface once the AI module is configured.";

const EMPTY_INPUT: &str = "Please enter a question or message.";

/// How a turn ended. Every variant carries the text to show the student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The model answered; the exchange was recorded.
    Answered(String),
    /// The input was rejected before reaching the model.
    Rejected(String),
    /// The model is not configured or the call failed.
    Failed(String),
}

impl TurnOutcome {
    pub fn text(&self) -> &str {
        match self {
            Self::Answered(text) | Self::Rejected(text) | Self::Failed(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Answered(text) | Self::Rejected(text) | Self::Failed(text) => text,
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, Self::Answered(_))
    }
}

/// The JEE tutor.
#[derive(Debug, Clone)]
pub struct Tutor {
    client: Option<GeminiClient>,
    limits: PromptLimits,
    max_input_chars: usize,
}

impl Tutor {
    pub fn new(client: Option<GeminiClient>, chat: &ChatConfig) -> Self {
        Self {
            client,
            limits: PromptLimits::from_config(chat),
            max_input_chars: chat.max_input_chars,
        }
    }

    /// Build a tutor; a missing API key leaves it without a client.
    pub fn from_config(gemini: &GeminiConfig, chat: &ChatConfig) -> Self {
        let client = match GeminiClient::from_config(gemini) {
            Ok(client) => {
                info!("Gemini client ready ({})", client.model());
                Some(client)
            }
            Err(GeminiError::NotConfigured) => {
                warn!("No Gemini API key configured; replies are disabled");
                None
            }
            Err(e) => {
                error!("Failed to create Gemini client: {}", e);
                None
            }
        };
        Self::new(client, chat)
    }

    pub fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    pub fn client(&self) -> Option<&GeminiClient> {
        self.client.as_ref()
    }

    /// Answer `input` using the session's materials and recent conversation.
    ///
    /// The conversation buffer and message counter change only when the
    /// model answers.
    pub async fn respond(&self, session: &mut StudySession, input: &str) -> TurnOutcome {
        let Some(client) = &self.client else {
            return TurnOutcome::Failed(NOT_AVAILABLE.to_string());
        };

        if input.trim().is_empty() {
            return TurnOutcome::Rejected(EMPTY_INPUT.to_string());
        }

        if input.chars().count() > self.max_input_chars {
            return TurnOutcome::Rejected(format!(
                "⚠️ Your message is too long. Please keep it under {} characters.",
                self.max_input_chars
            ));
        }

        let materials = session.materials();
        let history = session.conversation.recent(self.limits.history_lines);
        let prompt = build_tutor_prompt(input, materials.as_deref(), &history, &self.limits);

        match client.generate_text(&prompt).await {
            Ok(reply) => {
                let reply = clean_response(&reply);
                session.conversation.push_exchange(input, &reply);
                session.total_messages += 1;
                TurnOutcome::Answered(reply)
            }
            Err(e) => {
                error!("Error generating response: {}", e);
                TurnOutcome::Failed(error_message(&e))
            }
        }
    }

    /// Run a turn and append both sides to the displayed transcript.
    pub async fn chat(&self, session: &mut StudySession, input: &str) -> TurnOutcome {
        session.messages.push(ChatMessage::user(input));
        let outcome = self.respond(session, input).await;
        session.messages.push(ChatMessage::assistant(outcome.text()));
        outcome
    }
}

fn error_message(error: &GeminiError) -> String {
    format!(
        "❌ **Error generating response**

I encountered an error while processing your question: `{}`

**Possible solutions:**
1. Try rephrasing your question
2. Check your internet connection
3. Ensure the AI module is properly configured
4. Contact support if the issue persists

Please try again with a different question.",
        error
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::one_shot_server;
    use jee_core::Document;

    fn tutor_at(base: &str) -> Tutor {
        let client = GeminiClient::new(base, "gemini-1.5-pro", "k").unwrap();
        Tutor::new(Some(client), &ChatConfig::default())
    }

    #[tokio::test]
    async fn test_without_client() {
        let tutor = Tutor::new(None, &ChatConfig::default());
        let mut session = StudySession::default();

        let outcome = tutor.respond(&mut session, "What is a limit?").await;

        assert!(!tutor.is_ready());
        assert!(matches!(outcome, TurnOutcome::Failed(_)));
        assert!(outcome.text().contains("Gemini AI module not available"));
        assert_eq!(session.total_messages, 0);
    }

    #[tokio::test]
    async fn test_rejects_blank_and_long_input() {
        let tutor = tutor_at("http://127.0.0.1:9");
        let mut session = StudySession::default();

        let blank = tutor.respond(&mut session, "   \n").await;
        assert_eq!(blank, TurnOutcome::Rejected(EMPTY_INPUT.to_string()));

        let long = "x".repeat(5001);
        let outcome = tutor.respond(&mut session, &long).await;
        assert!(matches!(outcome, TurnOutcome::Rejected(_)));
        assert!(outcome.text().contains("under 5000 characters"));

        assert!(session.conversation.is_empty());
    }

    #[tokio::test]
    async fn test_answer_updates_session() {
        let (base, server) = one_shot_server(
            "200 OK",
            r#"{"candidates":[{"content":{"parts":[{"text":"A limit describes\n\n\n\napproach."}]}}]}"#,
        )
        .await;
        let tutor = tutor_at(&base);
        let mut session = StudySession::default();
        session.load_materials(vec![Document::new("calculus.pdf", "epsilon delta")]);

        let outcome = tutor.chat(&mut session, "What is a limit?").await;

        assert_eq!(
            outcome,
            TurnOutcome::Answered("A limit describes\n\napproach.".to_string())
        );
        assert_eq!(session.total_messages, 1);
        assert_eq!(session.messages.len(), 2);
        assert!(session.messages[0].is_user());
        assert_eq!(
            session.conversation.recent(2),
            vec![
                "Student: What is a limit?",
                "Chat Jee: A limit describes\n\napproach."
            ]
        );

        let request = server.await.unwrap();
        assert!(request.contains("Content from calculus.pdf"));
    }

    #[tokio::test]
    async fn test_failure_leaves_context_untouched() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let tutor = tutor_at(&format!("http://{}", addr));
        let mut session = StudySession::default();

        let outcome = tutor.chat(&mut session, "Explain torque").await;

        assert!(matches!(outcome, TurnOutcome::Failed(_)));
        assert!(outcome.text().starts_with("❌ **Error generating response**"));
        assert_eq!(session.total_messages, 0);
        assert!(session.conversation.is_empty());
        assert_eq!(session.messages.len(), 2);
    }
}
