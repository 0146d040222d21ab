//! Jee Gemini - Gemini integration for Chat Jee.
//!
//! This crate provides an async client for the Gemini `generateContent`
//! endpoint, the tutor prompt template, response cleanup and the logic of a
//! single chat turn.

mod client;
mod error;
pub mod format;
pub mod prompt;
#[cfg(test)]
mod test_support;
mod tutor;
mod types;

pub use client::GeminiClient;
pub use error::{GeminiError, GeminiResult};
pub use format::clean_response;
pub use prompt::{build_tutor_prompt, PromptLimits};
pub use tutor::{Tutor, TurnOutcome};
pub use types::*;
