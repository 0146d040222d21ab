//! Tutor prompt template.

use jee_config::ChatConfig;

/// Size limits applied while building a prompt.
#[derive(Debug, Clone, Copy)]
pub struct PromptLimits {
    /// Characters of study material included.
    pub max_material_chars: usize,
    /// Conversation lines included.
    pub history_lines: usize,
}

impl PromptLimits {
    pub fn from_config(config: &ChatConfig) -> Self {
        Self {
            max_material_chars: config.max_material_chars,
            history_lines: config.prompt_history,
        }
    }
}

impl Default for PromptLimits {
    fn default() -> Self {
        Self::from_config(&ChatConfig::default())
    }
}

const PERSONA: &str = "You are Chat Jee, an expert AI tutor specialized in JEE (Joint Entrance Examination) preparation.";

const INSTRUCTIONS: &str = "**Instructions:**
- Provide clear, detailed, and step-by-step explanations
- Use proper formatting with headings, bullet points, and code blocks where appropriate
- Include relevant examples and practice problems
- Be encouraging and supportive
- If solving numerical problems, show all steps clearly
- For conceptual questions, provide intuitive explanations
- Reference JEE syllabus and previous year questions when relevant

**Response Format:**
- Use markdown formatting for better readability
- Include emojis to make responses more engaging
- Structure your response with clear sections
- Provide additional resources or practice suggestions when helpful
";

/// Build the full prompt for one student question.
///
/// `history` is the whole conversation buffer, oldest first; only the last
/// `limits.history_lines` entries are used.
pub fn build_tutor_prompt<S: AsRef<str>>(
    question: &str,
    materials: Option<&str>,
    history: &[S],
    limits: &PromptLimits,
) -> String {
    let materials_section = match materials.filter(|m| !m.is_empty()) {
        Some(text) => format!(
            "📚 **Available Study Materials:**{}...",
            truncate_chars(text, limits.max_material_chars)
        ),
        None => String::new(),
    };

    let start = history.len().saturating_sub(limits.history_lines);
    let context = history[start..]
        .iter()
        .map(|line| line.as_ref())
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{}\n\n{}\n\n**Previous Conversation Context:**\n{}\n\n**Current Student Question:** {}\n\n{}",
        PERSONA, materials_section, context, question, INSTRUCTIONS
    )
}

/// The first `max` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_without_materials() {
        let history: Vec<String> = Vec::new();
        let prompt = build_tutor_prompt("What is a limit?", None, &history, &PromptLimits::default());

        assert!(prompt.starts_with(PERSONA));
        assert!(!prompt.contains("Available Study Materials"));
        assert!(prompt.contains("**Current Student Question:** What is a limit?"));
        assert!(prompt.contains("**Response Format:**"));
    }

    #[test]
    fn test_prompt_includes_truncated_materials() {
        let limits = PromptLimits {
            max_material_chars: 5,
            history_lines: 8,
        };
        let history: Vec<String> = Vec::new();
        let prompt = build_tutor_prompt("q", Some("ABCDEFGHIJ"), &history, &limits);

        assert!(prompt.contains("📚 **Available Study Materials:**ABCDE..."));
        assert!(!prompt.contains("ABCDEF"));
    }

    #[test]
    fn test_prompt_uses_last_history_lines() {
        let history: Vec<String> = (0..12).map(|i| format!("line {}", i)).collect();
        let prompt = build_tutor_prompt("q", None, &history, &PromptLimits::default());

        assert!(!prompt.contains("line 3\n"));
        assert!(prompt.contains("**Previous Conversation Context:**\nline 4\nline 5"));
        assert!(prompt.contains("line 11\n\n**Current Student Question:**"));
    }

    #[test]
    fn test_truncate_chars_respects_code_points() {
        assert_eq!(truncate_chars("∫∑∂x", 2), "∫∑");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }
}
