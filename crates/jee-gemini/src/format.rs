//! Cleanup applied to model replies before display.

use regex::{Captures, Regex};
use std::sync::OnceLock;

fn blank_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("valid regex"))
}

fn code_fences() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```(\w*)\n(.*?)```").expect("valid regex"))
}

/// Collapse runs of blank lines and put every closing code fence on its
/// own line.
pub fn clean_response(text: &str) -> String {
    let text = blank_runs().replace_all(text, "\n\n");

    let text = code_fences().replace_all(&text, |caps: &Captures| {
        let lang = &caps[1];
        let body = &caps[2];
        if body.is_empty() || body.ends_with('\n') {
            format!("```{}\n{}```", lang, body)
        } else {
            format!("```{}\n{}\n```", lang, body)
        }
    });

    text.trim().to_string()
}
