//! HTML rendering for the chat and sign-in pages.

use super::content::{ABOUT_TOPICS, SAMPLE_QUESTIONS, SHORTCUTS, TIPS};
use jee_core::{ChatMessage, Notice, StudySession};
use pulldown_cmark::{html, Event, Options, Parser, Tag};
use std::fmt::Write;

/// Server-wide facts the chat page needs besides the session itself.
pub struct PageContext {
    pub ai_ready: bool,
    pub auth_required: bool,
    pub max_input_chars: usize,
}

/// Escape text for use in HTML bodies and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render assistant Markdown. Raw HTML in the source is shown as text,
/// and links or images with a scheme other than http(s)/mailto keep only
/// their text.
pub fn markdown_to_html(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    // One entry per open link or image: whether its tags are emitted.
    let mut open_links: Vec<bool> = Vec::new();

    let parser = Parser::new_ext(text, options).filter_map(|event| match event {
        Event::Html(raw) => Some(Event::Text(raw)),
        Event::Start(Tag::Link(kind, dest, title)) => {
            let allowed = is_safe_url(&dest);
            open_links.push(allowed);
            allowed.then(|| Event::Start(Tag::Link(kind, dest, title)))
        }
        Event::Start(Tag::Image(kind, dest, title)) => {
            let allowed = is_safe_url(&dest);
            open_links.push(allowed);
            allowed.then(|| Event::Start(Tag::Image(kind, dest, title)))
        }
        Event::End(tag @ (Tag::Link(..) | Tag::Image(..))) => {
            let allowed = open_links.pop().unwrap_or(true);
            allowed.then_some(Event::End(tag))
        }
        other => Some(other),
    });

    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

/// Relative URLs and http, https and mailto pass. Browsers ignore ASCII
/// whitespace and control characters inside a scheme, so those are
/// dropped before looking at it.
fn is_safe_url(dest: &str) -> bool {
    let compact: String = dest
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .collect();

    let scheme_end = compact.find(|c| matches!(c, ':' | '/' | '?' | '#'));
    match scheme_end {
        Some(i) if compact[i..].starts_with(':') => {
            let scheme = compact[..i].to_ascii_lowercase();
            matches!(scheme.as_str(), "http" | "https" | "mailto")
        }
        _ => true,
    }
}

fn document(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/assets/style.css">
</head>
<body>
<div class="header">
<h1>🎓 Chat Jee</h1>
<p>Your AI-powered JEE preparation assistant with personalized learning</p>
</div>
{body}
<footer>
<p>🎓 <strong>Chat Jee</strong> - Your AI JEE Preparation Assistant</p>
<p>Built with ❤️ for JEE aspirants</p>
</footer>
<script src="/assets/app.js"></script>
</body>
</html>
"#,
        title = escape(title),
        body = body
    )
}

fn render_notices(out: &mut String, notices: &[Notice]) {
    for notice in notices {
        let _ = writeln!(
            out,
            r#"<div class="notice {}">{}</div>"#,
            notice.level,
            escape(&notice.text)
        );
    }
}

/// The sign-in page shown to visitors without a session.
pub fn login_page(sign_in_available: bool, notices: &[Notice]) -> String {
    let mut body = String::from(r#"<div class="login panel">"#);
    render_notices(&mut body, notices);

    body.push_str("<h2>👋 Welcome to Chat Jee</h2>");
    body.push_str("<p>Sign in with your Google account to start studying.</p><ul>");
    for topic in ABOUT_TOPICS {
        let _ = write!(body, "<li>{}</li>", topic);
    }
    body.push_str("</ul>");

    if sign_in_available {
        body.push_str(r#"<a class="button" href="/login/google">🔐 Sign in with Google</a>"#);
    } else {
        body.push_str(
            r#"<div class="notice error">❌ Google sign-in is not configured. Place your OAuth client secrets file in the config directory or set GOOGLE_CLIENT_SECRETS.</div>"#,
        );
    }
    body.push_str("</div>");

    document("Chat Jee - Sign in", &body)
}

/// The main chat page.
pub fn chat_page(session: &StudySession, notices: &[Notice], ctx: &PageContext) -> String {
    let mut body = String::from(r#"<div class="layout">"#);
    render_sidebar(&mut body, session, ctx);

    body.push_str(r#"<main class="panel">"#);
    render_notices(&mut body, notices);
    render_upload(&mut body, session, ctx);

    if session.messages.is_empty() {
        render_welcome(&mut body);
    }
    render_messages(&mut body, &session.messages);
    render_input(&mut body, ctx);
    body.push_str("</main>");

    render_side_panel(&mut body, session, ctx);
    body.push_str("</div>");

    document("Chat Jee - JEE Assistant", &body)
}

fn render_sidebar(out: &mut String, session: &StudySession, ctx: &PageContext) {
    out.push_str(r#"<aside class="panel">"#);

    if let Some(user) = &session.user {
        out.push_str(r#"<div class="user-card">"#);
        if let Some(picture) = &user.picture {
            let _ = write!(out, r#"<img src="{}" alt="">"#, escape(picture));
        }
        let _ = write!(
            out,
            r#"<div><div>👋 Hello, {}!</div><div class="email">📧 {}</div></div></div>"#,
            escape(user.display_name()),
            escape(&user.email)
        );
        if ctx.auth_required {
            out.push_str(
                r#"<form method="post" action="/logout"><button class="secondary" type="submit">🚪 Logout</button></form>"#,
            );
        }
    }

    let stats = session.stats();
    out.push_str(r#"<h3>📊 Session Statistics</h3><div class="stats">"#);
    let cells = [
        ("Messages", stats.messages.to_string()),
        ("Session Time", stats.duration.clone()),
        ("PDFs Processed", stats.pdfs_processed.to_string()),
        (
            "Materials",
            if stats.has_materials { "Yes" } else { "No" }.to_string(),
        ),
    ];
    for (label, value) in cells {
        let _ = write!(
            out,
            r#"<div class="stat"><div class="label">{}</div><div class="value">{}</div></div>"#,
            label, value
        );
    }
    out.push_str("</div>");

    out.push_str(r#"<h3>🔧 Quick Actions</h3>"#);
    out.push_str(
        r#"<form method="post" action="/history/clear"><button class="secondary" type="submit">🗑️ Clear Chat History</button></form>"#,
    );
    out.push_str(
        r#"<form method="post" action="/documents/clear"><button class="secondary" type="submit">📄 Clear PDF Materials</button></form>"#,
    );

    out.push_str(r#"<h3>ℹ️ About Chat Jee</h3><p>Chat Jee is an AI-powered assistant designed specifically for JEE preparation. It can help you with:</p><ul>"#);
    for topic in ABOUT_TOPICS {
        let _ = write!(out, "<li>{}</li>", topic);
    }
    out.push_str("</ul></aside>");
}

fn render_upload(out: &mut String, session: &StudySession, ctx: &PageContext) {
    let open = if session.has_materials() { "" } else { " open" };
    let _ = write!(
        out,
        r#"<details class="upload"{}><summary>📚 Upload Study Materials (Optional)</summary>"#,
        open
    );

    if !ctx.ai_ready {
        out.push_str(r#"<div class="notice error">⚠️ AI module not available. Please fix the Gemini AI configuration first.</div>"#);
    } else {
        out.push_str(
            r#"<form method="post" action="/documents" enctype="multipart/form-data">
<input type="file" name="files" accept="application/pdf,.pdf" multiple required>
<button type="submit">🚀 Process PDFs</button>
</form>"#,
        );
    }

    if session.has_materials() {
        out.push_str(r#"<div class="notice success">✅ Study materials loaded successfully!</div><ul>"#);
        for name in session.library.names() {
            let _ = write!(out, "<li>📄 {}</li>", escape(name));
        }
        out.push_str("</ul>");
        out.push_str(r#"<div class="notice info">💡 You can now ask questions about your uploaded materials.</div>"#);
    }
    out.push_str("</details>");
}

fn render_welcome(out: &mut String) {
    out.push_str(
        r#"<div class="welcome-message">
<h2>👋 Welcome to Chat Jee!</h2>
<p>I'm your AI-powered JEE preparation assistant. I can help you with:</p>
<p><strong>Mathematics • Physics • Chemistry • Problem Solving • Concepts • Previous Year Questions</strong></p>
<p>💡 <em>Try clicking on any sample question below to get started!</em></p>
</div>
<div class="sample-questions">"#,
    );
    for q in SAMPLE_QUESTIONS {
        let _ = write!(
            out,
            r#"<div class="sample-question" data-question="{question}"><strong style="color: {color};">{icon} {category}</strong><br><span>"{question}"</span></div>"#,
            question = escape(q.question),
            color = q.color,
            icon = q.icon,
            category = q.category
        );
    }
    out.push_str("</div>");
}

fn render_messages(out: &mut String, messages: &[ChatMessage]) {
    out.push_str(r#"<div class="messages">"#);
    for message in messages {
        if message.is_user() {
            let _ = write!(
                out,
                r#"<div class="message user-message"><div class="message-icon user-icon">👤</div><div class="message-content">{}</div></div>"#,
                escape(&message.content)
            );
        } else {
            let _ = write!(
                out,
                r#"<div class="message bot-message"><div class="message-icon bot-icon">🎓</div><div class="message-content">{}</div></div>"#,
                markdown_to_html(&message.content)
            );
        }
    }
    // Revealed by app.js while the chat form is being submitted.
    out.push_str(r#"<div class="message bot-message thinking" hidden><div class="message-icon bot-icon">🎓</div><div class="message-content">Chat Jee is thinking…</div></div>"#);
    out.push_str("</div>");
}

fn render_input(out: &mut String, ctx: &PageContext) {
    let disabled = if ctx.ai_ready { "" } else { " disabled" };
    let _ = write!(
        out,
        r#"<form class="chat-form" method="post" action="/chat">
<textarea id="chat_input" name="message" maxlength="{max}" placeholder="Ask me anything about JEE preparation... (e.g., 'Explain integration by parts' or 'Solve a thermodynamics problem')"></textarea>
<button type="submit"{disabled}>🚀 Send Message</button>
</form>"#,
        max = ctx.max_input_chars,
        disabled = disabled
    );
}

fn render_side_panel(out: &mut String, session: &StudySession, ctx: &PageContext) {
    out.push_str(r#"<aside class="panel"><h3>💡 Quick Tips</h3><ul class="tips">"#);
    for tip in TIPS {
        let _ = write!(out, "<li>{}</li>", tip);
    }
    out.push_str("</ul><h3>🎯 Subject Shortcuts</h3>");

    for (label, query) in SHORTCUTS {
        let _ = write!(
            out,
            r#"<form method="post" action="/chat"><input type="hidden" name="message" value="{}"><button class="secondary" type="submit">{}</button></form>"#,
            escape(query),
            label
        );
    }

    out.push_str("<h3>Status</h3>");
    if ctx.ai_ready {
        out.push_str(r#"<span class="badge ok">✅ AI Ready</span>"#);
    } else {
        out.push_str(r#"<span class="badge bad">❌ AI Unavailable</span>"#);
    }
    if session.has_materials() {
        out.push_str(r#"<span class="badge info">📚 Materials Loaded</span>"#);
    } else {
        out.push_str(r#"<span class="badge warn">📄 No Materials</span>"#);
    }
    out.push_str("</aside>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use jee_core::{Document, UserInfo};

    fn ctx(ai_ready: bool) -> PageContext {
        PageContext {
            ai_ready,
            auth_required: true,
            max_input_chars: 5000,
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<b>"x" & 'y'</b>"#),
            "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_markdown_renders_and_neutralises_html() {
        let html = markdown_to_html("**Step 1**\n\n```\nx = 2\n```\n\n<script>alert(1)</script>");
        assert!(html.contains("<strong>Step 1</strong>"));
        assert!(html.contains("<pre><code>x = 2"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_markdown_drops_script_links_but_keeps_their_text() {
        let html = markdown_to_html("[click](javascript:alert(document.cookie))");
        assert!(!html.contains("<a"));
        assert!(!html.contains("javascript:"));
        assert!(html.contains("click"));

        let html = markdown_to_html("[x](JaVaScRiPt:alert(1)) ![diagram](data:image/svg+xml,abc)");
        assert!(!html.contains("href="));
        assert!(!html.contains("<img"));
        assert!(html.contains("diagram"));
    }

    #[test]
    fn test_markdown_keeps_web_and_mail_links() {
        let html = markdown_to_html(
            "[NTA](https://jeemain.nta.ac.in) [mail](mailto:help@example.com) [notes](/chat)",
        );
        assert!(html.contains(r#"<a href="https://jeemain.nta.ac.in">NTA</a>"#));
        assert!(html.contains(r#"<a href="mailto:help@example.com">mail</a>"#));
        assert!(html.contains(r#"<a href="/chat">notes</a>"#));

        let html = markdown_to_html("![graph](https://example.com/g.png)");
        assert!(html.contains(r#"<img src="https://example.com/g.png" alt="graph""#));
    }

    #[test]
    fn test_url_scheme_check() {
        assert!(is_safe_url("https://example.com/a:b"));
        assert!(is_safe_url("relative/path:with-colon"));
        assert!(is_safe_url("#section"));
        assert!(!is_safe_url(" javascript:alert(1)"));
        assert!(!is_safe_url("java\nscript:alert(1)"));
        assert!(!is_safe_url("vbscript:msgbox(1)"));
        assert!(!is_safe_url("data:text/html,<b>"));
    }

    #[test]
    fn test_empty_session_shows_welcome_and_samples() {
        let session = StudySession::default().with_user(UserInfo::new("a@b.c", "Asha"));
        let page = chat_page(&session, &[], &ctx(true));

        assert!(page.contains("Welcome to Chat Jee!"));
        assert!(page.contains("Explain the concept of limits in calculus"));
        assert!(page.contains("Hello, Asha!"));
        assert!(page.contains("✅ AI Ready"));
        assert!(page.contains("📄 No Materials"));
        assert!(page.contains(r#"action="/logout""#));
        assert!(page.contains(r#"<div class="message bot-message thinking" hidden>"#));
    }

    #[test]
    fn test_messages_are_escaped_and_rendered() {
        let mut session = StudySession::default().with_user(UserInfo::guest());
        session.messages.push(ChatMessage::user("<img src=x onerror=alert(1)>"));
        session.messages.push(ChatMessage::assistant("Use **Newton's** law"));
        session.load_materials(vec![Document::new("notes.pdf", "f = ma")]);

        let page = chat_page(&session, &[Notice::success("done")], &ctx(false));

        assert!(!page.contains("Welcome to Chat Jee!"));
        assert!(page.contains("&lt;img src=x"));
        assert!(page.contains("<strong>Newton&#39;s</strong>") || page.contains("<strong>Newton's</strong>"));
        assert!(page.contains("📄 notes.pdf"));
        assert!(page.contains(r#"<div class="notice success">done</div>"#));
        assert!(page.contains("❌ AI Unavailable"));
        assert!(page.contains("⚠️ AI module not available"));
    }

    #[test]
    fn test_login_page_variants() {
        assert!(login_page(true, &[]).contains(r#"href="/login/google""#));

        let page = login_page(false, &[Notice::error("Sign-in failed")]);
        assert!(!page.contains(r#"href="/login/google""#));
        assert!(page.contains("not configured"));
        assert!(page.contains("Sign-in failed"));
    }
}
