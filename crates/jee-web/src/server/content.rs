//! Fixed page content and static assets.

use axum::http::header;
use axum::response::IntoResponse;

/// A clickable starter question on the welcome screen.
pub struct SampleQuestion {
    pub icon: &'static str,
    pub category: &'static str,
    pub question: &'static str,
    pub color: &'static str,
}

pub const SAMPLE_QUESTIONS: &[SampleQuestion] = &[
    SampleQuestion {
        icon: "📐",
        category: "Mathematics",
        question: "Explain the concept of limits in calculus with step-by-step examples",
        color: "#10a37f",
    },
    SampleQuestion {
        icon: "⚡",
        category: "Physics",
        question: "Solve a rotational motion problem with detailed solution steps",
        color: "#667eea",
    },
    SampleQuestion {
        icon: "🧪",
        category: "Chemistry",
        question: "Important organic chemistry reactions and mechanisms for JEE",
        color: "#764ba2",
    },
    SampleQuestion {
        icon: "📝",
        category: "Previous Years",
        question: "JEE Main 2023 coordinate geometry previous year questions",
        color: "#f59e0b",
    },
    SampleQuestion {
        icon: "🎯",
        category: "Problem Solving",
        question: "Time management strategies for JEE Main examination",
        color: "#ef4444",
    },
    SampleQuestion {
        icon: "📊",
        category: "Revision",
        question: "Quick revision notes for thermodynamics concepts",
        color: "#8b5cf6",
    },
];

/// Subject shortcut buttons: label and the message they send.
pub const SHORTCUTS: &[(&str, &str)] = &[
    ("📐 Math", "Explain calculus concepts"),
    ("⚡ Physics", "Solve mechanics problems"),
    ("🧪 Chemistry", "Organic reactions"),
    ("📝 Previous Years", "JEE Main 2023 questions"),
    ("🎓 Study Tips", "Effective preparation strategies"),
];

pub const TIPS: &[&str] = &[
    "📝 Be specific in your questions",
    "🔢 Include numbers for calculations",
    "📚 Upload PDFs for personalized help",
    "🎯 Ask for step-by-step solutions",
    "📊 Request practice problems",
    "⏰ Ask about time management",
];

pub const ABOUT_TOPICS: &[&str] = &[
    "Concept explanations",
    "Problem solving",
    "Previous year questions",
    "Study strategies",
    "Doubt resolution",
];

const STYLESHEET: &str = include_str!("../../assets/style.css");
const SCRIPT: &str = include_str!("../../assets/app.js");

pub async fn stylesheet() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET)
}

pub async fn script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        SCRIPT,
    )
}
