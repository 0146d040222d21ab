//! Accumulated study material extracted from uploaded documents.

use serde::{Deserialize, Serialize};

const SECTION_RULE_WIDTH: usize = 50;

/// Text extracted from a single uploaded document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub text: String,
    pub pages: usize,
    pub content_hash: Option<String>,
}

impl Document {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            pages: 0,
            content_hash: None,
        }
    }

    pub fn with_pages(mut self, pages: usize) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_content_hash(mut self, hash: impl Into<String>) -> Self {
        self.content_hash = Some(hash.into());
        self
    }
}

/// Insertion-ordered mapping from file name to extracted text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentLibrary {
    documents: Vec<Document>,
}

impl DocumentLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document. A document with the same name is replaced in place.
    pub fn insert(&mut self, document: Document) {
        match self.documents.iter_mut().find(|d| d.name == document.name) {
            Some(existing) => *existing = document,
            None => self.documents.push(document),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|d| d.name.as_str())
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Total number of characters of extracted text.
    pub fn total_chars(&self) -> usize {
        self.documents.iter().map(|d| d.text.chars().count()).sum()
    }

    pub fn clear(&mut self) {
        self.documents.clear();
    }

    /// Concatenate every document under a banner naming its source file.
    pub fn combined_text(&self) -> String {
        let rule = "=".repeat(SECTION_RULE_WIDTH);
        let mut out = String::new();
        for doc in &self.documents {
            out.push_str(&format!(
                "\n\n{rule}\n📄 Content from {}\n{rule}\n{}",
                doc.name, doc.text
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_preserves_order_and_replaces_by_name() {
        let mut library = DocumentLibrary::new();
        library.insert(Document::new("a.pdf", "alpha"));
        library.insert(Document::new("b.pdf", "beta"));
        library.insert(Document::new("a.pdf", "alpha v2"));

        let names: Vec<&str> = library.names().collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf"]);
        assert_eq!(library.get("a.pdf").unwrap().text, "alpha v2");
    }

    #[test]
    fn test_combined_text_format() {
        let mut library = DocumentLibrary::new();
        library.insert(Document::new("notes.pdf", "Kinematics"));

        let rule = "=".repeat(50);
        let expected = format!("\n\n{rule}\n📄 Content from notes.pdf\n{rule}\nKinematics");
        assert_eq!(library.combined_text(), expected);
    }

    #[test]
    fn test_empty_library() {
        let library = DocumentLibrary::new();
        assert!(library.is_empty());
        assert_eq!(library.combined_text(), "");
        assert_eq!(library.total_chars(), 0);
    }

    #[test]
    fn test_total_chars_counts_characters() {
        let mut library = DocumentLibrary::new();
        library.insert(Document::new("a.pdf", "αβγ"));
        library.insert(Document::new("b.pdf", "ab"));
        assert_eq!(library.total_chars(), 5);
    }
}
