//! Editor-supplied document snapshot.

use std::path::Path;

/// Document formats the engine can lint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Xml,
    Markdown,
    PlainText,
    /// Anything else: opened but not lintable.
    Unsupported,
}

impl DocumentKind {
    /// Derives the kind from a file extension.
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "xml" => Self::Xml,
            "md" | "markdown" => Self::Markdown,
            "txt" | "text" | "" => Self::PlainText,
            _ => Self::Unsupported,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

/// One document as handed over by the editor: an identity, a
/// workspace-relative path, and a line snapshot.
///
/// The snapshot is immutable for the duration of a run; the editor sends a
/// fresh `Document` when the buffer changes.
#[derive(Debug, Clone)]
pub struct Document {
    /// Editor-side identity (URI). Keys the live finding collection.
    pub uri: String,
    /// Path relative to the containing workspace. Keys document-scoped
    /// suppressions.
    pub relative_path: String,
    pub kind: DocumentKind,
    pub lines: Vec<String>,
}

impl Document {
    /// Creates a document, deriving its kind from the path extension.
    pub fn new(uri: impl Into<String>, relative_path: impl Into<String>, lines: Vec<String>) -> Self {
        let relative_path = relative_path.into();
        let extension = Path::new(&relative_path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        Self {
            uri: uri.into(),
            kind: DocumentKind::from_extension(extension),
            relative_path,
            lines,
        }
    }

    /// Creates a document from a single text blob, splitting on newlines.
    pub fn from_text(
        uri: impl Into<String>,
        relative_path: impl Into<String>,
        text: &str,
    ) -> Self {
        let lines = text.lines().map(str::to_string).collect();
        Self::new(uri, relative_path, lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(DocumentKind::from_extension("xml"), DocumentKind::Xml);
        assert_eq!(DocumentKind::from_extension("XML"), DocumentKind::Xml);
        assert_eq!(DocumentKind::from_extension("md"), DocumentKind::Markdown);
        assert_eq!(DocumentKind::from_extension("txt"), DocumentKind::PlainText);
        assert_eq!(DocumentKind::from_extension(""), DocumentKind::PlainText);
        assert_eq!(DocumentKind::from_extension("pdf"), DocumentKind::Unsupported);
    }

    #[test]
    fn test_document_kind_from_path() {
        let doc = Document::new("file:///d.xml", "drafts/d.xml", vec![]);
        assert_eq!(doc.kind, DocumentKind::Xml);
        assert!(doc.kind.is_supported());

        let doc = Document::new("file:///d.pdf", "drafts/d.pdf", vec![]);
        assert!(!doc.kind.is_supported());
    }

    #[test]
    fn test_from_text_splits_lines() {
        let doc = Document::from_text("file:///d.txt", "d.txt", "one\ntwo\nthree");
        assert_eq!(doc.lines, vec!["one", "two", "three"]);
    }
}
