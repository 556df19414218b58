//! Excluded-region computation.
//!
//! Literal regions (XML `<sourcecode>`/`<artwork>` elements, Markdown
//! fenced code blocks) must never produce prose findings. Regions are
//! computed once per run per document and shared by every rule in that
//! run.

use crate::document::DocumentKind;

/// An excluded region, line-granular and inclusive of its delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExcludedRegion {
    pub start_line: usize,
    pub end_line: usize,
}

/// Computes the excluded regions for a document.
///
/// An unterminated region extends to the end of the document.
pub fn compute_excluded_regions(lines: &[String], kind: DocumentKind) -> Vec<ExcludedRegion> {
    match kind {
        DocumentKind::Xml => delimited_regions(lines, &["<sourcecode", "<artwork"], &["</sourcecode>", "</artwork>"]),
        DocumentKind::Markdown => fenced_regions(lines),
        DocumentKind::PlainText | DocumentKind::Unsupported => Vec::new(),
    }
}

/// A match is excluded if its start position lies within any excluded
/// region. End-position containment is not required.
pub fn is_excluded(start_line: usize, regions: &[ExcludedRegion]) -> bool {
    regions
        .iter()
        .any(|r| start_line >= r.start_line && start_line <= r.end_line)
}

fn delimited_regions(lines: &[String], open: &[&str], close: &[&str]) -> Vec<ExcludedRegion> {
    let mut regions = Vec::new();
    let mut open_at: Option<usize> = None;

    for (idx, line) in lines.iter().enumerate() {
        match open_at {
            None => {
                if open.iter().any(|tag| line.contains(tag)) {
                    // Self-closing on the same line still spans that line.
                    if close.iter().any(|tag| line.contains(tag)) || line.contains("/>") {
                        regions.push(ExcludedRegion {
                            start_line: idx,
                            end_line: idx,
                        });
                    } else {
                        open_at = Some(idx);
                    }
                }
            }
            Some(start) => {
                if close.iter().any(|tag| line.contains(tag)) {
                    regions.push(ExcludedRegion {
                        start_line: start,
                        end_line: idx,
                    });
                    open_at = None;
                }
            }
        }
    }

    if let Some(start) = open_at {
        regions.push(ExcludedRegion {
            start_line: start,
            end_line: lines.len().saturating_sub(1),
        });
    }
    regions
}

fn fenced_regions(lines: &[String]) -> Vec<ExcludedRegion> {
    let mut regions = Vec::new();
    let mut open_at: Option<usize> = None;

    for (idx, line) in lines.iter().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            match open_at {
                None => open_at = Some(idx),
                Some(start) => {
                    regions.push(ExcludedRegion {
                        start_line: start,
                        end_line: idx,
                    });
                    open_at = None;
                }
            }
        }
    }

    if let Some(start) = open_at {
        regions.push(ExcludedRegion {
            start_line: start,
            end_line: lines.len().saturating_sub(1),
        });
    }
    regions
}
