//! Boundary-aware term matching over document lines.
//!
//! Matching is a direct scan rather than one composed alternation regex:
//! an alternation with a consuming trailing boundary cannot report two
//! adjacent occurrences of the same term, and every occurrence must be
//! reported so suppression bookkeeping stays exact.

use std::sync::OnceLock;

use draftlint_rules::Pattern;
use regex::Regex;

/// One raw hit of a pattern, before any filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatch {
    /// Zero-based line of the match start. Combined-window matches are
    /// always anchored to the line the window started on.
    pub line: usize,
    /// Byte offset of the match start within the line.
    pub start_col: usize,
    /// Byte offset one past the match end, clamped to the line length for
    /// matches that continue onto the wrapped next line.
    pub end_col: usize,
    /// Normalized (lowercase) trigger, the suppression key.
    pub term: String,
    /// The text as it appears in the document.
    pub text: String,
}

/// Characters that may precede a match. A term must start the line or
/// follow one of these; this keeps triggers from firing inside larger
/// identifiers or attribute names.
const LEADING_DELIMITERS: &[u8] = b"<> \"'.:;=([{-";

fn lead_ok(bytes: &[u8], start: usize) -> bool {
    start == 0 || LEADING_DELIMITERS.contains(&bytes[start - 1])
}

fn trail_ok(bytes: &[u8], end: usize, case_sensitive: bool) -> bool {
    match bytes.get(end) {
        None => true,
        // The case-insensitive haystack is already lowercase, so the loose
        // [^a-z0-9] class is equivalent to the full alphanumeric test.
        Some(b) if case_sensitive => !b.is_ascii_alphanumeric(),
        Some(b) => !(b.is_ascii_lowercase() || b.is_ascii_digit()),
    }
}

/// Builds the probe string for a line-spanning pattern: the current line
/// joined with the start of the next. A hyphen at the wrap point rejoins
/// the split word; otherwise the lines are joined with a single space.
///
/// Returns the probe and the length of the current-line portion; matches
/// starting at or past that length live entirely in the lookahead and are
/// discarded (they will be found again when the next line is current).
fn combined_probe(line: &str, next: Option<&str>) -> (String, usize) {
    let trimmed = line.trim_end();
    match next {
        Some(next) => {
            let next = next.trim_start();
            if let Some(stem) = trimmed.strip_suffix('-') {
                (format!("{stem}{next}"), stem.len())
            } else {
                (format!("{trimmed} {next}"), trimmed.len())
            }
        }
        None => (line.to_string(), line.len()),
    }
}

/// Scans `lines` for every occurrence of `pattern`.
///
/// Occurrences never overlap, but adjacent and repeated occurrences on
/// one line are each reported.
pub fn match_pattern(lines: &[String], pattern: &Pattern) -> Vec<RawMatch> {
    let mut matches = Vec::new();
    if pattern.trigger.is_empty() {
        return matches;
    }

    let needle = if pattern.case_sensitive {
        pattern.trigger.clone()
    } else {
        pattern.trigger.to_ascii_lowercase()
    };
    let term = pattern.trigger.to_ascii_lowercase();

    for (line_idx, line) in lines.iter().enumerate() {
        let (probe, current_len) = if pattern.spans_lines {
            combined_probe(line, lines.get(line_idx + 1).map(String::as_str))
        } else {
            (line.clone(), line.len())
        };

        let haystack = if pattern.case_sensitive {
            probe.clone()
        } else {
            probe.to_ascii_lowercase()
        };
        let bytes = haystack.as_bytes();

        let mut from = 0;
        while let Some(offset) = haystack[from..].find(&needle) {
            let start = from + offset;
            let end = start + needle.len();
            from = end;

            if start >= current_len {
                // Only lookahead text remains.
                break;
            }
            if !lead_ok(bytes, start) || !trail_ok(bytes, end, pattern.case_sensitive) {
                continue;
            }

            matches.push(RawMatch {
                line: line_idx,
                start_col: start,
                end_col: end.min(current_len.max(line.len())),
                term: term.clone(),
                text: probe[start..end].to_string(),
            });
        }
    }

    matches
}

static ATTR_VALUE_RGX: OnceLock<Regex> = OnceLock::new();

/// Blanks out XML attribute values (`target="…"` and friends) with
/// equal-length whitespace, so matches inside metadata are never reported
/// as prose while every column offset stays intact.
pub fn neutralize_attribute_values(line: &str) -> String {
    let rgx = ATTR_VALUE_RGX.get_or_init(|| {
        Regex::new(r#"([A-Za-z][A-Za-z0-9:_-]*=")([^"]*)(")"#).expect("valid attribute regex")
    });
    rgx.replace_all(line, |caps: &regex::Captures| {
        format!("{}{}{}", &caps[1], " ".repeat(caps[2].len()), &caps[3])
    })
    .into_owned()
}
