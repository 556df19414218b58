//! Per-rule execution pipeline.
//!
//! One [`RunContext`] is built per run per document: attribute values are
//! neutralized and excluded regions computed once, then shared by every
//! rule executed in that run.

use std::collections::HashSet;

use draftlint_rules::{
    AbbreviationPair, ArticleExceptions, CheckKind, Pattern, Severity,
};
use regex::Regex;

use crate::document::Document;
use crate::engine::{CompiledCheck, CompiledRule};
use crate::error::LintError;
use crate::exclusion::{self, ExcludedRegion};
use crate::finding::{Finding, SourceRange};
use crate::matcher;

/// Shared per-run state for one document snapshot.
pub struct RunContext<'a> {
    document: &'a Document,
    /// Lines with attribute values blanked out; what prose rules scan.
    sanitized: Vec<String>,
    excluded: Vec<ExcludedRegion>,
}

impl<'a> RunContext<'a> {
    pub fn new(document: &'a Document) -> Self {
        let sanitized = document
            .lines
            .iter()
            .map(|l| matcher::neutralize_attribute_values(l))
            .collect();
        let excluded = exclusion::compute_excluded_regions(&document.lines, document.kind);
        Self {
            document,
            sanitized,
            excluded,
        }
    }

    fn keep(&self, line: usize, region_sensitive: bool) -> bool {
        !(region_sensitive && exclusion::is_excluded(line, &self.excluded))
    }
}

/// Runs one compiled rule against a document, dropping suppressed terms
/// and region-excluded matches. Findings come back ordered by position.
pub fn run_rule(
    rule: &CompiledRule,
    ctx: &RunContext<'_>,
    ignores: &HashSet<String>,
) -> Result<Vec<Finding>, LintError> {
    let region_sensitive = rule.region_sensitive();
    let severity = rule.severity();
    let id = rule.id();

    let mut findings = match (&rule.rule.check, &rule.check) {
        (CheckKind::Terms { patterns, message }, CompiledCheck::Terms) => {
            check_terms(id, severity, patterns, message, ctx, ignores, region_sensitive)?
        }
        (CheckKind::RepeatedWords, CompiledCheck::RepeatedWords) => {
            check_repeated_words(id, severity, ctx, ignores, region_sensitive)
        }
        (CheckKind::NonAscii, CompiledCheck::NonAscii(rgx)) => {
            check_non_ascii(id, severity, rgx, ctx, ignores, region_sensitive)
        }
        (CheckKind::Articles { exceptions }, CompiledCheck::Articles) => {
            check_articles(id, severity, exceptions, ctx, ignores, region_sensitive)
        }
        (CheckKind::Hyphenation, CompiledCheck::Hyphenation(rgx)) => {
            check_hyphenation(id, severity, rgx, ctx, ignores, region_sensitive)
        }
        (CheckKind::Abbreviations { pairs }, CompiledCheck::Abbreviations) => {
            check_abbreviations(id, severity, pairs, ctx, ignores, region_sensitive)
        }
        _ => {
            return Err(LintError::rule(
                id,
                "rule data does not match its compiled form",
            ));
        }
    };

    findings.sort_by_key(|f| f.range);
    Ok(findings)
}

fn render(template: &str, term: &str, suggestion: Option<&str>) -> String {
    template
        .replace("{term}", term)
        .replace("{suggestion}", suggestion.unwrap_or(""))
}

fn check_terms(
    rule_id: &str,
    severity: Severity,
    patterns: &[Pattern],
    message: &str,
    ctx: &RunContext<'_>,
    ignores: &HashSet<String>,
    region_sensitive: bool,
) -> Result<Vec<Finding>, LintError> {
    let mut findings = Vec::new();
    for pattern in patterns {
        if pattern.trigger.is_empty() {
            return Err(LintError::rule(rule_id, "empty trigger in dictionary"));
        }
        for m in matcher::match_pattern(&ctx.sanitized, pattern) {
            if ignores.contains(&m.term) || !ctx.keep(m.line, region_sensitive) {
                continue;
            }
            let mut text = render(message, &m.term, pattern.suggestion.as_deref());
            if pattern.case_sensitive {
                text.push_str(" (case sensitive)");
            }
            findings.push(
                Finding::new(
                    rule_id,
                    &m.term,
                    SourceRange::on_line(m.line, m.start_col, m.end_col),
                    text,
                )
                .with_severity(severity),
            );
        }
    }
    Ok(findings)
}

/// Word tokens of one line: `[A-Za-z0-9_]` runs with byte offsets.
fn word_runs(line: &str) -> Vec<(usize, usize)> {
    let bytes = line.as_bytes();
    let mut runs = Vec::new();
    let mut start = None;
    for (i, b) in bytes.iter().enumerate() {
        let word = b.is_ascii_alphanumeric() || *b == b'_';
        match (word, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push((s, i));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, bytes.len()));
    }
    runs
}

fn check_repeated_words(
    rule_id: &str,
    severity: Severity,
    ctx: &RunContext<'_>,
    ignores: &HashSet<String>,
    region_sensitive: bool,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (idx, line) in ctx.sanitized.iter().enumerate() {
        if !ctx.keep(idx, region_sensitive) {
            continue;
        }
        let runs = word_runs(line);
        for pair in runs.windows(2) {
            let (a_start, a_end) = pair[0];
            let (b_start, b_end) = pair[1];
            let gap = &line[a_end..b_start];
            if gap.is_empty() || !gap.chars().all(char::is_whitespace) {
                continue;
            }
            let a = &line[a_start..a_end];
            let b = &line[b_start..b_end];
            if !a.eq_ignore_ascii_case(b) {
                continue;
            }
            let term = a.to_ascii_lowercase();
            if ignores.contains(&term) {
                continue;
            }
            findings.push(
                Finding::new(
                    rule_id,
                    term,
                    SourceRange::on_line(idx, a_start, b_end),
                    format!("Repeated term \"{a}\" detected."),
                )
                .with_severity(severity),
            );
        }
    }
    findings
}

fn check_non_ascii(
    rule_id: &str,
    severity: Severity,
    rgx: &Regex,
    ctx: &RunContext<'_>,
    ignores: &HashSet<String>,
    region_sensitive: bool,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    // Raw lines: attribute neutralization must not hide stray bytes.
    for (idx, line) in ctx.document.lines.iter().enumerate() {
        if !ctx.keep(idx, region_sensitive) {
            continue;
        }
        for m in rgx.find_iter(line) {
            let term = m.as_str().to_string();
            if ignores.contains(&term) {
                continue;
            }
            findings.push(
                Finding::new(
                    rule_id,
                    term,
                    SourceRange::on_line(idx, m.start(), m.end()),
                    "Non-ASCII character(s) detected.",
                )
                .with_severity(severity),
            );
        }
    }
    findings
}

fn is_vowel(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Acronym whose spoken form starts with a vowel sound ("an FEC frame"
/// reads "an ef-ee-see frame").
fn is_letter_name_acronym(word: &str) -> bool {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    "AEFHILMNORSX".contains(first)
        && word.len() >= 2
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.')
}

fn starts_as_acronym(word: &str, initial: char) -> bool {
    let mut chars = word.chars();
    chars.next() == Some(initial) && chars.next().is_some_and(|c| c.is_ascii_uppercase())
}

/// Line tokens for the article check: whitespace-separated words trimmed
/// of surrounding punctuation.
fn article_tokens(line: &str) -> Vec<(usize, usize)> {
    let mut tokens = Vec::new();
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let mut s = start;
        let mut e = i;
        while s < e && !bytes[s].is_ascii_alphanumeric() {
            s += 1;
        }
        while e > s && !bytes[e - 1].is_ascii_alphanumeric() {
            e -= 1;
        }
        if s < e {
            tokens.push((s, e));
        }
    }
    tokens
}

fn check_articles(
    rule_id: &str,
    severity: Severity,
    ex: &ArticleExceptions,
    ctx: &RunContext<'_>,
    ignores: &HashSet<String>,
    region_sensitive: bool,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (idx, line) in ctx.sanitized.iter().enumerate() {
        if !ctx.keep(idx, region_sensitive) {
            continue;
        }
        let tokens = article_tokens(line);
        for i in 0..tokens.len() {
            let (a_start, a_end) = tokens[i];
            let article = &line[a_start..a_end];
            let article_lower = article.to_ascii_lowercase();
            if article_lower != "a" && article_lower != "an" {
                continue;
            }
            let Some(&(n_start, n_end)) = tokens.get(i + 1) else {
                continue;
            };
            let next = &line[n_start..n_end];
            let next_lower = next.to_ascii_lowercase();
            let Some(first) = next.chars().next() else {
                continue;
            };

            let suggestion = if article_lower == "a" {
                if let Some(&(p_start, p_end)) = i.checked_sub(1).and_then(|j| tokens.get(j)) {
                    let prev = line[p_start..p_end].to_ascii_lowercase();
                    if ex.a_prev_ok.contains(&prev) {
                        continue;
                    }
                }
                let flagged = if is_vowel(first) {
                    !starts_as_acronym(next, 'U')
                        && !ex.a_vowel_ok.iter().any(|p| next_lower.starts_with(p))
                } else if starts_as_acronym(next, 'R') {
                    !ex.a_r_acronym_ok.iter().any(|p| next_lower.starts_with(p))
                } else {
                    false
                };
                if !flagged {
                    continue;
                }
                "an\" instead of \"a"
            } else {
                let flagged = if ex.an_bad_acronyms.contains(&next_lower) {
                    true
                } else if first.is_ascii_alphabetic() && !is_vowel(first) {
                    !is_letter_name_acronym(next)
                        && !ex.an_consonant_ok.iter().any(|p| next_lower.starts_with(p))
                } else {
                    false
                };
                if !flagged {
                    continue;
                }
                "a\" instead of \"an"
            };

            let term = format!("{article_lower} {next_lower}");
            if ignores.contains(&term) {
                continue;
            }
            findings.push(
                Finding::new(
                    rule_id,
                    term,
                    SourceRange::on_line(idx, a_start, n_end),
                    format!(
                        "Bad indefinite article usage detected. Consider using \"{suggestion}\"."
                    ),
                )
                .with_severity(severity),
            );
        }
    }
    findings
}

fn check_hyphenation(
    rule_id: &str,
    severity: Severity,
    term_rgx: &Regex,
    ctx: &RunContext<'_>,
    ignores: &HashSet<String>,
    region_sensitive: bool,
) -> Vec<Finding> {
    // Pass 1: collect hyphenated terms and where they occur. Short
    // fragments are not meaningful targets.
    let mut hyphen_terms: Vec<String> = Vec::new();
    let mut occurrences: Vec<(String, SourceRange)> = Vec::new();
    for (idx, line) in ctx.sanitized.iter().enumerate() {
        if !ctx.keep(idx, region_sensitive) {
            continue;
        }
        for m in term_rgx.find_iter(line) {
            if m.as_str().len() <= 3 {
                continue;
            }
            let lower = m.as_str().to_ascii_lowercase();
            if ignores.contains(&lower) {
                continue;
            }
            if !hyphen_terms.contains(&lower) {
                hyphen_terms.push(lower.clone());
            }
            occurrences.push((lower, SourceRange::on_line(idx, m.start(), m.end())));
        }
    }

    // Pass 2: a hyphenated term is only inconsistent when its joined
    // spelling also appears.
    let mut findings = Vec::new();
    for term in &hyphen_terms {
        let alt: String = term.chars().filter(|c| *c != '-').collect();
        if ignores.contains(&alt) {
            continue;
        }
        let alt_matches: Vec<_> = matcher::match_pattern(&ctx.sanitized, &Pattern::new(alt.clone()))
            .into_iter()
            .filter(|m| ctx.keep(m.line, region_sensitive))
            .collect();
        if alt_matches.is_empty() {
            continue;
        }
        for (t, range) in occurrences.iter().filter(|(t, _)| t == term) {
            findings.push(
                Finding::new(
                    rule_id,
                    t,
                    *range,
                    format!("Inconsistent hyphenation (\"{term}\" is alternate of \"{alt}\")."),
                )
                .with_severity(severity),
            );
        }
        for m in &alt_matches {
            findings.push(
                Finding::new(
                    rule_id,
                    &alt,
                    SourceRange::on_line(m.line, m.start_col, m.end_col),
                    format!("Inconsistent hyphenation (\"{alt}\" is alternate of \"{term}\")."),
                )
                .with_severity(severity),
            );
        }
    }
    findings
}

fn check_abbreviations(
    rule_id: &str,
    severity: Severity,
    pairs: &[AbbreviationPair],
    ctx: &RunContext<'_>,
    ignores: &HashSet<String>,
    region_sensitive: bool,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    for pair in pairs {
        let term = pair.short.to_ascii_lowercase();
        if ignores.contains(&term) {
            continue;
        }

        // Two full passes: the verdict depends on whole-document order,
        // not on any single line.
        let short_pattern = Pattern::new(pair.short.clone()).case_sensitive();
        let first_short = matcher::match_pattern(&ctx.sanitized, &short_pattern)
            .into_iter()
            .find(|m| ctx.keep(m.line, region_sensitive));
        let Some(short) = first_short else {
            continue;
        };

        let expansion_pattern = Pattern::new(pair.expansion.clone());
        let first_expansion = matcher::match_pattern(&ctx.sanitized, &expansion_pattern)
            .into_iter()
            .find(|m| ctx.keep(m.line, region_sensitive));

        let message = match &first_expansion {
            None => format!(
                "Abbreviation \"{}\" is used without introducing its expansion \"{}\".",
                pair.short, pair.expansion
            ),
            Some(exp) if (short.line, short.start_col) < (exp.line, exp.start_col) => format!(
                "Abbreviation \"{}\" is used before its expansion \"{}\" is introduced.",
                pair.short, pair.expansion
            ),
            Some(_) => continue,
        };

        findings.push(
            Finding::new(
                rule_id,
                term,
                SourceRange::on_line(short.line, short.start_col, short.end_col),
                message,
            )
            .with_severity(severity),
        );
    }
    findings
}
