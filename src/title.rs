//! Heuristics that turn a free-text submission title into a student name and
//! the assignment tags it refers to.
//!
//! Titles arrive in many shapes: `day03 submission by Ana Gomez`,
//! `Day 05 and 06 - Rachel Steinitz`, `day06 Jon Snow`, `Final project
//! proposal by ...`. Assignment tags are additive, so every detector runs.
//! Student extraction is an ordered list of rules where the first match wins.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::models::{
    FormatTag, NormalizedRecord, RawRecord, FINAL_PROJECT_PROPOSAL, PROJECT_SUBMISSION,
    UNKNOWN_ASSIGNMENT, UNKNOWN_STUDENT,
};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static DAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bday\s*([0-9]+)\b").unwrap());
static DAY_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bday\s*([0-9]+)\s*(?:and|&)\s*([0-9]+)\b").unwrap());
static BY_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bby\b\s+(.+)$").unwrap());
static NOT_A_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bday\b|\bproject\b").unwrap());
static DAY_THEN_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*day\s*[0-9]+\s+(.+?)\s*$").unwrap());
static DASH_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*-\s*").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleParts {
    pub student: String,
    pub assignments: Vec<String>,
    pub format_tag: FormatTag,
}

/// Student-extraction strategies, tried in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentRule {
    /// `... by NAME`
    HasBy,
    /// `... - NAME`, unless the tail looks like an assignment reference.
    HasDash,
    /// `day06 NAME`, only for titles without a hyphen.
    DayThenName,
}

pub const STUDENT_RULES: [StudentRule; 3] = [
    StudentRule::HasBy,
    StudentRule::HasDash,
    StudentRule::DayThenName,
];

impl StudentRule {
    pub fn format_tag(&self) -> FormatTag {
        match self {
            StudentRule::HasBy => FormatTag::HasBy,
            StudentRule::HasDash => FormatTag::HasDash,
            StudentRule::DayThenName => FormatTag::DayThenName,
        }
    }

    /// Returns the raw (not yet canonical) name when the rule applies.
    pub fn extract(&self, title: &str) -> Option<String> {
        match self {
            StudentRule::HasBy => BY_NAME
                .captures(title)
                .map(|caps| caps[1].trim().to_string()),
            StudentRule::HasDash => {
                let tail = title.rsplit('-').next()?.trim();
                if !title.contains('-') || tail.is_empty() || NOT_A_NAME.is_match(tail) {
                    return None;
                }
                Some(tail.to_string())
            }
            StudentRule::DayThenName => {
                // a hyphenated title belongs to the dash rule even when it rejected the tail
                if title.contains('-') {
                    return None;
                }
                DAY_THEN_NAME
                    .captures(title)
                    .map(|caps| caps[1].trim().to_string())
            }
        }
    }
}

pub fn collapse_whitespace(value: &str) -> String {
    WHITESPACE.replace_all(value.trim(), " ").into_owned()
}

pub fn normalize_title(raw_title: &str) -> TitleParts {
    let title = collapse_whitespace(raw_title);
    let assignments = extract_assignments(&title.to_lowercase());

    let (student, format_tag) = STUDENT_RULES
        .iter()
        .find_map(|rule| rule.extract(&title).map(|name| (name, rule.format_tag())))
        .unwrap_or_else(|| (String::new(), FormatTag::Other));

    TitleParts {
        student: canonical_student(&student),
        assignments,
        format_tag,
    }
}

pub fn normalize_record(record: &RawRecord) -> NormalizedRecord {
    let parts = normalize_title(&record.raw_title);
    NormalizedRecord {
        issue_id: record.issue_id.clone(),
        state: record.state.clone(),
        raw_title: record.raw_title.clone(),
        student: parts.student,
        assignments: parts.assignments,
        format_tag: parts.format_tag,
    }
}

pub fn normalize_records(records: &[RawRecord]) -> Vec<NormalizedRecord> {
    let normalized: Vec<NormalizedRecord> = records.iter().map(normalize_record).collect();
    let unattributed = normalized
        .iter()
        .filter(|record| record.student == UNKNOWN_STUDENT)
        .count();
    if unattributed > 0 {
        tracing::warn!(
            "{unattributed} of {} titles have no recognizable student",
            normalized.len()
        );
    }
    normalized
}

/// Expects a whitespace-collapsed, lower-cased title.
fn extract_assignments(lowered: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();

    if lowered.contains("final project proposal")
        || lowered.contains("project proposal")
        || lowered.contains("proposal for final project")
        || (lowered.contains("proposal") && lowered.contains("final project"))
    {
        tags.push(FINAL_PROJECT_PROPOSAL.to_string());
    }

    if lowered.contains("project submission") {
        tags.push(PROJECT_SUBMISSION.to_string());
    }

    let mut days: Vec<&str> = DAY
        .captures_iter(lowered)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect();
    if let Some(second) = DAY_PAIR.captures(lowered).and_then(|caps| caps.get(2)) {
        days.push(second.as_str());
    }

    for day in days {
        let tag = format!("day{:0>2}", trim_leading_zeros(day));
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    if tags.is_empty() {
        tags.push(UNKNOWN_ASSIGNMENT.to_string());
    }
    tags
}

/// Drops leading zeros from a run of ASCII digits, keeping at least one digit.
pub fn trim_leading_zeros(digits: &str) -> &str {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() && !digits.is_empty() {
        "0"
    } else {
        trimmed
    }
}

/// Title-cases each word after folding ` - ` separators into spaces. An empty
/// result becomes `UNKNOWN`.
pub fn canonical_student(name: &str) -> String {
    let collapsed = collapse_whitespace(name);
    let undashed = collapse_whitespace(&DASH_RUN.replace_all(&collapsed, " "));

    let canonical = undashed
        .split(' ')
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ");

    if canonical.is_empty() {
        UNKNOWN_STUDENT.to_string()
    } else {
        canonical
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
