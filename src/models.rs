use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

pub const UNKNOWN_STUDENT: &str = "UNKNOWN";
pub const UNKNOWN_ASSIGNMENT: &str = "unknown_assignment";
pub const FINAL_PROJECT_PROPOSAL: &str = "final_project_proposal";
pub const PROJECT_SUBMISSION: &str = "project_submission";

/// Student name to every assignment tag they have submitted.
pub type SubmissionIndex = BTreeMap<String, BTreeSet<String>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// Canonical integer text: no `+`, no leading zeros, any magnitude.
    pub issue_id: String,
    pub state: String,
    pub raw_title: String,
}

/// Which student-extraction rule matched a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatTag {
    HasBy,
    HasDash,
    DayThenName,
    Other,
}

impl FormatTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatTag::HasBy => "has_by",
            FormatTag::HasDash => "has_dash",
            FormatTag::DayThenName => "day_then_name",
            FormatTag::Other => "other",
        }
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedRecord {
    pub issue_id: String,
    pub state: String,
    pub raw_title: String,
    pub student: String,
    pub assignments: Vec<String>,
    pub format_tag: FormatTag,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingRow {
    pub student: String,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageRow {
    pub assignment: String,
    pub submitted_count: usize,
    pub total_students: usize,
    pub rate: f64,
}

/// Ordered, lower-cased, de-duplicated list of assignment tags every student
/// is expected to submit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequiredAssignments(Vec<String>);

impl RequiredAssignments {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = BTreeSet::new();
        let mut ordered = Vec::new();
        for tag in tags {
            let tag = tag.as_ref().trim().to_lowercase();
            if tag.is_empty() || !seen.insert(tag.clone()) {
                continue;
            }
            ordered.push(tag);
        }
        Self(ordered)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn as_set(&self) -> BTreeSet<&str> {
        self.0.iter().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RequiredAssignments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}
