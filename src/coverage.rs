use std::collections::BTreeSet;

use crate::models::{
    CoverageRow, MissingRow, NormalizedRecord, RequiredAssignments, SubmissionIndex,
    UNKNOWN_STUDENT,
};

pub fn build_index(records: &[NormalizedRecord]) -> SubmissionIndex {
    let mut index = SubmissionIndex::new();

    for record in records.iter() {
        if record.student.is_empty() || record.student == UNKNOWN_STUDENT {
            continue;
        }

        let entry = index.entry(record.student.clone()).or_default();
        for tag in record.assignments.iter() {
            entry.insert(tag.trim().to_lowercase());
        }
    }

    tracing::debug!("indexed {} students", index.len());
    index
}

/// Required tags the student has not submitted, sorted. A student absent from
/// the index is missing everything.
pub fn missing_for(
    index: &SubmissionIndex,
    student: &str,
    required: &RequiredAssignments,
) -> Vec<String> {
    let empty = BTreeSet::new();
    let submitted = index.get(student).unwrap_or(&empty);

    required
        .as_set()
        .into_iter()
        .filter(|tag| !submitted.contains(*tag))
        .map(str::to_string)
        .collect()
}

pub fn missing_rows(index: &SubmissionIndex, required: &RequiredAssignments) -> Vec<MissingRow> {
    index
        .keys()
        .map(|student| MissingRow {
            student: student.clone(),
            missing: missing_for(index, student, required),
        })
        .collect()
}

pub fn coverage(index: &SubmissionIndex, required: &RequiredAssignments) -> Vec<CoverageRow> {
    let total_students = index.len();

    let mut rows: Vec<CoverageRow> = required
        .as_slice()
        .iter()
        .map(|assignment| {
            let submitted_count = index
                .values()
                .filter(|submitted| submitted.contains(assignment))
                .count();
            CoverageRow {
                assignment: assignment.clone(),
                submitted_count,
                total_students,
                rate: rate(submitted_count, total_students),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        a.rate
            .total_cmp(&b.rate)
            .then_with(|| a.assignment.cmp(&b.assignment))
    });
    rows
}

pub fn rate(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FormatTag, RawRecord};
    use crate::title::normalize_records;

    fn record(student: &str, assignments: &[&str]) -> NormalizedRecord {
        NormalizedRecord {
            issue_id: "1".to_string(),
            state: "open".to_string(),
            raw_title: String::new(),
            student: student.to_string(),
            assignments: assignments.iter().map(|a| a.to_string()).collect(),
            format_tag: FormatTag::Other,
        }
    }

    #[test]
    fn index_skips_unknown_students_and_lowercases_tags() {
        let index = build_index(&[
            record("Avery Lee", &["DAY01", "day02"]),
            record("UNKNOWN", &["day03"]),
            record("Avery Lee", &["day01", "unknown_assignment"]),
        ]);
        assert_eq!(index.len(), 1);
        let tags: Vec<&str> = index["Avery Lee"].iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["day01", "day02", "unknown_assignment"]);
    }

    #[test]
    fn missing_is_sorted_and_empty_when_compliant() {
        let index = build_index(&[
            record("Avery Lee", &["day01", "day02", "day03"]),
            record("Kiara Patel", &["day02"]),
        ]);
        let required = RequiredAssignments::new(["day03", "day01", "day01"]);

        assert!(missing_for(&index, "Avery Lee", &required).is_empty());
        assert_eq!(
            missing_for(&index, "Kiara Patel", &required),
            vec!["day01", "day03"]
        );
        assert_eq!(missing_for(&index, "Nobody", &required), vec!["day01", "day03"]);
    }

    #[test]
    fn missing_rows_cover_every_indexed_student() {
        let index = build_index(&[record("Zed", &["day01"]), record("Amy", &[])]);
        let rows = missing_rows(&index, &RequiredAssignments::new(["day01"]));
        assert_eq!(
            rows,
            vec![
                MissingRow {
                    student: "Amy".to_string(),
                    missing: vec!["day01".to_string()],
                },
                MissingRow {
                    student: "Zed".to_string(),
                    missing: vec![],
                },
            ]
        );
    }

    #[test]
    fn coverage_sorts_by_rate_then_tag() {
        let index = build_index(&[
            record("A", &["day01", "day02", "day03"]),
            record("B", &["day01", "day03"]),
            record("C", &["day03"]),
        ]);
        let required = RequiredAssignments::new(["day03", "day04", "day02", "day01", "day05"]);
        let rows = coverage(&index, &required);

        let order: Vec<&str> = rows.iter().map(|r| r.assignment.as_str()).collect();
        assert_eq!(order, vec!["day04", "day05", "day02", "day01", "day03"]);
        for pair in rows.windows(2) {
            assert!(pair[0].rate <= pair[1].rate);
        }
        for row in rows.iter() {
            assert!((0.0..=1.0).contains(&row.rate));
            assert_eq!(row.total_students, 3);
        }
    }

    #[test]
    fn empty_index_has_zero_rates() {
        let rows = coverage(&SubmissionIndex::new(), &RequiredAssignments::new(["day01"]));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].submitted_count, 0);
        assert_eq!(rows[0].total_students, 0);
        assert_eq!(rows[0].rate, 0.0);
    }

    #[test]
    fn end_to_end_single_student() {
        let raw = vec![
            RawRecord {
                issue_id: "1".to_string(),
                state: "open".to_string(),
                raw_title: "Day03 - Ana Gomez".to_string(),
            },
            RawRecord {
                issue_id: "2".to_string(),
                state: "closed".to_string(),
                raw_title: "day03 submission by Ana Gomez".to_string(),
            },
        ];
        let required = RequiredAssignments::new(["day01", "day03"]);
        let index = build_index(&normalize_records(&raw));

        assert_eq!(index.len(), 1);
        let tags: Vec<&str> = index["Ana Gomez"].iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["day03"]);
        assert_eq!(missing_for(&index, "Ana Gomez", &required), vec!["day01"]);

        let rows = coverage(&index, &required);
        assert_eq!(
            rows,
            vec![
                CoverageRow {
                    assignment: "day01".to_string(),
                    submitted_count: 0,
                    total_students: 1,
                    rate: 0.0,
                },
                CoverageRow {
                    assignment: "day03".to_string(),
                    submitted_count: 1,
                    total_students: 1,
                    rate: 1.0,
                },
            ]
        );
    }
}
