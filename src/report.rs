use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::coverage;
use crate::models::{MissingRow, NormalizedRecord, RequiredAssignments, SubmissionIndex};

/// File names echoed in the markdown header.
#[derive(Debug, Clone)]
pub struct ArtifactNames {
    pub input: String,
    pub normalized_csv: String,
    pub missing_csv: String,
}

pub fn write_normalized_csv<W: std::io::Write>(
    writer: W,
    records: &[NormalizedRecord],
) -> anyhow::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "issue_id",
        "state",
        "raw_title",
        "student",
        "assignments",
        "format_tag",
    ])?;

    for record in records {
        csv.write_record([
            record.issue_id.as_str(),
            record.state.as_str(),
            record.raw_title.as_str(),
            record.student.as_str(),
            record.assignments.join(";").as_str(),
            record.format_tag.as_str(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

pub fn write_missing_csv<W: std::io::Write>(writer: W, rows: &[MissingRow]) -> anyhow::Result<()> {
    let mut sorted: Vec<&MissingRow> = rows.iter().collect();
    sorted.sort_by(|a, b| a.student.cmp(&b.student));

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["student", "missing_count", "missing_assignments"])?;

    for row in sorted {
        csv.write_record([
            row.student.as_str(),
            row.missing.len().to_string().as_str(),
            row.missing.join(";").as_str(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

pub fn build_report(
    generated_at: DateTime<Utc>,
    names: &ArtifactNames,
    index: &SubmissionIndex,
    required: &RequiredAssignments,
) -> String {
    let missing = coverage::missing_rows(index, required);
    let coverage_rows = coverage::coverage(index, required);

    let (incomplete, complete): (Vec<&MissingRow>, Vec<&MissingRow>) =
        missing.iter().partition(|row| !row.missing.is_empty());

    let mut output = String::new();

    let _ = writeln!(output, "# Missing Submissions Report");
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "- Generated: **{}**",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(output, "- Input file: `{}`", names.input);
    let _ = writeln!(output, "- Normalized CSV: `{}`", names.normalized_csv);
    let _ = writeln!(output, "- Missing CSV: `{}`", names.missing_csv);
    let _ = writeln!(output);

    let _ = writeln!(output, "## Summary");
    let _ = writeln!(output);
    let _ = writeln!(output, "- Total students in dataset: **{}**", index.len());
    let _ = writeln!(
        output,
        "- Students with all required submissions: **{}**",
        complete.len()
    );
    let _ = writeln!(
        output,
        "- Students missing ≥1 required submission: **{}**",
        incomplete.len()
    );
    let _ = writeln!(output);

    let _ = writeln!(output, "## Required assignments");
    let _ = writeln!(output);
    let _ = writeln!(output, "{required}");
    let _ = writeln!(output);

    let _ = writeln!(output, "## Assignment coverage (lowest first)");
    let _ = writeln!(output);
    let _ = writeln!(output, "| Assignment | Submitted | Total | Rate |");
    let _ = writeln!(output, "|---|---:|---:|---:|");
    for row in coverage_rows.iter() {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {:.1}% |",
            row.assignment,
            row.submitted_count,
            row.total_students,
            row.rate * 100.0
        );
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "## Students missing submissions");
    let _ = writeln!(output);
    let _ = writeln!(output, "| Student | Missing count | Missing assignments |");
    let _ = writeln!(output, "|---|---:|---|");
    for row in incomplete.iter() {
        let _ = writeln!(
            output,
            "| {} | {} | {} |",
            row.student,
            row.missing.len(),
            row.missing.join(", ")
        );
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "## Students with all required submissions");
    let _ = writeln!(output);
    for row in complete.iter() {
        let _ = writeln!(output, "- {}", row.student);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::models::FormatTag;

    fn names() -> ArtifactNames {
        ArtifactNames {
            input: "subjects.txt".to_string(),
            normalized_csv: "normalized_titles.csv".to_string(),
            missing_csv: "missing_submissions.csv".to_string(),
        }
    }

    fn sample_index() -> SubmissionIndex {
        let mut index = SubmissionIndex::new();
        index.insert(
            "Avery Lee".to_string(),
            ["day01", "day02"].iter().map(|s| s.to_string()).collect(),
        );
        index.insert(
            "Jules Moreno".to_string(),
            ["day02"].iter().map(|s| s.to_string()).collect(),
        );
        index
    }

    #[test]
    fn normalized_csv_has_header_and_joined_tags() {
        let records = vec![NormalizedRecord {
            issue_id: "4".to_string(),
            state: "open".to_string(),
            raw_title: "Day 05, 06 - Rachel".to_string(),
            student: "Rachel".to_string(),
            assignments: vec!["day05".to_string(), "day06".to_string()],
            format_tag: FormatTag::HasDash,
        }];
        let mut buffer = Vec::new();
        write_normalized_csv(&mut buffer, &records).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("issue_id,state,raw_title,student,assignments,format_tag")
        );
        assert_eq!(
            lines.next(),
            Some("4,open,\"Day 05, 06 - Rachel\",Rachel,day05;day06,has_dash")
        );
    }

    #[test]
    fn missing_csv_is_sorted_by_student() {
        let rows = vec![
            MissingRow {
                student: "Zed".to_string(),
                missing: vec![],
            },
            MissingRow {
                student: "Amy".to_string(),
                missing: vec!["day01".to_string(), "day03".to_string()],
            },
        ];
        let mut buffer = Vec::new();
        write_missing_csv(&mut buffer, &rows).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "student,missing_count,missing_assignments",
                "Amy,2,day01;day03",
                "Zed,0,",
            ]
        );
    }

    #[test]
    fn report_contains_summary_and_tables() {
        let generated_at = Utc.with_ymd_and_hms(2026, 2, 3, 4, 5, 6).unwrap();
        let required = RequiredAssignments::new(["day01", "day02"]);
        let report = build_report(generated_at, &names(), &sample_index(), &required);

        assert!(report.contains("- Generated: **2026-02-03 04:05:06 UTC**"));
        assert!(report.contains("- Input file: `subjects.txt`"));
        assert!(report.contains("- Total students in dataset: **2**"));
        assert!(report.contains("- Students with all required submissions: **1**"));
        assert!(report.contains("- Students missing ≥1 required submission: **1**"));
        assert!(report.contains("day01, day02"));
        assert!(report.contains("| day01 | 1 | 2 | 50.0% |"));
        assert!(report.contains("| day02 | 2 | 2 | 100.0% |"));
        assert!(report.contains("| Jules Moreno | 1 | day01 |"));
        assert!(report.ends_with("- Avery Lee\n"));

        let day01 = report.find("| day01 |").unwrap();
        let day02 = report.find("| day02 |").unwrap();
        assert!(day01 < day02);
    }

    #[test]
    fn report_is_stable_for_fixed_timestamp() {
        let generated_at = Utc.with_ymd_and_hms(2026, 2, 3, 4, 5, 6).unwrap();
        let required = RequiredAssignments::new(["day01"]);
        let first = build_report(generated_at, &names(), &sample_index(), &required);
        let second = build_report(generated_at, &names(), &sample_index(), &required);
        assert_eq!(first, second);
    }
}
