//! Append-only CSV log of session scores.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::error::AnalysisError;
use crate::model::AnalysisRecord;

/// Default file name, relative to the working directory.
pub const DEFAULT_ANALYSIS_FILE: &str = "analysis.csv";

/// Header row written when the file is first created.
pub const ANALYSIS_HEADER: [&str; 5] = ["Student ID", "Score", "Total", "Mode", "Difficulty"];

/// Score log backed by a single CSV file.
#[derive(Debug, Clone)]
pub struct AnalysisLog {
    path: PathBuf,
}

impl AnalysisLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, writing the header first if the file does not exist.
    ///
    /// Header detection is by file existence at call time; two processes
    /// logging to a fresh path at once can both write a header.
    #[instrument(skip(self, record), fields(path = %self.path.display(), student = %record.student_id))]
    pub fn append(&self, record: &AnalysisRecord) -> Result<(), AnalysisError> {
        if record.score > record.total {
            return Err(AnalysisError::InvalidScore {
                score: record.score,
                total: record.total,
            });
        }

        let is_new = !self.path.exists();
        if is_new {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|source| self.io_err(source))?;
                }
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.io_err(source))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if is_new {
            writer
                .write_record(ANALYSIS_HEADER)
                .map_err(|source| self.csv_err(source))?;
        }
        writer
            .write_record([
                record.student_id.clone(),
                record.score.to_string(),
                record.total.to_string(),
                record.mode.to_string(),
                record.difficulty.to_string(),
            ])
            .map_err(|source| self.csv_err(source))?;
        writer.flush().map_err(|source| self.io_err(source))?;

        debug!(header_written = is_new, "appended analysis record");
        Ok(())
    }

    /// Read every logged record. A missing file has no records.
    pub fn read_records(&self) -> Result<Vec<AnalysisRecord>, AnalysisError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path).map_err(|source| self.csv_err(source))?;
        reader
            .deserialize()
            .collect::<Result<Vec<AnalysisRecord>, _>>()
            .map_err(|source| self.csv_err(source))
    }

    /// Per-student totals across every logged session, ordered by student id.
    pub fn summarize(&self) -> Result<Vec<StudentSummary>, AnalysisError> {
        Ok(summarize_records(&self.read_records()?))
    }

    fn io_err(&self, source: std::io::Error) -> AnalysisError {
        AnalysisError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn csv_err(&self, source: csv::Error) -> AnalysisError {
        AnalysisError::Csv {
            path: self.path.clone(),
            source,
        }
    }
}

/// Aggregate scores for one student.
///
/// Totals are widened to `u64`.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentSummary {
    pub student_id: String,
    pub sessions: u64,
    pub total_score: u64,
    pub total_possible: u64,
}

impl StudentSummary {
    /// Score as a percentage of the possible total, 0 when nothing was possible.
    pub fn percentage(&self) -> f64 {
        if self.total_possible == 0 {
            0.0
        } else {
            self.total_score as f64 / self.total_possible as f64 * 100.0
        }
    }
}

pub fn summarize_records(records: &[AnalysisRecord]) -> Vec<StudentSummary> {
    let mut by_student: BTreeMap<&str, StudentSummary> = BTreeMap::new();
    for record in records {
        let entry = by_student
            .entry(record.student_id.as_str())
            .or_insert_with(|| StudentSummary {
                student_id: record.student_id.clone(),
                sessions: 0,
                total_score: 0,
                total_possible: 0,
            });
        entry.sessions += 1;
        entry.total_score += u64::from(record.score);
        entry.total_possible += u64::from(record.total);
    }
    by_student.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, Mode};

    #[test]
    fn first_append_writes_header_and_row() {
        let dir = tempfile::tempdir().unwrap();
        let log = AnalysisLog::new(dir.path().join("analysis.csv"));

        log.append(&AnalysisRecord::new("S1", 5, 5, Mode::Test, Difficulty::Hard))
            .unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(
            content,
            "Student ID,Score,Total,Mode,Difficulty\nS1,5,5,Test,Hard\n"
        );
    }

    #[test]
    fn header_written_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = AnalysisLog::new(dir.path().join("analysis.csv"));

        for i in 0..4 {
            log.append(&AnalysisRecord::new(
                format!("S{i}"),
                i,
                10,
                Mode::Practice,
                Difficulty::Medium,
            ))
            .unwrap();
        }

        let content = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(
            lines
                .iter()
                .filter(|l| **l == "Student ID,Score,Total,Mode,Difficulty")
                .count(),
            1
        );
        assert_eq!(lines[4], "S3,3,10,Practice,Medium");
    }

    #[test]
    fn existing_file_gets_no_new_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.csv");
        std::fs::write(&path, "Student ID,Score,Total,Mode,Difficulty\nS0,1,2,Test,Easy\n")
            .unwrap();

        let log = AnalysisLog::new(&path);
        log.append(&AnalysisRecord::new("S1", 2, 2, Mode::Test, Difficulty::Easy))
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("Student ID").count(), 1);
        assert!(content.ends_with("S1,2,2,Test,Easy\n"));
    }

    #[test]
    fn student_ids_with_commas_are_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let log = AnalysisLog::new(dir.path().join("analysis.csv"));
        log.append(&AnalysisRecord::new(
            "Doe, Jane",
            7,
            10,
            Mode::Practice,
            Difficulty::Easy,
        ))
        .unwrap();

        let records = log.read_records().unwrap();
        assert_eq!(records[0].student_id, "Doe, Jane");
        let content = std::fs::read_to_string(log.path()).unwrap();
        assert!(content.contains("\"Doe, Jane\",7,10,Practice,Easy"));
    }

    #[test]
    fn score_above_total_is_rejected_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let log = AnalysisLog::new(dir.path().join("analysis.csv"));

        let err = log
            .append(&AnalysisRecord::new("S1", 11, 10, Mode::Test, Difficulty::Hard))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidScore { score: 11, total: 10 }));
        assert!(!log.path().exists());
    }

    #[test]
    fn read_records_on_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = AnalysisLog::new(dir.path().join("none.csv"));
        assert!(log.read_records().unwrap().is_empty());
    }

    #[test]
    fn summary_groups_by_student() {
        let dir = tempfile::tempdir().unwrap();
        let log = AnalysisLog::new(dir.path().join("analysis.csv"));
        log.append(&AnalysisRecord::new("Student002", 3, 5, Mode::Test, Difficulty::Easy))
            .unwrap();
        log.append(&AnalysisRecord::new("Student001", 8, 10, Mode::Practice, Difficulty::Medium))
            .unwrap();
        log.append(&AnalysisRecord::new("Student001", 2, 10, Mode::Test, Difficulty::Hard))
            .unwrap();

        let summary = log.summarize().unwrap();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].student_id, "Student001");
        assert_eq!(summary[0].sessions, 2);
        assert_eq!(summary[0].total_score, 10);
        assert_eq!(summary[0].total_possible, 20);
        assert!((summary[0].percentage() - 50.0).abs() < 1e-9);
        assert!((summary[1].percentage() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn totals_near_u32_max_do_not_overflow() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.csv");
        std::fs::write(
            &path,
            "Student ID,Score,Total,Mode,Difficulty\nS1,4000000000,4000000000,Test,Hard\nS1,3000000000,4000000000,Test,Hard\n",
        )
        .unwrap();

        let summary = AnalysisLog::new(&path).summarize().unwrap();
        assert_eq!(summary[0].sessions, 2);
        assert_eq!(summary[0].total_score, 7_000_000_000);
        assert_eq!(summary[0].total_possible, 8_000_000_000);
        assert!((summary[0].percentage() - 87.5).abs() < 1e-9);
    }

    #[test]
    fn zero_total_percentage_is_zero() {
        let summary = summarize_records(&[AnalysisRecord::new(
            "S1",
            0,
            0,
            Mode::Practice,
            Difficulty::Easy,
        )]);
        assert_eq!(summary[0].percentage(), 0.0);
    }
}
