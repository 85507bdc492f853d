//! Persisted history of previously generated questions.
//!
//! The history file is a JSON array of strings. It is read in full when the
//! store is opened and overwritten in full on every save.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::HistoryError;

/// Default file name, relative to the working directory.
pub const DEFAULT_HISTORY_FILE: &str = "question_history.json";

/// Ordered, duplicate-free record of question lines seen across runs.
#[derive(Debug, Clone)]
pub struct QuestionHistory {
    path: PathBuf,
    entries: Vec<String>,
    seen: HashSet<String>,
}

impl QuestionHistory {
    /// Create an empty history bound to `path` without touching the disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Load the history stored at `path`.
    ///
    /// A missing file yields an empty history. Repeated entries in the file
    /// are collapsed, keeping the first occurrence.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, HistoryError> {
        let path = path.into();
        let mut history = Self::new(path.clone());

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no question history yet");
                return Ok(history);
            }
            Err(source) => return Err(HistoryError::Read { path, source }),
        };

        let stored: Vec<String> = serde_json::from_str(&content)
            .map_err(|source| HistoryError::Malformed {
                path: path.clone(),
                source,
            })?;

        for question in stored {
            history.insert(question);
        }
        debug!(path = %path.display(), entries = history.len(), "loaded question history");
        Ok(history)
    }

    /// Overwrite the history file with every entry, in insertion order.
    pub fn save(&self) -> Result<(), HistoryError> {
        let write_err = |source| HistoryError::Write {
            path: self.path.clone(),
            source,
        };

        let json = serde_json::to_string(&self.entries)
            .map_err(|e| write_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(write_err)?;
            }
        }
        std::fs::write(&self.path, json).map_err(write_err)?;

        debug!(path = %self.path.display(), entries = self.entries.len(), "saved question history");
        Ok(())
    }

    /// Record a question. Returns `false` if it was already present.
    pub fn insert(&mut self, question: impl Into<String>) -> bool {
        let question = question.into();
        if self.seen.contains(&question) {
            return false;
        }
        self.seen.insert(question.clone());
        self.entries.push(question);
        true
    }

    /// Exact-string membership check.
    pub fn contains(&self, question: &str) -> bool {
        self.seen.contains(question)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every entry. The file is only rewritten on the next `save`.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.seen.clear();
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let history = QuestionHistory::load(dir.path().join("absent.json")).unwrap();
        assert!(history.is_empty());
    }

    #[test]
    fn save_then_load_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let mut history = QuestionHistory::new(&path);
        history.insert("Q3: 1/2 + 1/4 = ?");
        history.insert("Q1: 2+2=4");
        history.insert("Q2: 3+3=6");
        history.save().unwrap();

        let loaded = QuestionHistory::load(&path).unwrap();
        assert_eq!(
            loaded.entries(),
            &["Q3: 1/2 + 1/4 = ?", "Q1: 2+2=4", "Q2: 3+3=6"]
        );
    }

    #[test]
    fn file_is_a_plain_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let mut history = QuestionHistory::new(&path);
        history.insert("Q1: 2+2=4");
        history.save().unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, vec!["Q1: 2+2=4".to_string()]);
    }

    #[test]
    fn insert_rejects_exact_duplicates_only() {
        let mut history = QuestionHistory::new("unused.json");
        assert!(history.insert("What is 2+2?"));
        assert!(!history.insert("What is 2+2?"));
        assert!(history.insert("what is 2+2?"));
        assert!(history.insert("What is 2+2? "));
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn duplicates_in_file_are_collapsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, r#"["a", "b", "a", "c", "b"]"#).unwrap();

        let history = QuestionHistory::load(&path).unwrap();
        assert_eq!(history.entries(), &["a", "b", "c"]);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{ not a list").unwrap();

        let err = QuestionHistory::load(&path).unwrap_err();
        assert!(matches!(err, HistoryError::Malformed { .. }));
        assert!(err.to_string().contains("malformed"));
    }

    #[test]
    fn wrong_json_shape_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        assert!(matches!(
            QuestionHistory::load(&path),
            Err(HistoryError::Malformed { .. })
        ));
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/history.json");

        let mut history = QuestionHistory::new(&path);
        history.insert("Q");
        history.save().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn clear_then_save_empties_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let mut history = QuestionHistory::new(&path);
        history.insert("Q1");
        history.save().unwrap();
        history.clear();
        assert!(!history.contains("Q1"));
        history.save().unwrap();

        assert!(QuestionHistory::load(&path).unwrap().is_empty());
    }
}
