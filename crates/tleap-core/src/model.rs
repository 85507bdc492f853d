//! Core data model types for tleap.
//!
//! The question request is an ephemeral parameter bundle; the analysis
//! record is the one row persisted per finished practice or test session.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Question difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    /// Accepts the level names plus the beginner/intermediate/advanced
    /// vocabulary used by the quiz app's selection screens.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "beginner" | "e" => Ok(Difficulty::Easy),
            "medium" | "intermediate" | "m" => Ok(Difficulty::Medium),
            "hard" | "advanced" | "h" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// Session mode the score was recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Practice,
    Test,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Practice => write!(f, "Practice"),
            Mode::Test => write!(f, "Test"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "practice" | "p" => Ok(Mode::Practice),
            "test" | "t" => Ok(Mode::Test),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// Parameters for one question generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRequest {
    /// School class, e.g. "10".
    pub class_level: String,
    pub subject: String,
    pub topic: String,
    pub difficulty: Difficulty,
    /// Question type as shown to the model, e.g. "MCQ".
    pub question_type: String,
    /// Language the questions should be written in.
    pub language: String,
    /// Number of questions asked for. Not checked against the response.
    pub count: u32,
}

/// One logged outcome of a practice or test session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    #[serde(rename = "Student ID")]
    pub student_id: String,
    #[serde(rename = "Score")]
    pub score: u32,
    #[serde(rename = "Total")]
    pub total: u32,
    #[serde(rename = "Mode")]
    pub mode: Mode,
    #[serde(rename = "Difficulty")]
    pub difficulty: Difficulty,
}

impl AnalysisRecord {
    pub fn new(
        student_id: impl Into<String>,
        score: u32,
        total: u32,
        mode: Mode,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            score,
            total,
            mode,
            difficulty,
        }
    }
}
