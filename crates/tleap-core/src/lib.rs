//! tleap-core - question generation, history dedup, and score logging.
//!
//! This crate defines the data model, the model-service trait, and the three
//! components the rest of tleap builds on: the question history store, the
//! question generator, and the analysis logger.

pub mod analysis;
pub mod error;
pub mod generator;
pub mod history;
pub mod model;
pub mod prompt;
pub mod traits;

pub use analysis::{AnalysisLog, StudentSummary, ANALYSIS_HEADER};
pub use error::{AnalysisError, GenerateError, HistoryError, ProviderError};
pub use generator::{GeneratorConfig, QuestionGenerator};
pub use history::QuestionHistory;
pub use model::{AnalysisRecord, Difficulty, Mode, QuestionRequest};
