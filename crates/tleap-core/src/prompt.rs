//! Prompt construction for question generation.

use crate::model::QuestionRequest;

/// System prompt sent alongside every question generation request.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a strict quiz generator for school students. Write one question or answer per line. Do not add greetings or commentary.";

/// Build the user prompt for a question request.
///
/// Every field of the request is interpolated into a fixed template that asks
/// for `count` questions with answers and no repeats.
pub fn build_prompt(request: &QuestionRequest) -> String {
    format!(
        "Generate {count} {qtype} questions in {language} for class {class} students.\n\
         Subject: {subject}\n\
         Topic: {topic}\n\
         Difficulty: {difficulty}\n\
         Provide correct answers clearly. Avoid repeating previous questions.",
        count = request.count,
        qtype = request.question_type,
        language = request.language,
        class = request.class_level,
        subject = request.subject,
        topic = request.topic,
        difficulty = request.difficulty,
    )
}
