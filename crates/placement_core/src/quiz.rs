//! crates/placement_core/src/quiz.rs
//!
//! The quiz record and its tolerant parser. Model output is not trusted to be
//! clean JSON, so parsing never fails: the worst case is an empty record.

use serde::{Deserialize, Serialize};

/// One generated multiple-choice question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizItem {
    pub question: String,
    pub options: Vec<String>,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: String,
    pub solution: String,
    pub credits: f64,
}

impl QuizItem {
    /// True for the fallback record produced when nothing could be parsed.
    pub fn is_empty(&self) -> bool {
        self.question.is_empty() && self.options.is_empty()
    }
}

/// The first balanced `{ ... }` span in `text`. Braces inside JSON string
/// literals do not count.
fn first_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parses a generation response into a `QuizItem`.
pub fn parse_quiz(body: &str) -> QuizItem {
    let body = strip_json_fences(body);

    if let Ok(item) = serde_json::from_str::<QuizItem>(body) {
        return item;
    }

    if let Some(span) = first_object(body) {
        if let Ok(item) = serde_json::from_str::<QuizItem>(span) {
            return item;
        }
    }

    tracing::warn!("Quiz response could not be parsed; falling back to an empty record.");
    QuizItem::default()
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => {
            let stripped = stripped.trim_start();
            stripped
                .strip_suffix("```")
                .map(str::trim)
                .unwrap_or(stripped)
        }
        None => text,
    }
}
