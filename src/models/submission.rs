// src/models/submission.rs

use std::collections::HashSet;

use serde::Deserialize;
use validator::Validate;

use crate::engine::{AnswerEntry, QuestionId};

/// A stored submission together with its answers, ready for scoring.
#[derive(Debug, Clone)]
pub struct RecordedSubmission {
    pub student_id: i64,
    pub student_name: Option<String>,
    pub register_number: Option<String>,
    pub malpractice: bool,
    pub answers: Vec<AnswerEntry>,
}

/// DTO for submitting an exam attempt.
#[derive(Debug, Deserialize)]
pub struct SubmitExamRequest {
    /// Every question shown to the student, answered or not.
    pub answers: Vec<AnswerEntry>,

    /// Set by the client when a violation ended the attempt.
    #[serde(default)]
    pub is_malpractice: bool,
}

impl SubmitExamRequest {
    /// First question id that appears more than once, if any.
    pub fn duplicate_question(&self) -> Option<QuestionId> {
        let mut seen = HashSet::new();
        self.answers
            .iter()
            .map(|a| a.question_id)
            .find(|id| !seen.insert(*id))
    }
}

/// DTO for reporting a detected violation during an attempt.
#[derive(Debug, Deserialize, Validate)]
pub struct MalpracticeReport {
    /// Short violation label, e.g. "tab_switch".
    #[validate(length(min = 1, max = 100))]
    pub kind: String,
}
