// src/engine/mod.rs

//! Assessment assembly and scoring engine.
//!
//! Pure computations only: callers fetch course configuration, question pools and
//! submissions from storage and hand them in. Nothing here touches the database,
//! the network or global state.

pub mod assembler;
pub mod quota;
pub mod scoring;

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

pub use assembler::{CoPool, PaperSelection, PoolCapacity, assemble_paper, check_pool_capacity};
pub use quota::{Quotas, compute_quotas};
pub use scoring::{
    AnswerEntry, AnswerKey, ExamResult, Graded, OutcomeScore, Percentage, ScoringConfig,
    co_max_marks, score_submission, validate_against_paper, validate_submission,
};

pub type QuestionId = i64;

/// Highest number of course outcomes a course may define.
pub const MAX_CO_COUNT: u32 = 6;

static CO_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*co\s*(\d+)\s*$").expect("static regex is valid"));

/// Parses a course outcome label such as `"CO3"` into its 1-based index.
pub fn parse_co_number(label: &str) -> Option<u32> {
    CO_NUMBER
        .captures(label)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .filter(|n| *n > 0)
}

/// Canonical label for a CO index.
pub fn co_label(index: u32) -> String {
    format!("CO{}", index)
}

/// Marks carried by a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Weightage {
    One,
    Two,
}

impl Weightage {
    pub fn marks(self) -> u32 {
        match self {
            Weightage::One => 1,
            Weightage::Two => 2,
        }
    }
}

impl TryFrom<i32> for Weightage {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Weightage::One),
            2 => Ok(Weightage::Two),
            other => Err(format!("weightage must be 1 or 2, got {}", other)),
        }
    }
}

impl From<Weightage> for i32 {
    fn from(w: Weightage) -> Self {
        w.marks() as i32
    }
}

/// One of the four options of a multiple-choice question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerOption {
    Option1,
    Option2,
    Option3,
    Option4,
}

impl AnswerOption {
    pub fn as_str(self) -> &'static str {
        match self {
            AnswerOption::Option1 => "option1",
            AnswerOption::Option2 => "option2",
            AnswerOption::Option3 => "option3",
            AnswerOption::Option4 => "option4",
        }
    }
}

impl FromStr for AnswerOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "option1" => Ok(AnswerOption::Option1),
            "option2" => Ok(AnswerOption::Option2),
            "option3" => Ok(AnswerOption::Option3),
            "option4" => Ok(AnswerOption::Option4),
            other => Err(format!("unknown answer option '{}'", other)),
        }
    }
}

/// Terminal failures of the engine operations.
///
/// None of these are transient: calling again with the same inputs fails the same
/// way, so callers should surface them rather than retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum EngineError {
    /// Marks do not lie in `[question_count, 2 * question_count]`.
    InvalidQuota { exam_marks: u32, question_count: u32 },

    /// The course defines no course outcomes.
    NoCourseOutcomes,

    /// The question bank cannot satisfy the quotas.
    InsufficientQuestionPool {
        required_weight1: usize,
        required_weight2: usize,
        obtained_weight1: usize,
        obtained_weight2: usize,
    },

    /// A submission cites a question outside the course's pool.
    InvalidSubmissionReference { question_id: QuestionId },

    /// A submission cites a question that was not placed on the student's paper.
    QuestionNotOnPaper { question_id: QuestionId },

    /// Exam marks or question count is not set on the course.
    ExamNotConfigured { course_id: i64 },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidQuota {
                exam_marks,
                question_count,
            } => write!(
                f,
                "invalid quota: {} marks cannot be split over {} questions of weightage 1 or 2",
                exam_marks, question_count
            ),
            EngineError::NoCourseOutcomes => write!(f, "no course outcomes defined for this course"),
            EngineError::InsufficientQuestionPool {
                required_weight1,
                required_weight2,
                obtained_weight1,
                obtained_weight2,
            } => write!(
                f,
                "not enough questions to meet the required distribution: required {} weightage 1 and {} weightage 2, got {} and {}",
                required_weight1, required_weight2, obtained_weight1, obtained_weight2
            ),
            EngineError::InvalidSubmissionReference { question_id } => {
                write!(f, "question {} does not belong to this course", question_id)
            }
            EngineError::QuestionNotOnPaper { question_id } => {
                write!(f, "question {} is not on this student's paper", question_id)
            }
            EngineError::ExamNotConfigured { course_id } => write!(
                f,
                "course {} has no exam marks or question count configured",
                course_id
            ),
        }
    }
}

impl std::error::Error for EngineError {}
