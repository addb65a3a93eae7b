// src/models/course.rs

use serde::Serialize;
use sqlx::FromRow;

use crate::engine::{EngineError, MAX_CO_COUNT, ScoringConfig};

/// Represents the 'courses' table in the database.
/// Only the columns the exam engine reads are mapped.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Course {
    pub id: i64,

    pub name: String,

    /// Number of course outcomes (CO1..COn).
    pub co_count: i32,

    /// Total marks of an assembled paper. `None` until the exam is configured.
    pub exam_marks: Option<i32>,

    /// Total questions on an assembled paper. `None` until the exam is configured.
    pub exam_question_count: Option<i32>,
}

/// Exam settings validated for paper assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamSettings {
    pub exam_marks: u32,
    pub question_count: u32,
    pub co_count: u32,
}

impl Course {
    /// CO count clamped to `0..=MAX_CO_COUNT`; pools and denominators are sized from it.
    pub fn co_count(&self) -> u32 {
        let count = u32::try_from(self.co_count).unwrap_or(0);
        if count > MAX_CO_COUNT {
            tracing::warn!(
                course_id = self.id,
                co_count = self.co_count,
                "co_count above {}, clamping",
                MAX_CO_COUNT
            );
            return MAX_CO_COUNT;
        }
        count
    }

    /// Both marks and question count must be set; assembly never defaults them.
    pub fn exam_settings(&self) -> Result<ExamSettings, EngineError> {
        let not_configured = EngineError::ExamNotConfigured { course_id: self.id };
        let (Some(marks), Some(count)) = (self.exam_marks, self.exam_question_count) else {
            return Err(not_configured);
        };
        let (Ok(exam_marks), Ok(question_count)) = (u32::try_from(marks), u32::try_from(count))
        else {
            return Err(not_configured);
        };

        Ok(ExamSettings {
            exam_marks,
            question_count,
            co_count: self.co_count(),
        })
    }

    /// Scoring treats unset exam marks as zero, which yields "0.00" overall.
    pub fn scoring_config(&self) -> ScoringConfig {
        ScoringConfig {
            co_count: self.co_count(),
            exam_marks: self
                .exam_marks
                .and_then(|m| u32::try_from(m).ok())
                .unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(marks: Option<i32>, count: Option<i32>) -> Course {
        Course {
            id: 9,
            name: "Data Structures".to_string(),
            co_count: 3,
            exam_marks: marks,
            exam_question_count: count,
        }
    }

    #[test]
    fn settings_require_both_fields() {
        assert_eq!(
            course(Some(10), None).exam_settings(),
            Err(EngineError::ExamNotConfigured { course_id: 9 })
        );
        assert_eq!(
            course(None, Some(6)).exam_settings(),
            Err(EngineError::ExamNotConfigured { course_id: 9 })
        );
        assert_eq!(
            course(Some(10), Some(6)).exam_settings(),
            Ok(ExamSettings {
                exam_marks: 10,
                question_count: 6,
                co_count: 3
            })
        );
    }

    #[test]
    fn scoring_config_defaults_missing_marks_to_zero() {
        assert_eq!(course(None, None).scoring_config().exam_marks, 0);
        assert_eq!(course(Some(40), Some(30)).scoring_config().exam_marks, 40);
    }

    #[test]
    fn oversized_co_count_is_clamped() {
        let mut c = course(Some(10), Some(6));
        c.co_count = 1_000_000_000;
        assert_eq!(c.co_count(), MAX_CO_COUNT);
        assert_eq!(c.scoring_config().co_count, MAX_CO_COUNT);

        c.co_count = -4;
        assert_eq!(c.co_count(), 0);
    }
}
