// src/store/mod.rs

//! Read/write contract between the HTTP layer and persistent storage.
//!
//! Handlers fetch everything the engine needs through this trait before calling
//! into `crate::engine`, so the engine never sees the storage technology.

pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    engine::{AnswerEntry, PaperSelection},
    error::AppError,
    models::{course::Course, question::Question, submission::RecordedSubmission},
};

pub use postgres::PgExamStore;

pub type SharedStore = Arc<dyn ExamStore>;

#[async_trait]
pub trait ExamStore: Send + Sync {
    async fn find_course(&self, course_id: i64) -> Result<Option<Course>, AppError>;

    /// Entire question bank of a course.
    async fn course_questions(&self, course_id: i64) -> Result<Vec<Question>, AppError>;

    /// Paper previously assembled for the pair, if any.
    async fn find_paper(
        &self,
        course_id: i64,
        student_id: i64,
    ) -> Result<Option<PaperSelection>, AppError>;

    /// Stores `paper` unless the pair already has one, and returns the paper that
    /// is stored afterwards. Concurrent callers all get the same paper back.
    async fn save_paper(
        &self,
        course_id: i64,
        student_id: i64,
        paper: &PaperSelection,
    ) -> Result<PaperSelection, AppError>;

    async fn has_submission(&self, course_id: i64, student_id: i64) -> Result<bool, AppError>;

    /// Stores a submission and all of its answers atomically.
    ///
    /// Must fail with `AppError::Conflict` when the pair already has a submission,
    /// leaving the stored one untouched.
    async fn record_submission(
        &self,
        course_id: i64,
        student_id: i64,
        answers: &[AnswerEntry],
        malpractice: bool,
    ) -> Result<(), AppError>;

    async fn find_submission(
        &self,
        course_id: i64,
        student_id: i64,
    ) -> Result<Option<RecordedSubmission>, AppError>;

    /// All submissions of a course, ordered by student id.
    async fn course_submissions(&self, course_id: i64)
    -> Result<Vec<RecordedSubmission>, AppError>;

    async fn log_malpractice(
        &self,
        course_id: i64,
        student_id: i64,
        kind: &str,
    ) -> Result<(), AppError>;
}
