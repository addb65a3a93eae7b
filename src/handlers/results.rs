// src/handlers/results.rs

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use super::load_course;
use crate::{
    engine::{AnswerKey, QuestionId, ScoringConfig, co_max_marks, score_submission},
    error::AppError,
    models::{question::answer_keys, result::StudentResult, submission::RecordedSubmission},
    store::SharedStore,
};

/// Computes one student's result for a course.
/// Results are never stored; they are recomputed from the submission each time.
pub async fn student_result(
    State(store): State<SharedStore>,
    Path((course_id, student_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let course = load_course(&store, course_id).await?;

    let submission = store
        .find_submission(course_id, student_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("No submission found for this student and course".to_string())
        })?;

    let questions = store.course_questions(course_id).await?;
    let keys = answer_keys(&questions)?;
    let config = course.scoring_config();
    let max_marks = co_max_marks(config.co_count, &keys);

    let row = score_recorded(course_id, &config, &max_marks, &keys, submission)?;
    Ok(Json(row))
}

/// Result sheet for every student who submitted for a course.
/// Per-CO maximum marks are computed once and shared by all rows.
pub async fn course_results(
    State(store): State<SharedStore>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let course = load_course(&store, course_id).await?;
    let submissions = store.course_submissions(course_id).await?;

    if submissions.is_empty() {
        return Ok(Json(Vec::<StudentResult>::new()));
    }

    let questions = store.course_questions(course_id).await?;
    let keys = answer_keys(&questions)?;
    let config = course.scoring_config();
    let max_marks = co_max_marks(config.co_count, &keys);

    let rows = submissions
        .into_iter()
        .map(|submission| score_recorded(course_id, &config, &max_marks, &keys, submission))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(course_id, students = rows.len(), "Course results computed");

    Ok(Json(rows))
}

/// Scores a stored submission.
///
/// Answers were checked against the bank when submitted, so a failure here means
/// the stored data changed underneath (e.g. a question moved to another course).
fn score_recorded(
    course_id: i64,
    config: &ScoringConfig,
    max_marks: &[u32],
    keys: &HashMap<QuestionId, AnswerKey>,
    submission: RecordedSubmission,
) -> Result<StudentResult, AppError> {
    let result = score_submission(
        config,
        max_marks,
        keys,
        &submission.answers,
        submission.malpractice,
    )
    .map_err(|e| {
        AppError::InternalServerError(format!(
            "stored submission of student {} in course {} cannot be scored: {}",
            submission.student_id, course_id, e
        ))
    })?;

    Ok(StudentResult {
        student_id: submission.student_id,
        student_name: submission.student_name,
        register_number: submission.register_number,
        result,
    })
}
