// src/handlers/submission.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use super::load_course;
use crate::{
    engine::{validate_against_paper, validate_submission},
    error::AppError,
    models::{
        question::answer_keys,
        submission::{MalpracticeReport, SubmitExamRequest},
    },
    store::SharedStore,
};

/// Records a student's answers for a course.
///
/// * A paper must have been assembled for the student first.
/// * Every answer must reference a question of this course that is on that paper.
/// * Only the first submission per (student, course) is accepted; later ones get 409.
/// * `is_malpractice` is stored with the submission and turns every result field into "M".
pub async fn submit_exam(
    State(store): State<SharedStore>,
    Path((course_id, student_id)): Path<(i64, i64)>,
    Json(req): Json<SubmitExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    load_course(&store, course_id).await?;

    if let Some(question_id) = req.duplicate_question() {
        return Err(AppError::BadRequest(format!(
            "Question {} answered more than once",
            question_id
        )));
    }

    let paper = store
        .find_paper(course_id, student_id)
        .await?
        .ok_or_else(|| {
            AppError::BadRequest("No paper has been assembled for this student".to_string())
        })?;

    let questions = store.course_questions(course_id).await?;
    let keys = answer_keys(&questions)?;
    validate_submission(&keys, &req.answers)?;
    validate_against_paper(&paper, &req.answers)?;

    store
        .record_submission(course_id, student_id, &req.answers, req.is_malpractice)
        .await?;

    tracing::info!(
        course_id,
        student_id,
        answers = req.answers.len(),
        malpractice = req.is_malpractice,
        "Exam submitted"
    );

    let message = if req.is_malpractice {
        "Exam auto-evaluated due to malpractice"
    } else {
        "Exam submitted successfully"
    };

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": message,
            "answers_recorded": req.answers.len(),
        })),
    ))
}

/// Appends a detected violation to the malpractice log.
/// The log is an audit trail; scoring only looks at the submission's flag.
pub async fn report_malpractice(
    State(store): State<SharedStore>,
    Path((course_id, student_id)): Path<(i64, i64)>,
    Json(payload): Json<MalpracticeReport>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    load_course(&store, course_id).await?;
    store
        .log_malpractice(course_id, student_id, &payload.kind)
        .await?;

    tracing::warn!(course_id, student_id, kind = %payload.kind, "Malpractice reported");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "message": "Malpractice logged successfully" })),
    ))
}
