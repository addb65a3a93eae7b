// src/handlers/paper.rs

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use rand::{SeedableRng, rngs::StdRng};

use super::load_course;
use crate::{
    engine::{QuestionId, assemble_paper, check_pool_capacity, compute_quotas},
    error::AppError,
    models::question::{PaperResponse, PublicQuestion, Question, co_pools},
    store::SharedStore,
};

/// Reports whether a course's question bank can produce a paper.
///
/// Read-only: computes the quotas from the course's exam settings and compares them
/// with the stock of each course outcome.
pub async fn paper_readiness(
    State(store): State<SharedStore>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let course = load_course(&store, course_id).await?;
    let settings = course.exam_settings()?;
    let quotas = compute_quotas(settings.exam_marks, settings.question_count, settings.co_count)?;

    let questions = store.course_questions(course_id).await?;
    let pools = co_pools(settings.co_count, &questions)?;

    Ok(Json(check_pool_capacity(&quotas, &pools)))
}

/// Returns the student's CO-balanced paper, assembling it on first request.
///
/// * Rejects the request when the student already submitted for this course.
/// * The first assembled paper is stored; later calls return it unchanged.
/// * Returns weightage 1 questions as `phase1` and weightage 2 questions as
///   `phase2`, without the correct answers.
pub async fn generate_paper(
    State(store): State<SharedStore>,
    Path((course_id, student_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let course = load_course(&store, course_id).await?;

    if store.has_submission(course_id, student_id).await? {
        return Err(AppError::Conflict(
            "Exam already submitted for this course".to_string(),
        ));
    }

    let questions = store.course_questions(course_id).await?;

    let selection = match store.find_paper(course_id, student_id).await? {
        Some(stored) => {
            tracing::debug!(course_id, student_id, "Returning stored paper");
            stored
        }
        None => {
            let settings = course.exam_settings()?;
            let quotas =
                compute_quotas(settings.exam_marks, settings.question_count, settings.co_count)?;
            let pools = co_pools(settings.co_count, &questions)?;

            let mut rng = StdRng::from_os_rng();
            let assembled = assemble_paper(&quotas, &pools, &mut rng).map_err(|e| {
                tracing::warn!(course_id, student_id, "Paper assembly failed: {}", e);
                e
            })?;

            let stored = store.save_paper(course_id, student_id, &assembled).await?;
            tracing::info!(
                course_id,
                student_id,
                phase1 = stored.phase1.len(),
                phase2 = stored.phase2.len(),
                "Paper assembled"
            );
            stored
        }
    };

    let mut bank: HashMap<QuestionId, Question> =
        questions.into_iter().map(|q| (q.id, q)).collect();

    Ok(Json(PaperResponse {
        phase1: take_public(&mut bank, &selection.phase1),
        phase2: take_public(&mut bank, &selection.phase2),
    }))
}

fn take_public(bank: &mut HashMap<QuestionId, Question>, ids: &[QuestionId]) -> Vec<PublicQuestion> {
    ids.iter()
        .filter_map(|id| bank.remove(id))
        .map(PublicQuestion::from)
        .collect()
}
