// src/store/postgres.rs

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::ExamStore;
use crate::{
    engine::{AnswerEntry, AnswerOption, PaperSelection},
    error::AppError,
    models::{course::Course, question::Question, submission::RecordedSubmission},
};

/// Submission header joined with the student's identity.
#[derive(sqlx::FromRow)]
struct SubmissionRow {
    id: i64,
    student_id: i64,
    malpractice: bool,
    student_name: Option<String>,
    register_number: Option<String>,
}

#[derive(sqlx::FromRow)]
struct AnswerRow {
    submission_id: i64,
    question_id: i64,
    selected_option: Option<String>,
}

impl AnswerRow {
    fn into_entry(self) -> Result<AnswerEntry, AppError> {
        let selected_option = self
            .selected_option
            .map(|s| s.parse::<AnswerOption>())
            .transpose()
            .map_err(|e| {
                AppError::InternalServerError(format!(
                    "submission {} question {}: {}",
                    self.submission_id, self.question_id, e
                ))
            })?;

        Ok(AnswerEntry {
            question_id: self.question_id,
            selected_option,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PaperRow {
    phase1: Vec<i64>,
    phase2: Vec<i64>,
}

impl From<PaperRow> for PaperSelection {
    fn from(row: PaperRow) -> Self {
        PaperSelection {
            phase1: row.phase1,
            phase2: row.phase2,
        }
    }
}

const SUBMISSION_COLUMNS: &str = r#"
    SELECT
        s.id,
        s.student_id,
        s.malpractice,
        st.name as student_name,
        st.register_no as register_number
    FROM exam_submissions s
    LEFT JOIN students st ON st.id = s.student_id
"#;

#[derive(Clone)]
pub struct PgExamStore {
    pool: PgPool,
}

impl PgExamStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn answers_for(
        &self,
        submission_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<AnswerEntry>>, AppError> {
        let rows: Vec<AnswerRow> = sqlx::query_as(
            r#"
            SELECT submission_id, question_id, selected_option
            FROM submission_answers
            WHERE submission_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(submission_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch submission answers: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        let mut grouped: HashMap<i64, Vec<AnswerEntry>> = HashMap::new();
        for row in rows {
            let submission_id = row.submission_id;
            grouped.entry(submission_id).or_default().push(row.into_entry()?);
        }
        Ok(grouped)
    }

    async fn attach_answers(
        &self,
        rows: Vec<SubmissionRow>,
    ) -> Result<Vec<RecordedSubmission>, AppError> {
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut answers = self.answers_for(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| RecordedSubmission {
                student_id: row.student_id,
                student_name: row.student_name,
                register_number: row.register_number,
                malpractice: row.malpractice,
                answers: answers.remove(&row.id).unwrap_or_default(),
            })
            .collect())
    }
}

#[async_trait]
impl ExamStore for PgExamStore {
    async fn find_course(&self, course_id: i64) -> Result<Option<Course>, AppError> {
        let course = sqlx::query_as::<_, Course>(
            r#"
            SELECT id, name, co_count, exam_marks, exam_question_count
            FROM courses
            WHERE id = $1
            "#,
        )
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(course)
    }

    async fn course_questions(&self, course_id: i64) -> Result<Vec<Question>, AppError> {
        sqlx::query_as::<_, Question>(
            r#"
            SELECT
                id,
                course_id,
                co_number,
                k_level,
                content,
                options,
                answer,
                weightage,
                created_at
            FROM questions
            WHERE course_id = $1
            ORDER BY id
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch questions for course {}: {:?}", course_id, e);
            AppError::InternalServerError(e.to_string())
        })
    }

    async fn find_paper(
        &self,
        course_id: i64,
        student_id: i64,
    ) -> Result<Option<PaperSelection>, AppError> {
        let row: Option<PaperRow> = sqlx::query_as(
            "SELECT phase1, phase2 FROM exam_attempts WHERE course_id = $1 AND student_id = $2",
        )
        .bind(course_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PaperSelection::from))
    }

    async fn save_paper(
        &self,
        course_id: i64,
        student_id: i64,
        paper: &PaperSelection,
    ) -> Result<PaperSelection, AppError> {
        sqlx::query(
            r#"
            INSERT INTO exam_attempts (student_id, course_id, phase1, phase2)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (student_id, course_id) DO NOTHING
            "#,
        )
        .bind(student_id)
        .bind(course_id)
        .bind(&paper.phase1[..])
        .bind(&paper.phase2[..])
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to store paper: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        // Whoever inserted first decides the paper.
        self.find_paper(course_id, student_id).await?.ok_or_else(|| {
            AppError::InternalServerError(format!(
                "paper for student {} in course {} vanished after insert",
                student_id, course_id
            ))
        })
    }

    async fn has_submission(&self, course_id: i64, student_id: i64) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM exam_submissions WHERE course_id = $1 AND student_id = $2)",
        )
        .bind(course_id)
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn record_submission(
        &self,
        course_id: i64,
        student_id: i64,
        answers: &[AnswerEntry],
        malpractice: bool,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        // The unique (student_id, course_id) index makes the first submission win.
        let submission_id: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO exam_submissions (student_id, course_id, malpractice)
            VALUES ($1, $2, $3)
            ON CONFLICT (student_id, course_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(student_id)
        .bind(course_id)
        .bind(malpractice)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(submission_id) = submission_id else {
            return Err(AppError::Conflict(
                "Exam already submitted for this course".to_string(),
            ));
        };

        if !answers.is_empty() {
            let mut query_builder = QueryBuilder::<Postgres>::new(
                "INSERT INTO submission_answers (submission_id, question_id, selected_option) ",
            );
            query_builder.push_values(answers, |mut row, answer| {
                row.push_bind(submission_id)
                    .push_bind(answer.question_id)
                    .push_bind(answer.selected_option.map(AnswerOption::as_str));
            });

            query_builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to insert submission answers: {:?}", e);
                    AppError::InternalServerError(e.to_string())
                })?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_submission(
        &self,
        course_id: i64,
        student_id: i64,
    ) -> Result<Option<RecordedSubmission>, AppError> {
        let row: Option<SubmissionRow> = sqlx::query_as(&format!(
            "{} WHERE s.course_id = $1 AND s.student_id = $2",
            SUBMISSION_COLUMNS
        ))
        .bind(course_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.attach_answers(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn course_submissions(
        &self,
        course_id: i64,
    ) -> Result<Vec<RecordedSubmission>, AppError> {
        let rows: Vec<SubmissionRow> = sqlx::query_as(&format!(
            "{} WHERE s.course_id = $1 ORDER BY s.student_id",
            SUBMISSION_COLUMNS
        ))
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        self.attach_answers(rows).await
    }

    async fn log_malpractice(
        &self,
        course_id: i64,
        student_id: i64,
        kind: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO malpractice_logs (student_id, course_id, kind)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(student_id)
        .bind(course_id)
        .bind(kind)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to log malpractice: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        Ok(())
    }
}
