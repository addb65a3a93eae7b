// src/models/question.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};

use crate::{
    engine::{AnswerKey, AnswerOption, CoPool, QuestionId, Weightage, parse_co_number},
    error::AppError,
};

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    pub course_id: i64,

    /// Course outcome label, conventionally "CO1".."COn".
    pub co_number: String,

    /// Cognitive level (1-6).
    pub k_level: i32,

    /// The text content of the question.
    pub content: String,

    /// The four options, stored as a JSON array in the database.
    pub options: Json<Vec<String>>,

    /// The correct option: 'option1'..'option4'.
    pub answer: String,

    /// Marks carried by the question: 1 or 2.
    pub weightage: i32,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for sending question to client (excludes answer).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub co_number: String,
    pub k_level: i32,
    pub content: String,
    pub options: Json<Vec<String>>,
    pub weightage: i32,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        PublicQuestion {
            id: q.id,
            co_number: q.co_number,
            k_level: q.k_level,
            content: q.content,
            options: q.options,
            weightage: q.weightage,
        }
    }
}

impl Question {
    pub fn weightage(&self) -> Result<Weightage, AppError> {
        Weightage::try_from(self.weightage).map_err(|e| {
            AppError::InternalServerError(format!("question {}: {}", self.id, e))
        })
    }

    /// Engine view of the question: `(id, CO index, weightage)`.
    pub fn pool_entry(&self) -> Result<(QuestionId, Option<u32>, Weightage), AppError> {
        Ok((self.id, parse_co_number(&self.co_number), self.weightage()?))
    }

    pub fn answer_key(&self) -> Result<AnswerKey, AppError> {
        let correct_option: AnswerOption = self.answer.parse().map_err(|e| {
            AppError::InternalServerError(format!("question {}: {}", self.id, e))
        })?;

        Ok(AnswerKey {
            co: parse_co_number(&self.co_number),
            weightage: self.weightage()?,
            correct_option,
        })
    }
}

/// DTO for returning an assembled paper.
#[derive(Debug, Serialize)]
pub struct PaperResponse {
    /// Weightage 1 questions.
    pub phase1: Vec<PublicQuestion>,
    /// Weightage 2 questions.
    pub phase2: Vec<PublicQuestion>,
}

/// Splits a question bank into per-CO pools for the assembler.
pub fn co_pools(co_count: u32, questions: &[Question]) -> Result<Vec<CoPool>, AppError> {
    let entries = questions
        .iter()
        .map(Question::pool_entry)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CoPool::partition(co_count, entries))
}

/// Builds the answer key lookup for a whole question bank.
pub fn answer_keys(questions: &[Question]) -> Result<HashMap<QuestionId, AnswerKey>, AppError> {
    questions
        .iter()
        .map(|q| q.answer_key().map(|key| (q.id, key)))
        .collect()
}
