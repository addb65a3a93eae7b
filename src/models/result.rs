// src/models/result.rs

use serde::Serialize;

use crate::engine::ExamResult;

/// One row of a course result sheet.
#[derive(Debug, Serialize)]
pub struct StudentResult {
    pub student_id: i64,
    pub student_name: Option<String>,
    pub register_number: Option<String>,
    #[serde(flatten)]
    pub result: ExamResult,
}
