// src/handlers/mod.rs

pub mod paper;
pub mod results;
pub mod submission;

use crate::{error::AppError, models::course::Course, store::SharedStore};

async fn load_course(store: &SharedStore, course_id: i64) -> Result<Course, AppError> {
    store
        .find_course(course_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Course {} not found", course_id)))
}
