// src/models/mod.rs

pub mod course;
pub mod question;
pub mod result;
pub mod submission;
