// tests/common/mod.rs

#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use exam_portal::{
    config::Config,
    engine::{AnswerEntry, PaperSelection},
    error::AppError,
    models::{course::Course, question::Question, submission::RecordedSubmission},
    routes,
    state::AppState,
    store::ExamStore,
};
use sqlx::types::Json;

struct StoredSubmission {
    course_id: i64,
    student_id: i64,
    malpractice: bool,
    answers: Vec<AnswerEntry>,
}

#[derive(Default)]
struct Inner {
    courses: HashMap<i64, Course>,
    questions: Vec<Question>,
    students: HashMap<i64, (String, String)>,
    papers: HashMap<(i64, i64), PaperSelection>,
    submissions: Vec<StoredSubmission>,
    malpractice_logs: Vec<(i64, i64, String)>,
}

/// In-memory `ExamStore` so the HTTP flows run without a database.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn add_course(
        &self,
        id: i64,
        co_count: i32,
        exam_marks: Option<i32>,
        exam_question_count: Option<i32>,
    ) {
        self.inner.lock().unwrap().courses.insert(
            id,
            Course {
                id,
                name: format!("Course {}", id),
                co_count,
                exam_marks,
                exam_question_count,
            },
        );
    }

    pub fn add_question(&self, id: i64, course_id: i64, co_number: &str, weightage: i32, answer: &str) {
        self.inner.lock().unwrap().questions.push(Question {
            id,
            course_id,
            co_number: co_number.to_string(),
            k_level: 2,
            content: format!("Question {}", id),
            options: Json(vec![
                "A".to_string(),
                "B".to_string(),
                "C".to_string(),
                "D".to_string(),
            ]),
            answer: answer.to_string(),
            weightage,
            created_at: None,
        });
    }

    pub fn add_student(&self, id: i64, name: &str, register_no: &str) {
        self.inner
            .lock()
            .unwrap()
            .students
            .insert(id, (name.to_string(), register_no.to_string()));
    }

    /// Reassigns a question to another course, as the admin layer may do.
    pub fn move_question(&self, id: i64, course_id: i64) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(q) = inner.questions.iter_mut().find(|q| q.id == id) {
            q.course_id = course_id;
        }
    }

    pub fn malpractice_logs(&self) -> Vec<(i64, i64, String)> {
        self.inner.lock().unwrap().malpractice_logs.clone()
    }

    pub fn submission_count(&self) -> usize {
        self.inner.lock().unwrap().submissions.len()
    }

    fn recorded(inner: &Inner, s: &StoredSubmission) -> RecordedSubmission {
        let student = inner.students.get(&s.student_id);
        RecordedSubmission {
            student_id: s.student_id,
            student_name: student.map(|(name, _)| name.clone()),
            register_number: student.map(|(_, reg)| reg.clone()),
            malpractice: s.malpractice,
            answers: s.answers.clone(),
        }
    }
}

#[async_trait]
impl ExamStore for MemoryStore {
    async fn find_course(&self, course_id: i64) -> Result<Option<Course>, AppError> {
        Ok(self.inner.lock().unwrap().courses.get(&course_id).cloned())
    }

    async fn course_questions(&self, course_id: i64) -> Result<Vec<Question>, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .questions
            .iter()
            .filter(|q| q.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn find_paper(
        &self,
        course_id: i64,
        student_id: i64,
    ) -> Result<Option<PaperSelection>, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .papers
            .get(&(course_id, student_id))
            .cloned())
    }

    async fn save_paper(
        &self,
        course_id: i64,
        student_id: i64,
        paper: &PaperSelection,
    ) -> Result<PaperSelection, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .papers
            .entry((course_id, student_id))
            .or_insert_with(|| paper.clone())
            .clone())
    }

    async fn has_submission(&self, course_id: i64, student_id: i64) -> Result<bool, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .submissions
            .iter()
            .any(|s| s.course_id == course_id && s.student_id == student_id))
    }

    async fn record_submission(
        &self,
        course_id: i64,
        student_id: i64,
        answers: &[AnswerEntry],
        malpractice: bool,
    ) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .submissions
            .iter()
            .any(|s| s.course_id == course_id && s.student_id == student_id)
        {
            return Err(AppError::Conflict(
                "Exam already submitted for this course".to_string(),
            ));
        }
        inner.submissions.push(StoredSubmission {
            course_id,
            student_id,
            malpractice,
            answers: answers.to_vec(),
        });
        Ok(())
    }

    async fn find_submission(
        &self,
        course_id: i64,
        student_id: i64,
    ) -> Result<Option<RecordedSubmission>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .submissions
            .iter()
            .find(|s| s.course_id == course_id && s.student_id == student_id)
            .map(|s| Self::recorded(&inner, s)))
    }

    async fn course_submissions(
        &self,
        course_id: i64,
    ) -> Result<Vec<RecordedSubmission>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<RecordedSubmission> = inner
            .submissions
            .iter()
            .filter(|s| s.course_id == course_id)
            .map(|s| Self::recorded(&inner, s))
            .collect();
        rows.sort_by_key(|r| r.student_id);
        Ok(rows)
    }

    async fn log_malpractice(
        &self,
        course_id: i64,
        student_id: i64,
        kind: &str,
    ) -> Result<(), AppError> {
        self.inner
            .lock()
            .unwrap()
            .malpractice_logs
            .push((student_id, course_id, kind.to_string()));
        Ok(())
    }
}

/// Spawns the app on a random port backed by `store`.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
pub async fn spawn_app(store: Arc<MemoryStore>) -> String {
    let config = Config {
        database_url: "postgres://unused".to_string(),
        rust_log: "error".to_string(),
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        log_dir: "logs".to_string(),
        cors_origins: vec!["http://localhost:3000".to_string()],
    };

    let state = AppState { store, config };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

/// Requests the student's paper and returns `(phase1 ids, phase2 ids)`.
pub async fn fetch_paper(address: &str, course_id: i64, student_id: i64) -> (Vec<i64>, Vec<i64>) {
    let paper: serde_json::Value = reqwest::Client::new()
        .post(&format!(
            "{}/api/courses/{}/students/{}/paper",
            address, course_id, student_id
        ))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Paper response is not JSON");

    let ids = |phase: &serde_json::Value| -> Vec<i64> {
        phase
            .as_array()
            .expect("phase must be an array")
            .iter()
            .map(|q| q["id"].as_i64().unwrap())
            .collect()
    };
    (ids(&paper["phase1"]), ids(&paper["phase2"]))
}

/// Course 1: 10 marks over 6 questions, two COs.
///
/// CO1: q11 (1 mark), q12 and q13 (2 marks). CO2: q21 (1 mark), q22 and q23 (2 marks).
/// Every correct answer is "option1".
pub fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::default());
    store.add_course(1, 2, Some(10), Some(6));
    store.add_question(11, 1, "CO1", 1, "option1");
    store.add_question(12, 1, "CO1", 2, "option1");
    store.add_question(13, 1, "CO1", 2, "option1");
    store.add_question(21, 1, "CO2", 1, "option1");
    store.add_question(22, 1, "CO2", 2, "option1");
    store.add_question(23, 1, "CO2", 2, "option1");
    store
}
