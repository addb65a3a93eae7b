// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{paper, results, submission},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Course routes: paper readiness and the course result sheet.
/// * Per-student exam routes: paper, submission, malpractice log, result.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let student_routes = Router::new()
        .route("/paper", post(paper::generate_paper))
        .route("/submission", post(submission::submit_exam))
        .route("/malpractice", post(submission::report_malpractice))
        .route("/result", get(results::student_result));

    let course_routes = Router::new()
        .route("/readiness", get(paper::paper_readiness))
        .route("/results", get(results::course_results))
        .nest("/students/{student_id}", student_routes);

    Router::new()
        .nest("/api/courses/{course_id}", course_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
