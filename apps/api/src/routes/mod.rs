pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;
use crate::ui;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Presentation layer
        .route("/", get(ui::handle_index))
        .route("/process", post(ui::handle_process))
        // JSON API
        .route("/api/v1/analyze", post(handlers::handle_analyze))
        .route("/api/v1/generate/rating", post(handlers::handle_rating))
        .route(
            "/api/v1/generate/cover-letter",
            post(handlers::handle_cover_letter),
        )
        .route(
            "/api/v1/generate/questions/employer",
            post(handlers::handle_employer_questions),
        )
        .route(
            "/api/v1/generate/questions/employee",
            post(handlers::handle_employee_questions),
        )
        .route(
            "/api/v1/generate/questions/job",
            post(handlers::handle_job_questions),
        )
        .layer(body_limit)
        .with_state(state)
}
