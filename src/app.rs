use crate::handlers;
use crate::state::AppState;
use axum::{Router, routing::{get, post}};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/session/sign-in", post(handlers::sign_in))
        .route("/session/sign-out", post(handlers::sign_out))
        .route("/entries", post(handlers::check_in))
        .route("/entries/:id/delete", post(handlers::request_delete))
        .route("/delete/confirm", post(handlers::confirm_delete))
        .route("/notice/dismiss", post(handlers::dismiss_notice))
        .route("/api/state", get(handlers::get_state))
        .route("/api/command", post(handlers::command))
        .with_state(state)
}
