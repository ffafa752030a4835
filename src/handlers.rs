use crate::errors::AppError;
use crate::models::{Mood, ViewResponse};
use crate::state::AppState;
use crate::ui::render_index;
use crate::view_model::Command;
use axum::{
    Form, Json,
    extract::{Path, State},
    response::{Html, Redirect},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SignInForm {
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckInForm {
    pub mood: Option<String>,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmForm {
    pub answer: String,
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(&state.view.snapshot()))
}

pub async fn get_state(State(state): State<AppState>) -> Json<ViewResponse> {
    Json(state.view.snapshot().to_response())
}

pub async fn command(
    State(state): State<AppState>,
    Json(command): Json<Command>,
) -> Result<Json<ViewResponse>, AppError> {
    let view = state.view.dispatch(command).await?;
    Ok(Json(view.to_response()))
}

pub async fn sign_in(
    State(state): State<AppState>,
    Form(form): Form<SignInForm>,
) -> Result<Redirect, AppError> {
    state
        .view
        .dispatch(Command::SignIn {
            display_name: form.display_name,
        })
        .await?;
    Ok(Redirect::to("/"))
}

pub async fn sign_out(State(state): State<AppState>) -> Result<Redirect, AppError> {
    state.view.dispatch(Command::SignOut).await?;
    Ok(Redirect::to("/"))
}

pub async fn check_in(
    State(state): State<AppState>,
    Form(form): Form<CheckInForm>,
) -> Result<Redirect, AppError> {
    let mood = form
        .mood
        .as_deref()
        .filter(|token| !token.trim().is_empty())
        .map(str::parse::<Mood>)
        .transpose()?;

    state
        .view
        .dispatch(Command::CheckIn {
            mood,
            note: form.note,
        })
        .await?;
    Ok(Redirect::to("/"))
}

pub async fn request_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    state.view.dispatch(Command::RequestDelete { id }).await?;
    Ok(Redirect::to("/"))
}

pub async fn confirm_delete(
    State(state): State<AppState>,
    Form(form): Form<ConfirmForm>,
) -> Result<Redirect, AppError> {
    let confirmed = match form.answer.trim() {
        "yes" => true,
        "no" => false,
        _ => return Err(AppError::bad_request("answer must be 'yes' or 'no'")),
    };
    state
        .view
        .dispatch(Command::ConfirmDelete { confirmed })
        .await?;
    Ok(Redirect::to("/"))
}

pub async fn dismiss_notice(State(state): State<AppState>) -> Result<Redirect, AppError> {
    state.view.dispatch(Command::DismissNotice).await?;
    Ok(Redirect::to("/"))
}
