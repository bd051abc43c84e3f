use axum::{
    extract::{Form, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use crate::errors::{AppError, AppResult};
use crate::models::{AuthOutcome, LoginForm, PageQuery, RegisterForm, SessionState, ThemeForm, View};
use crate::services::presentation::theme_url;
use crate::state::AppState;
use super::render::{messages, redirect_with, render_template, theme_picker, theme_style};

/// Renders whichever pre-login view the session is on.
pub async fn serve_index(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let session_state = SessionState::load(&session).await?;
    if session_state.is_authenticated() {
        return Ok(Redirect::to("/tasks").into_response());
    }

    let template = match session_state.view {
        View::Register => "register.html",
        View::Login | View::MainApp => "login.html",
    };

    let page = render_template(&state.config, template, &[
        ("theme_style", theme_style(&session_state)),
        ("theme_picker", theme_picker(&session_state)),
        ("messages", messages(&query)),
    ])?;
    Ok(page.into_response())
}

pub async fn show_register(session: Session) -> AppResult<Response> {
    SessionState::load(&session).await?.show_register().save(&session).await?;
    Ok(Redirect::to("/").into_response())
}

pub async fn show_login(session: Session) -> AppResult<Response> {
    SessionState::load(&session).await?.show_login().save(&session).await?;
    Ok(Redirect::to("/").into_response())
}

pub async fn handle_register(
    State(state): State<AppState>,
    session: Session,
    Form(register_form): Form<RegisterForm>,
) -> AppResult<Response> {
    tracing::info!("Registration attempt for user: {}", register_form.username);

    match state.credentials.register(&register_form) {
        Ok(user) => {
            tracing::info!("Registered user: {}", user.username);
            SessionState::load(&session).await?.show_login().save(&session).await?;
            Ok(redirect_with("/", "notice", "Registered! Please log in."))
        }
        Err(AppError::Validation(msg)) => {
            tracing::info!("Registration rejected for {}: {}", register_form.username, msg);
            Ok(redirect_with("/", "error", &msg))
        }
        Err(e) => Err(e),
    }
}

pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    Form(login_form): Form<LoginForm>,
) -> AppResult<Response> {
    tracing::info!("Login attempt for user: {}", login_form.username);

    match state.credentials.authenticate(&login_form.username, &login_form.password)? {
        AuthOutcome::Success(username) => {
            SessionState::load(&session).await?.log_in(username).save(&session).await?;
            Ok(Redirect::to("/tasks").into_response())
        }
        AuthOutcome::WrongPassword => Ok(redirect_with("/", "error", "Wrong password.")),
        AuthOutcome::UserNotFound => Ok(redirect_with("/", "error", "User not found.")),
    }
}

pub async fn handle_logout(session: Session) -> AppResult<Response> {
    let session_state = SessionState::load(&session).await?;
    if let Some(username) = &session_state.username {
        tracing::info!("User {} logged out", username);
    }
    session_state.log_out().save(&session).await?;
    Ok(Redirect::to("/").into_response())
}

pub async fn set_theme(
    session: Session,
    Form(theme_form): Form<ThemeForm>,
) -> AppResult<Response> {
    if theme_url(&theme_form.theme).is_none() {
        return Err(AppError::Validation(format!("Unknown theme: {}", theme_form.theme)));
    }

    let session_state = SessionState::load(&session).await?.with_theme(theme_form.theme);
    let target = if session_state.is_authenticated() { "/tasks" } else { "/" };
    session_state.save(&session).await?;
    Ok(Redirect::to(target).into_response())
}
