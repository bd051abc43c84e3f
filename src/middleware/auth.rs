use axum::{
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    extract::Request,
    body::Body,
};
use tower_sessions::Session;
use crate::models::SessionState;

// Paths reachable without logging in.
fn is_public(path: &str) -> bool {
    matches!(path, "/" | "/login" | "/register" | "/theme") || path.starts_with("/static/")
}

pub async fn require_auth(
    session: Session,
    req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();

    if is_public(&path) {
        return next.run(req).await;
    }

    match SessionState::load(&session).await {
        Ok(state) if state.is_authenticated() => next.run(req).await,
        Ok(_) => {
            tracing::debug!("Unauthenticated request for {}", path);
            Redirect::to("/").into_response()
        }
        Err(e) => e.into_response(),
    }
}
