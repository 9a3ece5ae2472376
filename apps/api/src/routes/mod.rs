pub mod devs;
pub mod health;
pub mod orgs;
pub mod positions;
pub mod root;
pub mod session;
pub mod views;


use axum::{
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::auth::session::Session;
use crate::errors::AppError;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/", get(root::index))
        .route("/logout", get(session::logout))
        // Developers
        .route("/devs/register", get(devs::register_page))
        .route("/devs/signup", post(devs::signup))
        .route("/devs/login", get(session::dev_login_page))
        .route("/devs/validate/login", post(session::dev_login))
        .route("/devs/dashboard", get(devs::dashboard))
        .route("/devs/profile/edit", get(devs::edit_page))
        .route("/devs/profile/edit/update", post(devs::update_profile))
        .route("/devs/profile/:id", get(devs::profile))
        .route("/devs/skills/languages", get(devs::languages_page))
        .route("/devs/skills/frameworks", get(devs::frameworks_page))
        .route("/devs/update_skills", post(devs::update_skills))
        // Organizations
        .route("/orgs/register", get(orgs::register_page))
        .route("/orgs/signup", post(orgs::signup))
        .route("/orgs/login", get(session::org_login_page))
        .route("/orgs/validate/login", post(session::org_login))
        .route("/orgs/dashboard", get(orgs::dashboard))
        .route("/orgs/profile/:id", get(orgs::profile))
        // Positions
        .route("/orgs/jobs/new", get(positions::new_page))
        .route("/orgs/jobs/create", post(positions::create))
        .route("/orgs/jobs/:id", get(positions::view))
        .with_state(state)
}

/// Persists the session, then redirects.
pub(crate) async fn redirect_to(
    session: Session,
    state: &AppState,
    to: &str,
) -> Result<Response, AppError> {
    let headers = session.finish(state).await?;
    Ok((headers, Redirect::to(to)).into_response())
}

/// Persists the session (flashes consumed by the page), then renders `view`.
pub(crate) async fn render<T: Serialize>(
    session: Session,
    state: &AppState,
    view: T,
) -> Result<Response, AppError> {
    let headers = session.finish(state).await?;
    Ok((headers, Json(view)).into_response())
}
