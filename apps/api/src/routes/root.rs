use axum::{extract::State, response::Response};

use crate::auth::session::{AccountKind, Session};
use crate::errors::AppError;
use crate::routes::redirect_to;
use crate::state::AppState;

/// GET /
/// Sends each visitor to their dashboard, or to developer registration.
pub async fn index(State(state): State<AppState>, session: Session) -> Result<Response, AppError> {
    let to = match session.principal().map(|p| p.kind) {
        Some(AccountKind::Dev) => "/devs/dashboard",
        Some(AccountKind::Org) => "/orgs/dashboard",
        None => "/devs/register",
    };
    redirect_to(session, &state, to).await
}
