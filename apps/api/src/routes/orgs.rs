//! Organization registration, dashboard and public profile.

use axum::{
    extract::{Path, State},
    response::Response,
    Form,
};
use tracing::{info, warn};

use crate::auth::flash::FlashCategory;
use crate::auth::password::hash_password;
use crate::auth::session::{AccountKind, Principal, Session};
use crate::errors::AppError;
use crate::models::org::NewOrg;
use crate::routes::views::{self, RegisterPage};
use crate::routes::{redirect_to, render};
use crate::state::AppState;
use crate::validation::forms::OrgSignupForm;
use crate::validation::{validate_org_signup, MSG_EMAIL_TAKEN};

/// GET /orgs/register
pub async fn register_page(
    State(state): State<AppState>,
    mut session: Session,
) -> Result<Response, AppError> {
    if session.is_authenticated() {
        return redirect_to(session, &state, "/").await;
    }
    let states = state.store.list_states().await?;
    let errors = session.take_flashes(FlashCategory::Registration);
    render(session, &state, RegisterPage { states, errors }).await
}

/// POST /orgs/signup
pub async fn signup(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<OrgSignupForm>,
) -> Result<Response, AppError> {
    let validation = validate_org_signup(&form, state.store.as_ref()).await?;
    if !validation.is_valid() {
        session.flash_all(FlashCategory::Registration, validation.errors);
        return redirect_to(session, &state, "/orgs/register").await;
    }

    let new = NewOrg {
        org_name: form.org_name,
        rep_name: form.rep_name,
        email: form.email,
        password_hash: hash_password(&form.password).await?,
        address: form.addr_street,
        address_2: form.addr_2,
        address_city: form.addr_city,
        address_state: form.addr_state,
    };
    let name = new.org_name.clone();

    let id = match state.store.insert_org(new).await {
        Ok(id) => id,
        Err(AppError::Conflict(msg)) => {
            warn!("Organization signup lost uniqueness race: {msg}");
            session.flash(FlashCategory::Registration, MSG_EMAIL_TAKEN);
            return redirect_to(session, &state, "/orgs/register").await;
        }
        Err(e) => return Err(e),
    };

    info!("Registered organization {id}");
    session.sign_in(Principal {
        id,
        kind: AccountKind::Org,
        name,
    });
    redirect_to(session, &state, "/orgs/dashboard").await
}

/// GET /orgs/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let Some(org_id) = session.principal_of(AccountKind::Org).map(|p| p.id) else {
        return redirect_to(session, &state, "/").await;
    };
    let view = views::org_profile_view(&state, org_id, true).await?;
    render(session, &state, view).await
}

/// GET /orgs/profile/:id
pub async fn profile(
    State(state): State<AppState>,
    session: Session,
    Path(org_id): Path<i32>,
) -> Result<Response, AppError> {
    if !session.is_authenticated() {
        return redirect_to(session, &state, "/").await;
    }
    if session.principal_of(AccountKind::Org).map(|p| p.id) == Some(org_id) {
        return redirect_to(session, &state, "/orgs/dashboard").await;
    }
    let view = views::org_profile_view(&state, org_id, false).await?;
    render(session, &state, view).await
}
