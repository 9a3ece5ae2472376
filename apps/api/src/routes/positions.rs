//! Job postings: the new-position form, creation, and the posting view.

use axum::{
    extract::{Path, State},
    response::Response,
    Form,
};
use tracing::info;

use crate::auth::flash::FlashCategory;
use crate::auth::session::{AccountKind, Session};
use crate::errors::AppError;
use crate::models::catalog::SkillKind;
use crate::models::position::NewPosition;
use crate::routes::views::{self, NewPositionPage, Viewer};
use crate::routes::{redirect_to, render};
use crate::state::AppState;
use crate::validation::forms::PositionForm;
use crate::validation::validate_position;

/// GET /orgs/jobs/new
pub async fn new_page(
    State(state): State<AppState>,
    mut session: Session,
) -> Result<Response, AppError> {
    let Some(org_id) = session.principal_of(AccountKind::Org).map(|p| p.id) else {
        return redirect_to(session, &state, "/").await;
    };
    let org = views::load_org(&state, org_id).await?;
    let languages = state.store.list_skills(SkillKind::Language).await?;
    let frameworks = state.store.list_skills(SkillKind::Framework).await?;
    let errors = session.take_flashes(FlashCategory::Registration);
    let page = NewPositionPage {
        org,
        languages,
        frameworks,
        errors,
    };
    render(session, &state, page).await
}

/// POST /orgs/jobs/create
pub async fn create(
    State(state): State<AppState>,
    mut session: Session,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let Some(org_id) = session.principal_of(AccountKind::Org).map(|p| p.id) else {
        return redirect_to(session, &state, "/").await;
    };

    let form = PositionForm::from_pairs(&pairs);
    let validation = validate_position(&form);
    if !validation.is_valid() {
        session.flash_all(FlashCategory::Registration, validation.errors);
        return redirect_to(session, &state, "/orgs/jobs/new").await;
    }

    let pos_id = state
        .store
        .insert_position(NewPosition {
            org_id,
            name: form.pos_name,
            description: form.pos_desc,
            language_ids: form.language_ids,
            framework_ids: form.framework_ids,
        })
        .await?;

    info!("Organization {org_id} posted position {pos_id}");
    redirect_to(session, &state, "/orgs/dashboard").await
}

/// GET /orgs/jobs/:id
pub async fn view(
    State(state): State<AppState>,
    session: Session,
    Path(pos_id): Path<i32>,
) -> Result<Response, AppError> {
    let Some((viewer_id, kind)) = session.principal().map(|p| (p.id, p.kind)) else {
        return redirect_to(session, &state, "/").await;
    };
    let viewer = match kind {
        AccountKind::Dev => Viewer::Dev(views::load_dev(&state, viewer_id).await?),
        AccountKind::Org => Viewer::Org(views::load_org(&state, viewer_id).await?),
    };
    let page = views::position_view(&state, viewer, pos_id).await?;
    render(session, &state, page).await
}
