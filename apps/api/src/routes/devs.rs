//! Developer registration, dashboard, profile editing and the two-page skill
//! editor.

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
use crate::models::catalog::SkillKind;
use crate::models::dev::{DevProfileUpdate, NewDev};
use crate::routes::views::{self, RegisterPage};
use crate::routes::{redirect_to, render};
use crate::state::AppState;
use crate::validation::forms::{DevProfileForm, DevSignupForm, SkillsSubmission};
use crate::validation::{validate_dev_signup, validate_dev_update, MSG_EMAIL_TAKEN};

/// GET /devs/register
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

/// POST /devs/signup
pub async fn signup(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<DevSignupForm>,
) -> Result<Response, AppError> {
    let (validation, resolved) = validate_dev_signup(&form, state.store.as_ref()).await?;
    let Some(addr_state) = resolved.filter(|_| validation.is_valid()) else {
        session.flash_all(FlashCategory::Registration, validation.errors);
        return redirect_to(session, &state, "/devs/register").await;
    };

    let new = NewDev {
        first_name: form.fname,
        last_name: form.lname,
        email: form.email,
        password_hash: hash_password(&form.password).await?,
        address: form.addr_street,
        address_2: form.addr_2,
        address_city: form.addr_city,
        address_state: addr_state.id,
    };
    let name = format!("{} {}", new.first_name, new.last_name);

    let id = match state.store.insert_dev(new).await {
        Ok(id) => id,
        Err(AppError::Conflict(msg)) => {
            warn!("Developer signup lost uniqueness race: {msg}");
            session.flash(FlashCategory::Registration, MSG_EMAIL_TAKEN);
            return redirect_to(session, &state, "/devs/register").await;
        }
        Err(e) => return Err(e),
    };

    info!("Registered developer {id}");
    session.sign_in(Principal {
        id,
        kind: AccountKind::Dev,
        name,
    });
    redirect_to(session, &state, "/devs/skills/languages").await
}

/// GET /devs/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let Some(dev_id) = session.principal_of(AccountKind::Dev).map(|p| p.id) else {
        return redirect_to(session, &state, "/").await;
    };
    let view = views::dev_profile_view(&state, dev_id, true).await?;
    render(session, &state, view).await
}

/// GET /devs/profile/:id
pub async fn profile(
    State(state): State<AppState>,
    session: Session,
    Path(dev_id): Path<i32>,
) -> Result<Response, AppError> {
    if !session.is_authenticated() {
        return redirect_to(session, &state, "/").await;
    }
    let view = views::dev_profile_view(&state, dev_id, false).await?;
    render(session, &state, view).await
}

/// GET /devs/profile/edit
pub async fn edit_page(
    State(state): State<AppState>,
    mut session: Session,
) -> Result<Response, AppError> {
    let Some(dev_id) = session.principal_of(AccountKind::Dev).map(|p| p.id) else {
        return redirect_to(session, &state, "/").await;
    };
    let errors = session.take_flashes(FlashCategory::Registration);
    let page = views::dev_edit_page(&state, dev_id, errors).await?;
    render(session, &state, page).await
}

/// POST /devs/profile/edit/update
pub async fn update_profile(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<DevProfileForm>,
) -> Result<Response, AppError> {
    let Some(dev_id) = session.principal_of(AccountKind::Dev).map(|p| p.id) else {
        return redirect_to(session, &state, "/").await;
    };
    let current = views::load_dev(&state, dev_id).await?;

    let (validation, resolved) =
        validate_dev_update(&form, &current.email, state.store.as_ref()).await?;
    let Some(addr_state) = resolved.filter(|_| validation.is_valid()) else {
        session.flash_all(FlashCategory::Registration, validation.errors);
        return redirect_to(session, &state, "/devs/profile/edit").await;
    };

    let update = DevProfileUpdate {
        first_name: form.fname,
        last_name: form.lname,
        email: form.email,
        address: form.addr_street,
        address_2: form.addr_2,
        address_city: form.addr_city,
        address_state: addr_state.id,
    };
    let name = format!("{} {}", update.first_name, update.last_name);

    match state.store.update_dev_profile(dev_id, update).await {
        Ok(()) => {}
        Err(AppError::Conflict(msg)) => {
            warn!("Developer {dev_id} profile update lost uniqueness race: {msg}");
            session.flash(FlashCategory::Registration, MSG_EMAIL_TAKEN);
            return redirect_to(session, &state, "/devs/profile/edit").await;
        }
        Err(e) => return Err(e),
    }

    info!("Developer {dev_id} updated their profile");
    session.set_display_name(name);
    redirect_to(session, &state, "/devs/dashboard").await
}

/// GET /devs/skills/languages
pub async fn languages_page(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let Some(dev_id) = session.principal_of(AccountKind::Dev).map(|p| p.id) else {
        return redirect_to(session, &state, "/").await;
    };
    let page = views::skills_page(&state, dev_id, SkillKind::Language).await?;
    render(session, &state, page).await
}

/// GET /devs/skills/frameworks
pub async fn frameworks_page(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let Some(dev_id) = session.principal_of(AccountKind::Dev).map(|p| p.id) else {
        return redirect_to(session, &state, "/").await;
    };
    let page = views::skills_page(&state, dev_id, SkillKind::Framework).await?;
    render(session, &state, page).await
}

/// POST /devs/update_skills
///
/// Page one (bio and languages) replaces the language set and moves on to
/// page two; page two replaces the framework set and finishes on the
/// dashboard. Each submitted list replaces the stored set wholesale.
pub async fn update_skills(
    State(state): State<AppState>,
    session: Session,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let Some(dev_id) = session.principal_of(AccountKind::Dev).map(|p| p.id) else {
        return redirect_to(session, &state, "/").await;
    };

    match SkillsSubmission::from_pairs(&pairs) {
        SkillsSubmission::Languages { bio, ids } => {
            state
                .store
                .update_dev_languages(dev_id, bio.as_deref(), &ids)
                .await?;
            info!("Developer {dev_id} set {} languages", ids.len());
            redirect_to(session, &state, "/devs/skills/frameworks").await
        }
        SkillsSubmission::Frameworks { ids } => {
            state
                .store
                .replace_dev_skills(dev_id, SkillKind::Framework, &ids)
                .await?;
            info!("Developer {dev_id} set {} frameworks", ids.len());
            redirect_to(session, &state, "/devs/dashboard").await
        }
        SkillsSubmission::Empty => redirect_to(session, &state, "/").await,
    }
}
