//! Login forms, credential checks and logout.

use axum::{extract::State, response::Response, Form};
use tracing::{info, warn};

use crate::auth::flash::FlashCategory;
use crate::auth::password::verify_password;
use crate::auth::session::{AccountKind, Principal, Session};
use crate::errors::AppError;
use crate::routes::views::LoginPage;
use crate::routes::{redirect_to, render};
use crate::state::AppState;
use crate::validation::forms::LoginForm;

pub const MSG_BAD_PASSWORD: &str = "Password incorrect! Please try again.";
pub const MSG_UNKNOWN_EMAIL: &str = "Email not recognized";

/// Stored credentials for the account an email resolves to.
struct Credentials {
    id: i32,
    name: String,
    password_hash: String,
}

async fn lookup(
    state: &AppState,
    kind: AccountKind,
    email: &str,
) -> Result<Option<Credentials>, AppError> {
    Ok(match kind {
        AccountKind::Dev => state
            .store
            .find_dev_by_email(email)
            .await?
            .map(|dev| Credentials {
                id: dev.id,
                name: dev.display_name(),
                password_hash: dev.password_hash,
            }),
        AccountKind::Org => state
            .store
            .find_org_by_email(email)
            .await?
            .map(|org| Credentials {
                id: org.id,
                name: org.org_name,
                password_hash: org.password_hash,
            }),
    })
}

async fn login_page(state: AppState, mut session: Session) -> Result<Response, AppError> {
    if session.is_authenticated() {
        return redirect_to(session, &state, "/").await;
    }
    let errors = session.take_flashes(FlashCategory::Login);
    render(session, &state, LoginPage { errors }).await
}

async fn login(
    state: AppState,
    mut session: Session,
    kind: AccountKind,
    form: LoginForm,
) -> Result<Response, AppError> {
    let (dashboard, login_form) = match kind {
        AccountKind::Dev => ("/devs/dashboard", "/devs/login"),
        AccountKind::Org => ("/orgs/dashboard", "/orgs/login"),
    };

    let Some(creds) = lookup(&state, kind, &form.email).await? else {
        session.flash(FlashCategory::Login, MSG_UNKNOWN_EMAIL);
        return redirect_to(session, &state, login_form).await;
    };

    if !verify_password(&form.password, &creds.password_hash).await? {
        warn!("Rejected password for {} {}", kind.as_str(), creds.id);
        session.flash(FlashCategory::Login, MSG_BAD_PASSWORD);
        return redirect_to(session, &state, login_form).await;
    }

    info!("{} {} signed in", kind.as_str(), creds.id);
    session.sign_in(Principal {
        id: creds.id,
        kind,
        name: creds.name,
    });
    redirect_to(session, &state, dashboard).await
}

/// GET /devs/login
pub async fn dev_login_page(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    login_page(state, session).await
}

/// GET /orgs/login
pub async fn org_login_page(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    login_page(state, session).await
}

/// POST /devs/validate/login
pub async fn dev_login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    login(state, session, AccountKind::Dev, form).await
}

/// POST /orgs/validate/login
pub async fn org_login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    login(state, session, AccountKind::Org, form).await
}

/// GET /logout
pub async fn logout(
    State(state): State<AppState>,
    mut session: Session,
) -> Result<Response, AppError> {
    session.clear();
    redirect_to(session, &state, "/").await
}
