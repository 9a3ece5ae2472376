//! View models handed to the page renderer, serialized as JSON.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::errors::AppError;
use crate::models::catalog::{skill_ids, Skill, SkillKind, State};
use crate::models::dev::Dev;
use crate::models::org::Org;
use crate::models::position::Position;
use crate::state::AppState;

/// Registration form: state picker plus queued `reg_error` flashes.
#[derive(Debug, Serialize)]
pub struct RegisterPage {
    pub states: Vec<State>,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginPage {
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DevProfileView {
    pub dev: Dev,
    pub languages: Vec<Skill>,
    pub frameworks: Vec<Skill>,
    pub state_abbrev: String,
    /// Every open position; only on the developer's own dashboard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<Vec<Position>>,
}

#[derive(Debug, Serialize)]
pub struct OrgProfileView {
    pub org: Org,
    pub positions: Vec<Position>,
    /// Every registered developer; only on the org's own dashboard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devs: Option<Vec<Dev>>,
}

#[derive(Debug, Serialize)]
pub struct DevEditPage {
    pub dev: Dev,
    pub state_abbrev: String,
    pub states: Vec<State>,
    pub errors: Vec<String>,
}

/// One page of the skill editor.
#[derive(Debug, Serialize)]
pub struct SkillsPage {
    pub dev: Dev,
    pub kind: SkillKind,
    pub options: Vec<Skill>,
    pub selected: Vec<Skill>,
    pub selected_ids: BTreeSet<i32>,
}

#[derive(Debug, Serialize)]
pub struct NewPositionPage {
    pub org: Org,
    pub languages: Vec<Skill>,
    pub frameworks: Vec<Skill>,
    pub errors: Vec<String>,
}

/// Whoever is looking at a job posting.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Viewer {
    Dev(Dev),
    Org(Org),
}

#[derive(Debug, Serialize)]
pub struct PositionView {
    pub viewer: Viewer,
    pub position: Position,
    pub org: Org,
    pub languages: Vec<Skill>,
    pub frameworks: Vec<Skill>,
}

pub async fn load_dev(state: &AppState, id: i32) -> Result<Dev, AppError> {
    state
        .store
        .find_dev(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Developer {id} not found")))
}

pub async fn load_org(state: &AppState, id: i32) -> Result<Org, AppError> {
    state
        .store
        .find_org(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Organization {id} not found")))
}

async fn state_abbrev(state: &AppState, dev: &Dev) -> Result<String, AppError> {
    Ok(state
        .store
        .find_state(dev.address_state)
        .await?
        .map(|s| s.abbrev)
        .unwrap_or_default())
}

pub async fn dev_profile_view(
    state: &AppState,
    dev_id: i32,
    with_jobs: bool,
) -> Result<DevProfileView, AppError> {
    let dev = load_dev(state, dev_id).await?;
    let languages = state.store.dev_skills(dev.id, SkillKind::Language).await?;
    let frameworks = state.store.dev_skills(dev.id, SkillKind::Framework).await?;
    let state_abbrev = state_abbrev(state, &dev).await?;
    let jobs = if with_jobs {
        Some(state.store.list_positions().await?)
    } else {
        None
    };
    Ok(DevProfileView {
        dev,
        languages,
        frameworks,
        state_abbrev,
        jobs,
    })
}

pub async fn org_profile_view(
    state: &AppState,
    org_id: i32,
    with_devs: bool,
) -> Result<OrgProfileView, AppError> {
    let org = load_org(state, org_id).await?;
    let positions = state.store.list_positions_for_org(org.id).await?;
    let devs = if with_devs {
        Some(state.store.list_devs().await?)
    } else {
        None
    };
    Ok(OrgProfileView {
        org,
        positions,
        devs,
    })
}

pub async fn dev_edit_page(
    state: &AppState,
    dev_id: i32,
    errors: Vec<String>,
) -> Result<DevEditPage, AppError> {
    let dev = load_dev(state, dev_id).await?;
    let state_abbrev = state_abbrev(state, &dev).await?;
    let states = state.store.list_states().await?;
    Ok(DevEditPage {
        dev,
        state_abbrev,
        states,
        errors,
    })
}

pub async fn skills_page(
    state: &AppState,
    dev_id: i32,
    kind: SkillKind,
) -> Result<SkillsPage, AppError> {
    let dev = load_dev(state, dev_id).await?;
    let options = state.store.list_skills(kind).await?;
    let selected = state.store.dev_skills(dev.id, kind).await?;
    let selected_ids = skill_ids(&selected);
    Ok(SkillsPage {
        dev,
        kind,
        options,
        selected,
        selected_ids,
    })
}

pub async fn position_view(
    state: &AppState,
    viewer: Viewer,
    pos_id: i32,
) -> Result<PositionView, AppError> {
    let position = state
        .store
        .find_position(pos_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Position {pos_id} not found")))?;
    let org = load_org(state, position.org_id).await?;
    let languages = state
        .store
        .position_skills(position.id, SkillKind::Language)
        .await?;
    let frameworks = state
        .store
        .position_skills(position.id, SkillKind::Framework)
        .await?;
    Ok(PositionView {
        viewer,
        position,
        org,
        languages,
        frameworks,
    })
}
