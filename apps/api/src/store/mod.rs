//! Repository seam over the relational store.
//!
//! `AppState` carries an `Arc<dyn Store>`: `PgStore` in production, the
//! in-memory double under test. Skill associations are explicit operations
//! here rather than lazily loaded relationship collections.

pub mod postgres;

#[cfg(test)]
pub mod memory;

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::catalog::{Skill, SkillKind, State};
use crate::models::dev::{Dev, DevProfileUpdate, NewDev};
use crate::models::org::{NewOrg, Org};
use crate::models::position::{NewPosition, Position};

pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    // ── developers ──────────────────────────────────────────────────────────

    /// Returns `AppError::Conflict` when the email is already registered.
    async fn insert_dev(&self, new: NewDev) -> Result<i32, AppError>;
    async fn find_dev(&self, id: i32) -> Result<Option<Dev>, AppError>;
    async fn find_dev_by_email(&self, email: &str) -> Result<Option<Dev>, AppError>;
    async fn update_dev_profile(&self, id: i32, update: DevProfileUpdate) -> Result<(), AppError>;
    async fn list_devs(&self) -> Result<Vec<Dev>, AppError>;

    // ── organizations ───────────────────────────────────────────────────────

    /// Returns `AppError::Conflict` when the email is already registered.
    async fn insert_org(&self, new: NewOrg) -> Result<i32, AppError>;
    async fn find_org(&self, id: i32) -> Result<Option<Org>, AppError>;
    async fn find_org_by_email(&self, email: &str) -> Result<Option<Org>, AppError>;

    // ── positions ───────────────────────────────────────────────────────────

    /// Inserts the position and its skill links as one unit.
    async fn insert_position(&self, new: NewPosition) -> Result<i32, AppError>;
    async fn find_position(&self, id: i32) -> Result<Option<Position>, AppError>;
    async fn list_positions(&self) -> Result<Vec<Position>, AppError>;
    /// Positions owned by `org_id`, oldest first.
    async fn list_positions_for_org(&self, org_id: i32) -> Result<Vec<Position>, AppError>;

    // ── catalog ─────────────────────────────────────────────────────────────

    async fn list_skills(&self, kind: SkillKind) -> Result<Vec<Skill>, AppError>;
    async fn list_states(&self) -> Result<Vec<State>, AppError>;
    async fn find_state(&self, id: i32) -> Result<Option<State>, AppError>;
    /// Looks a state up by abbreviation or name, ignoring case.
    async fn find_state_by_code(&self, code: &str) -> Result<Option<State>, AppError>;

    // ── skill associations ──────────────────────────────────────────────────

    async fn dev_skills(&self, dev_id: i32, kind: SkillKind) -> Result<Vec<Skill>, AppError>;
    async fn position_skills(&self, pos_id: i32, kind: SkillKind)
        -> Result<Vec<Skill>, AppError>;
    /// Clears every `kind` association of the developer, then links `ids`.
    /// Ids with no catalog row are dropped.
    async fn replace_dev_skills(
        &self,
        dev_id: i32,
        kind: SkillKind,
        ids: &BTreeSet<i32>,
    ) -> Result<(), AppError>;
    /// First skill-editor page: stores `bio` when given and replaces the
    /// language set, committing both together.
    async fn update_dev_languages(
        &self,
        dev_id: i32,
        bio: Option<&str>,
        ids: &BTreeSet<i32>,
    ) -> Result<(), AppError>;
}
