use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A job posting owned by an organization.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Position {
    pub id: i32,
    pub org_id: i32,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPosition {
    pub org_id: i32,
    pub name: String,
    pub description: String,
    pub language_ids: BTreeSet<i32>,
    pub framework_ids: BTreeSet<i32>,
}
