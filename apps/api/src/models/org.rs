use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Org {
    pub id: i32,
    pub org_name: String,
    pub rep_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub address: String,
    pub address_2: String,
    pub address_city: String,
    pub address_state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrg {
    pub org_name: String,
    pub rep_name: String,
    pub email: String,
    pub password_hash: String,
    pub address: String,
    pub address_2: String,
    pub address_city: String,
    pub address_state: String,
}
