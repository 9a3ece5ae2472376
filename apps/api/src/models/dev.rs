use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Dev {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub address: String,
    pub address_2: String,
    pub address_city: String,
    /// References `states.id`.
    pub address_state: i32,
    pub profile_bio: String,
    pub status: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Dev {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Status assigned to freshly registered developers.
pub const DEV_STATUS_ACTIVE: i32 = 1;

#[derive(Debug, Clone)]
pub struct NewDev {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub address: String,
    pub address_2: String,
    pub address_city: String,
    pub address_state: i32,
}

/// Fields a developer may change from the profile editor.
#[derive(Debug, Clone)]
pub struct DevProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    pub address_2: String,
    pub address_city: String,
    pub address_state: i32,
}
