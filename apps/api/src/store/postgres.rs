use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{FromRow, PgConnection, PgPool};

use crate::auth::flash::Flash;
use crate::auth::session::{AccountKind, Principal, SessionData, SessionStore};
use crate::errors::{conflict_on_unique, AppError};
use crate::models::catalog::{Skill, SkillKind, State};
use crate::models::dev::{Dev, DevProfileUpdate, NewDev, DEV_STATUS_ACTIVE};
use crate::models::org::{NewOrg, Org};
use crate::models::position::{NewPosition, Position};
use crate::store::Store;

/// `Store` and `SessionStore` backed by PostgreSQL.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_dev(&self, new: NewDev) -> Result<i32, AppError> {
        sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO devs
                (first_name, last_name, email, password_hash, address, address_2,
                 address_city, address_state, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.address)
        .bind(&new.address_2)
        .bind(&new.address_city)
        .bind(new.address_state)
        .bind(DEV_STATUS_ACTIVE)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Developer email"))
    }

    async fn find_dev(&self, id: i32) -> Result<Option<Dev>, AppError> {
        Ok(sqlx::query_as::<_, Dev>("SELECT * FROM devs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_dev_by_email(&self, email: &str) -> Result<Option<Dev>, AppError> {
        Ok(sqlx::query_as::<_, Dev>("SELECT * FROM devs WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_dev_profile(&self, id: i32, update: DevProfileUpdate) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE devs
            SET first_name = $1, last_name = $2, email = $3, address = $4, address_2 = $5,
                address_city = $6, address_state = $7, updated_at = NOW()
            WHERE id = $8
            "#,
        )
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.email)
        .bind(&update.address)
        .bind(&update.address_2)
        .bind(&update.address_city)
        .bind(update.address_state)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Developer email"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Developer {id} not found")));
        }
        Ok(())
    }

    async fn list_devs(&self) -> Result<Vec<Dev>, AppError> {
        Ok(sqlx::query_as::<_, Dev>("SELECT * FROM devs ORDER BY id")
            .fetch_all(&self.pool)
            .await?)
    }

    async fn insert_org(&self, new: NewOrg) -> Result<i32, AppError> {
        sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO orgs
                (org_name, rep_name, email, password_hash, address, address_2,
                 address_city, address_state)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&new.org_name)
        .bind(&new.rep_name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.address)
        .bind(&new.address_2)
        .bind(&new.address_city)
        .bind(&new.address_state)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Organization email"))
    }

    async fn find_org(&self, id: i32) -> Result<Option<Org>, AppError> {
        Ok(sqlx::query_as::<_, Org>("SELECT * FROM orgs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_org_by_email(&self, email: &str) -> Result<Option<Org>, AppError> {
        Ok(sqlx::query_as::<_, Org>("SELECT * FROM orgs WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_position(&self, new: NewPosition) -> Result<i32, AppError> {
        let mut tx = self.pool.begin().await?;

        let pos_id: i32 = sqlx::query_scalar(
            "INSERT INTO positions (org_id, name, description) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(new.org_id)
        .bind(&new.name)
        .bind(&new.description)
        .fetch_one(&mut *tx)
        .await?;

        for (kind, ids) in [
            (SkillKind::Language, &new.language_ids),
            (SkillKind::Framework, &new.framework_ids),
        ] {
            if ids.is_empty() {
                continue;
            }
            let (link_table, skill_col) = kind.position_link();
            let sql = format!(
                "INSERT INTO {link_table} (pos_id, {skill_col}) \
                 SELECT $1, id FROM {catalog} WHERE id = ANY($2)",
                catalog = kind.catalog_table(),
            );
            sqlx::query(&sql)
                .bind(pos_id)
                .bind(ids.iter().copied().collect::<Vec<i32>>())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(pos_id)
    }

    async fn find_position(&self, id: i32) -> Result<Option<Position>, AppError> {
        Ok(
            sqlx::query_as::<_, Position>("SELECT * FROM positions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_positions(&self) -> Result<Vec<Position>, AppError> {
        Ok(
            sqlx::query_as::<_, Position>("SELECT * FROM positions ORDER BY id")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn list_positions_for_org(&self, org_id: i32) -> Result<Vec<Position>, AppError> {
        Ok(sqlx::query_as::<_, Position>(
            "SELECT * FROM positions WHERE org_id = $1 ORDER BY id",
        )
        .bind(org_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_skills(&self, kind: SkillKind) -> Result<Vec<Skill>, AppError> {
        let sql = format!(
            "SELECT id, name, img FROM {} ORDER BY id",
            kind.catalog_table()
        );
        Ok(sqlx::query_as::<_, Skill>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_states(&self) -> Result<Vec<State>, AppError> {
        Ok(
            sqlx::query_as::<_, State>("SELECT id, name, abbrev FROM states ORDER BY name")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn find_state(&self, id: i32) -> Result<Option<State>, AppError> {
        Ok(
            sqlx::query_as::<_, State>("SELECT id, name, abbrev FROM states WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_state_by_code(&self, code: &str) -> Result<Option<State>, AppError> {
        Ok(sqlx::query_as::<_, State>(
            r#"
            SELECT id, name, abbrev FROM states
            WHERE UPPER(abbrev) = UPPER($1) OR UPPER(name) = UPPER($1)
            LIMIT 1
            "#,
        )
        .bind(code.trim())
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn dev_skills(&self, dev_id: i32, kind: SkillKind) -> Result<Vec<Skill>, AppError> {
        let (link_table, skill_col) = kind.dev_link();
        let sql = format!(
            "SELECT c.id, c.name, c.img FROM {catalog} c \
             JOIN {link_table} l ON l.{skill_col} = c.id \
             WHERE l.dev_id = $1 ORDER BY c.id",
            catalog = kind.catalog_table(),
        );
        Ok(sqlx::query_as::<_, Skill>(&sql)
            .bind(dev_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn position_skills(
        &self,
        pos_id: i32,
        kind: SkillKind,
    ) -> Result<Vec<Skill>, AppError> {
        let (link_table, skill_col) = kind.position_link();
        let sql = format!(
            "SELECT c.id, c.name, c.img FROM {catalog} c \
             JOIN {link_table} l ON l.{skill_col} = c.id \
             WHERE l.pos_id = $1 ORDER BY c.id",
            catalog = kind.catalog_table(),
        );
        Ok(sqlx::query_as::<_, Skill>(&sql)
            .bind(pos_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn replace_dev_skills(
        &self,
        dev_id: i32,
        kind: SkillKind,
        ids: &BTreeSet<i32>,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        relink_dev_skills(&mut *tx, dev_id, kind, ids).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn update_dev_languages(
        &self,
        dev_id: i32,
        bio: Option<&str>,
        ids: &BTreeSet<i32>,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        if let Some(bio) = bio {
            let result =
                sqlx::query("UPDATE devs SET profile_bio = $1, updated_at = NOW() WHERE id = $2")
                    .bind(bio)
                    .bind(dev_id)
                    .execute(&mut *tx)
                    .await?;
            if result.rows_affected() == 0 {
                return Err(AppError::NotFound(format!("Developer {dev_id} not found")));
            }
        }

        relink_dev_skills(&mut *tx, dev_id, SkillKind::Language, ids).await?;
        tx.commit().await?;
        Ok(())
    }
}

/// Clears the developer's `kind` links and re-adds those `ids` that exist in
/// the catalog.
async fn relink_dev_skills(
    conn: &mut PgConnection,
    dev_id: i32,
    kind: SkillKind,
    ids: &BTreeSet<i32>,
) -> Result<(), sqlx::Error> {
    let (link_table, skill_col) = kind.dev_link();

    sqlx::query(&format!("DELETE FROM {link_table} WHERE dev_id = $1"))
        .bind(dev_id)
        .execute(&mut *conn)
        .await?;

    if !ids.is_empty() {
        let sql = format!(
            "INSERT INTO {link_table} (dev_id, {skill_col}) \
             SELECT $1, id FROM {catalog} WHERE id = ANY($2)",
            catalog = kind.catalog_table(),
        );
        sqlx::query(&sql)
            .bind(dev_id)
            .bind(ids.iter().copied().collect::<Vec<i32>>())
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

#[derive(FromRow)]
struct SessionRow {
    principal_id: Option<i32>,
    account_kind: Option<String>,
    display_name: Option<String>,
    flashes: Json<Vec<Flash>>,
}

impl From<SessionRow> for SessionData {
    fn from(row: SessionRow) -> Self {
        let principal = match (row.principal_id, row.account_kind.as_deref()) {
            (Some(id), Some(kind)) => AccountKind::parse(kind).map(|kind| Principal {
                id,
                kind,
                name: row.display_name.unwrap_or_default(),
            }),
            _ => None,
        };
        SessionData {
            principal,
            flashes: row.flashes.0,
        }
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn load_session(&self, token_hash: &[u8]) -> Result<Option<SessionData>, AppError> {
        let row: Option<SessionRow> = sqlx::query_as(
            r#"
            SELECT principal_id, account_kind, display_name, flashes
            FROM sessions
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(SessionData::from))
    }

    async fn save_session(&self, token_hash: &[u8], data: &SessionData) -> Result<(), AppError> {
        let principal = data.principal.as_ref();
        sqlx::query(
            r#"
            INSERT INTO sessions (token_hash, principal_id, account_kind, display_name, flashes)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (token_hash) DO UPDATE
            SET principal_id = EXCLUDED.principal_id,
                account_kind = EXCLUDED.account_kind,
                display_name = EXCLUDED.display_name,
                flashes = EXCLUDED.flashes,
                updated_at = NOW()
            "#,
        )
        .bind(token_hash)
        .bind(principal.map(|p| p.id))
        .bind(principal.map(|p| p.kind.as_str()))
        .bind(principal.map(|p| p.name.as_str()))
        .bind(Json(&data.flashes))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_session(&self, token_hash: &[u8]) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
