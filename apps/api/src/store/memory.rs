//! In-memory `Store` + `SessionStore` used by unit and router tests.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::auth::session::{SessionData, SessionStore};
use crate::errors::AppError;
use crate::models::catalog::{Skill, SkillKind, State};
use crate::models::dev::{Dev, DevProfileUpdate, NewDev, DEV_STATUS_ACTIVE};
use crate::models::org::{NewOrg, Org};
use crate::models::position::{NewPosition, Position};
use crate::store::Store;

#[derive(Default)]
struct Inner {
    devs: Vec<Dev>,
    orgs: Vec<Org>,
    positions: Vec<Position>,
    languages: Vec<Skill>,
    frameworks: Vec<Skill>,
    states: Vec<State>,
    dev_links: HashMap<(i32, SkillKind), BTreeSet<i32>>,
    position_links: HashMap<(i32, SkillKind), BTreeSet<i32>>,
    sessions: HashMap<Vec<u8>, SessionData>,
}

impl Inner {
    fn catalog(&self, kind: SkillKind) -> &[Skill] {
        match kind {
            SkillKind::Language => &self.languages,
            SkillKind::Framework => &self.frameworks,
        }
    }

    /// Keeps only ids present in the catalog, like the SQL `INSERT .. SELECT`.
    fn known_ids(&self, kind: SkillKind, ids: &BTreeSet<i32>) -> BTreeSet<i32> {
        let catalog = self.catalog(kind);
        ids.iter()
            .copied()
            .filter(|id| catalog.iter().any(|s| s.id == *id))
            .collect()
    }

    fn resolve(&self, kind: SkillKind, ids: Option<&BTreeSet<i32>>) -> Vec<Skill> {
        let Some(ids) = ids else {
            return Vec::new();
        };
        self.catalog(kind)
            .iter()
            .filter(|s| ids.contains(&s.id))
            .cloned()
            .collect()
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    /// When set, email lookups find nothing while inserts and updates still
    /// enforce unique emails: a concurrent registration between the check
    /// and the write.
    stale_email_lookups: AtomicBool,
}

fn skill(id: i32, name: &str) -> Skill {
    Skill {
        id,
        name: name.to_string(),
        img: format!("img/{}.png", name.to_lowercase()),
    }
}

/// Same rule as the SQL lookup: abbreviation or full name, ignoring case.
fn matches_code(state: &State, code: &str) -> bool {
    let code = code.trim();
    state.abbrev.eq_ignore_ascii_case(code) || state.name.eq_ignore_ascii_case(code)
}

fn state(id: i32, name: &str, abbrev: &str) -> State {
    State {
        id,
        name: name.to_string(),
        abbrev: abbrev.to_string(),
    }
}

impl MemoryStore {
    /// A store with a small catalog: four states, three languages, three
    /// frameworks.
    pub fn seeded() -> Self {
        let store = Self::default();
        {
            let mut inner = store.lock();
            inner.states = vec![
                state(3, "Arizona", "AZ"),
                state(5, "California", "CA"),
                state(33, "New York", "NY"),
                state(44, "Texas", "TX"),
            ];
            inner.languages = vec![skill(1, "Python"), skill(2, "Rust"), skill(3, "Go")];
            inner.frameworks = vec![skill(1, "Django"), skill(2, "Axum"), skill(3, "React")];
        }
        store
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    pub fn position_count(&self) -> usize {
        self.lock().positions.len()
    }

    pub fn dev_count(&self) -> usize {
        self.lock().devs.len()
    }

    pub fn org_count(&self) -> usize {
        self.lock().orgs.len()
    }

    pub fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }

    pub fn make_email_lookups_stale(&self) {
        self.stale_email_lookups.store(true, Ordering::SeqCst);
    }

    fn email_lookups_stale(&self) -> bool {
        self.stale_email_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_dev(&self, new: NewDev) -> Result<i32, AppError> {
        let mut inner = self.lock();
        if inner.devs.iter().any(|d| d.email == new.email) {
            return Err(AppError::Conflict("Developer email already exists".into()));
        }
        let id = inner.devs.iter().map(|d| d.id).max().unwrap_or(0) + 1;
        let now = Utc::now();
        inner.devs.push(Dev {
            id,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            password_hash: new.password_hash,
            address: new.address,
            address_2: new.address_2,
            address_city: new.address_city,
            address_state: new.address_state,
            profile_bio: String::new(),
            status: DEV_STATUS_ACTIVE,
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn find_dev(&self, id: i32) -> Result<Option<Dev>, AppError> {
        Ok(self.lock().devs.iter().find(|d| d.id == id).cloned())
    }

    async fn find_dev_by_email(&self, email: &str) -> Result<Option<Dev>, AppError> {
        if self.email_lookups_stale() {
            return Ok(None);
        }
        Ok(self.lock().devs.iter().find(|d| d.email == email).cloned())
    }

    async fn update_dev_profile(&self, id: i32, update: DevProfileUpdate) -> Result<(), AppError> {
        let mut inner = self.lock();
        if inner
            .devs
            .iter()
            .any(|d| d.id != id && d.email == update.email)
        {
            return Err(AppError::Conflict("Developer email already exists".into()));
        }
        let dev = inner
            .devs
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Developer {id} not found")))?;
        dev.first_name = update.first_name;
        dev.last_name = update.last_name;
        dev.email = update.email;
        dev.address = update.address;
        dev.address_2 = update.address_2;
        dev.address_city = update.address_city;
        dev.address_state = update.address_state;
        dev.updated_at = Utc::now();
        Ok(())
    }

    async fn list_devs(&self) -> Result<Vec<Dev>, AppError> {
        Ok(self.lock().devs.clone())
    }

    async fn insert_org(&self, new: NewOrg) -> Result<i32, AppError> {
        let mut inner = self.lock();
        if inner.orgs.iter().any(|o| o.email == new.email) {
            return Err(AppError::Conflict(
                "Organization email already exists".into(),
            ));
        }
        let id = inner.orgs.iter().map(|o| o.id).max().unwrap_or(0) + 1;
        let now = Utc::now();
        inner.orgs.push(Org {
            id,
            org_name: new.org_name,
            rep_name: new.rep_name,
            email: new.email,
            password_hash: new.password_hash,
            address: new.address,
            address_2: new.address_2,
            address_city: new.address_city,
            address_state: new.address_state,
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn find_org(&self, id: i32) -> Result<Option<Org>, AppError> {
        Ok(self.lock().orgs.iter().find(|o| o.id == id).cloned())
    }

    async fn find_org_by_email(&self, email: &str) -> Result<Option<Org>, AppError> {
        if self.email_lookups_stale() {
            return Ok(None);
        }
        Ok(self.lock().orgs.iter().find(|o| o.email == email).cloned())
    }

    async fn insert_position(&self, new: NewPosition) -> Result<i32, AppError> {
        let mut inner = self.lock();
        if !inner.orgs.iter().any(|o| o.id == new.org_id) {
            return Err(AppError::Internal(anyhow::anyhow!(
                "position references missing org {}",
                new.org_id
            )));
        }
        let id = inner.positions.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let now = Utc::now();
        inner.positions.push(Position {
            id,
            org_id: new.org_id,
            name: new.name,
            description: new.description,
            created_at: now,
            updated_at: now,
        });
        let languages = inner.known_ids(SkillKind::Language, &new.language_ids);
        let frameworks = inner.known_ids(SkillKind::Framework, &new.framework_ids);
        inner
            .position_links
            .insert((id, SkillKind::Language), languages);
        inner
            .position_links
            .insert((id, SkillKind::Framework), frameworks);
        Ok(id)
    }

    async fn find_position(&self, id: i32) -> Result<Option<Position>, AppError> {
        Ok(self.lock().positions.iter().find(|p| p.id == id).cloned())
    }

    async fn list_positions(&self) -> Result<Vec<Position>, AppError> {
        Ok(self.lock().positions.clone())
    }

    async fn list_positions_for_org(&self, org_id: i32) -> Result<Vec<Position>, AppError> {
        Ok(self
            .lock()
            .positions
            .iter()
            .filter(|p| p.org_id == org_id)
            .cloned()
            .collect())
    }

    async fn list_skills(&self, kind: SkillKind) -> Result<Vec<Skill>, AppError> {
        Ok(self.lock().catalog(kind).to_vec())
    }

    async fn list_states(&self) -> Result<Vec<State>, AppError> {
        Ok(self.lock().states.clone())
    }

    async fn find_state(&self, id: i32) -> Result<Option<State>, AppError> {
        Ok(self.lock().states.iter().find(|s| s.id == id).cloned())
    }

    async fn find_state_by_code(&self, code: &str) -> Result<Option<State>, AppError> {
        Ok(self
            .lock()
            .states
            .iter()
            .find(|s| matches_code(s, code))
            .cloned())
    }

    async fn dev_skills(&self, dev_id: i32, kind: SkillKind) -> Result<Vec<Skill>, AppError> {
        let inner = self.lock();
        Ok(inner.resolve(kind, inner.dev_links.get(&(dev_id, kind))))
    }

    async fn position_skills(
        &self,
        pos_id: i32,
        kind: SkillKind,
    ) -> Result<Vec<Skill>, AppError> {
        let inner = self.lock();
        Ok(inner.resolve(kind, inner.position_links.get(&(pos_id, kind))))
    }

    async fn replace_dev_skills(
        &self,
        dev_id: i32,
        kind: SkillKind,
        ids: &BTreeSet<i32>,
    ) -> Result<(), AppError> {
        let mut inner = self.lock();
        let known = inner.known_ids(kind, ids);
        inner.dev_links.insert((dev_id, kind), known);
        Ok(())
    }

    async fn update_dev_languages(
        &self,
        dev_id: i32,
        bio: Option<&str>,
        ids: &BTreeSet<i32>,
    ) -> Result<(), AppError> {
        let mut inner = self.lock();
        let known = inner.known_ids(SkillKind::Language, ids);
        let dev = inner
            .devs
            .iter_mut()
            .find(|d| d.id == dev_id)
            .ok_or_else(|| AppError::NotFound(format!("Developer {dev_id} not found")))?;
        if let Some(bio) = bio {
            dev.profile_bio = bio.to_string();
            dev.updated_at = Utc::now();
        }
        inner.dev_links.insert((dev_id, SkillKind::Language), known);
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load_session(&self, token_hash: &[u8]) -> Result<Option<SessionData>, AppError> {
        Ok(self.lock().sessions.get(token_hash).cloned())
    }

    async fn save_session(&self, token_hash: &[u8], data: &SessionData) -> Result<(), AppError> {
        self.lock()
            .sessions
            .insert(token_hash.to_vec(), data.clone());
        Ok(())
    }

    async fn delete_session(&self, token_hash: &[u8]) -> Result<(), AppError> {
        self.lock().sessions.remove(token_hash);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::skill_ids;

    async fn dev(store: &MemoryStore) -> i32 {
        store
            .insert_dev(NewDev {
                first_name: "Ann".into(),
                last_name: "Lee".into(),
                email: "ann@x.com".into(),
                password_hash: "x".into(),
                address: String::new(),
                address_2: String::new(),
                address_city: "Austin".into(),
                address_state: 44,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_replace_reads_back_exact_set() {
        let store = MemoryStore::seeded();
        let id = dev(&store).await;
        let kind = SkillKind::Language;

        store
            .replace_dev_skills(id, kind, &BTreeSet::from([1, 2, 3]))
            .await
            .unwrap();
        store
            .replace_dev_skills(id, kind, &BTreeSet::from([2]))
            .await
            .unwrap();

        let skills = store.dev_skills(id, kind).await.unwrap();
        assert_eq!(skill_ids(&skills), BTreeSet::from([2]));
    }

    #[tokio::test]
    async fn test_replace_is_idempotent_and_drops_unknown_ids() {
        let store = MemoryStore::seeded();
        let id = dev(&store).await;
        let ids = BTreeSet::from([1, 3, 99]);

        store
            .replace_dev_skills(id, SkillKind::Framework, &ids)
            .await
            .unwrap();
        let once = skill_ids(&store.dev_skills(id, SkillKind::Framework).await.unwrap());
        store
            .replace_dev_skills(id, SkillKind::Framework, &ids)
            .await
            .unwrap();
        let twice = skill_ids(&store.dev_skills(id, SkillKind::Framework).await.unwrap());

        assert_eq!(once, BTreeSet::from([1, 3]));
        assert_eq!(once, twice);
        assert!(store
            .dev_skills(id, SkillKind::Language)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_language_page_sets_bio_and_languages_together() {
        let store = MemoryStore::seeded();
        let id = dev(&store).await;

        store
            .update_dev_languages(id, Some("Rustacean"), &BTreeSet::from([2, 99]))
            .await
            .unwrap();
        store
            .update_dev_languages(id, None, &BTreeSet::from([1, 2]))
            .await
            .unwrap();

        let dev = store.find_dev(id).await.unwrap().unwrap();
        assert_eq!(dev.profile_bio, "Rustacean");
        let langs = skill_ids(&store.dev_skills(id, SkillKind::Language).await.unwrap());
        assert_eq!(langs, BTreeSet::from([1, 2]));
    }

    #[tokio::test]
    async fn test_language_page_for_missing_dev_changes_nothing() {
        let store = MemoryStore::seeded();
        let err = store
            .update_dev_languages(7, Some("bio"), &BTreeSet::from([1]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(store.dev_skills(7, SkillKind::Language).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_state_lookup_by_abbrev_or_name() {
        let store = MemoryStore::seeded();
        for code in ["TX", "tx", " texas "] {
            let state = store.find_state_by_code(code).await.unwrap();
            assert_eq!(state.map(|s| s.id), Some(44), "{code:?}");
        }
        assert!(store.find_state_by_code("TN").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let store = MemoryStore::seeded();
        dev(&store).await;
        let err = store
            .insert_dev(NewDev {
                first_name: "Ann".into(),
                last_name: "Other".into(),
                email: "ann@x.com".into(),
                password_hash: "x".into(),
                address: String::new(),
                address_2: String::new(),
                address_city: "Austin".into(),
                address_state: 44,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.dev_count(), 1);
    }
}
