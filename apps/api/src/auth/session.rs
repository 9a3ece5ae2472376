//! Cookie sessions resolved into a request-scoped `Session`.
//!
//! The cookie carries a random token; the store only ever sees its SHA-256.
//! Handlers read the principal, queue flashes, sign in or clear, and then
//! call [`Session::finish`] to persist and obtain the `Set-Cookie` header.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{
        header::{COOKIE, SET_COOKIE},
        request::Parts,
        HeaderMap, HeaderValue,
    },
};
use base64::Engine;
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::auth::flash::{drain_category, Flash, FlashCategory};
use crate::errors::AppError;
use crate::state::AppState;

pub const SESSION_COOKIE_NAME: &str = "devdeck_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Dev,
    Org,
}

impl AccountKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountKind::Dev => "dev",
            AccountKind::Org => "org",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dev" => Some(AccountKind::Dev),
            "org" => Some(AccountKind::Org),
            _ => None,
        }
    }
}

/// The authenticated account behind a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: i32,
    pub kind: AccountKind,
    /// "First Last" for developers, the organization name for orgs.
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionData {
    pub principal: Option<Principal>,
    pub flashes: Vec<Flash>,
}

impl SessionData {
    pub fn is_empty(&self) -> bool {
        self.principal.is_none() && self.flashes.is_empty()
    }
}

/// Persistence for session records, keyed by token hash. Records with no
/// principal and no pending flash are deleted rather than saved.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load_session(&self, token_hash: &[u8]) -> Result<Option<SessionData>, AppError>;
    /// Inserts or replaces the record.
    async fn save_session(&self, token_hash: &[u8], data: &SessionData) -> Result<(), AppError>;
    async fn delete_session(&self, token_hash: &[u8]) -> Result<(), AppError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Unchanged,
    Dirty,
    /// Authenticated: the old token is retired and a fresh one issued.
    Rotate,
    Cleared,
}

/// Request-scoped session context.
#[derive(Debug)]
pub struct Session {
    token: Option<String>,
    data: SessionData,
    lifecycle: Lifecycle,
}

impl Session {
    pub fn anonymous() -> Self {
        Self {
            token: None,
            data: SessionData::default(),
            lifecycle: Lifecycle::Unchanged,
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.data.principal.as_ref()
    }

    /// The principal, only if it is of `kind`.
    pub fn principal_of(&self, kind: AccountKind) -> Option<&Principal> {
        self.principal().filter(|p| p.kind == kind)
    }

    pub fn is_authenticated(&self) -> bool {
        self.data.principal.is_some()
    }

    pub fn flash(&mut self, category: FlashCategory, message: impl Into<String>) {
        self.data.flashes.push(Flash {
            category,
            message: message.into(),
        });
        self.touch();
    }

    pub fn flash_all<I>(&mut self, category: FlashCategory, messages: I)
    where
        I: IntoIterator<Item = String>,
    {
        for message in messages {
            self.flash(category, message);
        }
    }

    /// Consumes every queued flash and returns those of `category`.
    pub fn take_flashes(&mut self, category: FlashCategory) -> Vec<String> {
        if self.data.flashes.is_empty() {
            return Vec::new();
        }
        self.touch();
        drain_category(&mut self.data.flashes, category)
    }

    pub fn sign_in(&mut self, principal: Principal) {
        self.data.principal = Some(principal);
        if self.lifecycle != Lifecycle::Cleared {
            self.lifecycle = Lifecycle::Rotate;
        }
    }

    /// Keeps the session's display name in step with a profile edit.
    pub fn set_display_name(&mut self, name: String) {
        let Some(principal) = self.data.principal.as_mut() else {
            return;
        };
        if principal.name != name {
            principal.name = name;
            self.touch();
        }
    }

    /// Drops the principal and every queued flash.
    pub fn clear(&mut self) {
        self.data = SessionData::default();
        self.lifecycle = Lifecycle::Cleared;
    }

    fn touch(&mut self) {
        if self.lifecycle == Lifecycle::Unchanged {
            self.lifecycle = Lifecycle::Dirty;
        }
    }

    /// Persists the session and returns the headers the response must carry.
    pub async fn finish(self, state: &AppState) -> Result<HeaderMap, AppError> {
        let secure = state.config.session_cookie_secure;
        let sessions = state.sessions.as_ref();
        let mut headers = HeaderMap::new();

        match self.lifecycle {
            Lifecycle::Unchanged => {}
            Lifecycle::Cleared => {
                if let Some(token) = &self.token {
                    sessions.delete_session(&hash_session_token(token)).await?;
                }
                headers.insert(SET_COOKIE, clear_session_cookie(secure)?);
            }
            Lifecycle::Rotate => {
                if let Some(token) = &self.token {
                    sessions.delete_session(&hash_session_token(token)).await?;
                }
                let token = generate_session_token();
                sessions
                    .save_session(&hash_session_token(&token), &self.data)
                    .await?;
                headers.insert(SET_COOKIE, session_cookie(&token, secure)?);
            }
            Lifecycle::Dirty => match &self.token {
                // Anonymous session whose last flash was just consumed.
                Some(token) if self.data.is_empty() => {
                    sessions.delete_session(&hash_session_token(token)).await?;
                    headers.insert(SET_COOKIE, clear_session_cookie(secure)?);
                }
                Some(token) => {
                    sessions
                        .save_session(&hash_session_token(token), &self.data)
                        .await?;
                }
                None if self.data.is_empty() => {}
                None => {
                    let token = generate_session_token();
                    sessions
                        .save_session(&hash_session_token(&token), &self.data)
                        .await?;
                    headers.insert(SET_COOKIE, session_cookie(&token, secure)?);
                }
            },
        }

        Ok(headers)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Missing or stale cookies resolve to an anonymous session.
        let Some(token) = extract_session_token(&parts.headers) else {
            return Ok(Session::anonymous());
        };
        match state
            .sessions
            .load_session(&hash_session_token(&token))
            .await?
        {
            Some(data) => Ok(Session {
                token: Some(token),
                data,
                lifecycle: Lifecycle::Unchanged,
            }),
            None => Ok(Session::anonymous()),
        }
    }
}

/// 32 random bytes, URL-safe base64 without padding.
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

pub fn hash_session_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

/// No `Max-Age`: the cookie lives for the browser session.
fn session_cookie(token: &str, secure: bool) -> Result<HeaderValue, AppError> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).map_err(|e| AppError::Internal(e.into()))
}

fn clear_session_cookie(secure: bool) -> Result<HeaderValue, AppError> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).map_err(|e| AppError::Internal(e.into()))
}

pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let Some((key, val)) = pair.trim().split_once('=') else {
                continue;
            };
            if key.trim() == SESSION_COOKIE_NAME && !val.trim().is_empty() {
                return Some(val.trim().to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dev_principal() -> Principal {
        Principal {
            id: 7,
            kind: AccountKind::Dev,
            name: "Ann Lee".to_string(),
        }
    }

    #[test]
    fn test_account_kind_round_trips_through_str() {
        for kind in [AccountKind::Dev, AccountKind::Org] {
            assert_eq!(AccountKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(AccountKind::parse("admin"), None);
    }

    #[test]
    fn test_generated_tokens_are_unique_and_url_safe() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_hash_is_sha256_sized_and_stable() {
        let h1 = hash_session_token("token");
        assert_eq!(h1.len(), 32);
        assert_eq!(h1, hash_session_token("token"));
        assert_ne!(h1, hash_session_token("other"));
    }

    #[test]
    fn test_extract_session_token_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; devdeck_session=abc123; lang=en"),
        );
        assert_eq!(extract_session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_extract_session_token_missing_or_empty() {
        let mut headers = HeaderMap::new();
        assert!(extract_session_token(&headers).is_none());
        headers.insert(COOKIE, HeaderValue::from_static("devdeck_session="));
        assert!(extract_session_token(&headers).is_none());
    }

    #[test]
    fn test_principal_of_filters_by_kind() {
        let mut session = Session::anonymous();
        assert!(!session.is_authenticated());
        session.sign_in(dev_principal());
        assert!(session.principal_of(AccountKind::Dev).is_some());
        assert!(session.principal_of(AccountKind::Org).is_none());
    }

    #[test]
    fn test_clear_drops_principal_and_flashes() {
        let mut session = Session::anonymous();
        session.sign_in(dev_principal());
        session.flash(FlashCategory::Registration, "oops");
        session.clear();
        assert!(session.principal().is_none());
        assert!(session.take_flashes(FlashCategory::Registration).is_empty());
    }

    #[test]
    fn test_session_cookie_flags() {
        let plain = session_cookie("tok", false).unwrap();
        let plain = plain.to_str().unwrap();
        assert!(plain.starts_with("devdeck_session=tok;"));
        assert!(plain.contains("HttpOnly"));
        assert!(!plain.contains("Max-Age"));
        assert!(!plain.contains("Secure"));

        let secure = session_cookie("tok", true).unwrap();
        assert!(secure.to_str().unwrap().ends_with("; Secure"));

        let cleared = clear_session_cookie(false).unwrap();
        assert!(cleared.to_str().unwrap().contains("Max-Age=0"));
    }
}
