//! Cookie sessions.
//!
//! A session id is a random UUID carried in the [`SESSION_COOKIE`] cookie and
//! mapped in memory to the logged-in [`SessionUser`]. Sessions do not survive
//! a restart, and expire once unused for longer than the store's lifetime.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::header::{HeaderMap, COOKIE};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::access::SessionUser;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "firecheck_session";

/// Session lifetime used by [`SessionStore::new`].
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

#[derive(Debug, Clone)]
struct Session {
    user: SessionUser,
    last_seen: Instant,
}

impl Session {
    fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.last_seen) >= ttl
    }
}

/// In-memory session table shared by all handlers.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    /// Create an empty store with the default lifetime.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store whose sessions expire after `ttl` without use.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Arc::default(),
            ttl,
        }
    }

    /// The idle lifetime of a session.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a session for `user` and return its id.
    ///
    /// Expired sessions are pruned first.
    pub async fn create(&self, user: SessionUser) -> String {
        let id = Uuid::new_v4().to_string();
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(self.ttl, now));
        if sessions.len() < before {
            debug!(pruned = before - sessions.len(), "pruned expired sessions");
        }
        sessions.insert(
            id.clone(),
            Session {
                user,
                last_seen: now,
            },
        );
        id
    }

    /// The user for a live session id. Refreshes the session's last use.
    ///
    /// An expired session is removed and yields `None`.
    pub async fn get(&self, id: &str) -> Option<SessionUser> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id)?;
        if session.is_expired(self.ttl, now) {
            sessions.remove(id);
            debug!("session expired");
            return None;
        }
        session.last_seen = now;
        Some(session.user.clone())
    }

    /// End a session. Returns the user it belonged to.
    pub async fn remove(&self, id: &str) -> Option<SessionUser> {
        self.sessions
            .write()
            .await
            .remove(id)
            .map(|session| session.user)
    }

    /// The user for the session cookie in `headers`, if any.
    pub async fn user_from_headers(&self, headers: &HeaderMap) -> Option<SessionUser> {
        match session_id(headers) {
            Some(id) => self.get(id).await,
            None => None,
        }
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.sessions
            .read()
            .await
            .values()
            .filter(|session| !session.is_expired(self.ttl, now))
            .count()
    }

    /// Whether there are no live sessions.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of stored entries, expired ones included.
    #[cfg(test)]
    async fn stored(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Extract the session id from the `Cookie` headers.
#[must_use]
pub fn session_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, id)| id)
        .filter(|id| !id.is_empty())
}

/// `Set-Cookie` value that starts a session.
#[must_use]
pub fn set_cookie(id: &str) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}

/// `Set-Cookie` value that ends a session.
#[must_use]
pub fn clear_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn user() -> SessionUser {
        SessionUser {
            username: "alexscott".to_string(),
            name: "Alex Scott".to_string(),
        }
    }

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_session_id_from_cookie() {
        let headers = headers("theme=dark; firecheck_session=abc-123; other=1");
        assert_eq!(session_id(&headers), Some("abc-123"));
    }

    #[test]
    fn test_session_id_missing() {
        assert_eq!(session_id(&HeaderMap::new()), None);
        assert_eq!(session_id(&headers("theme=dark")), None);
        assert_eq!(session_id(&headers("firecheck_session=")), None);
    }

    #[test]
    fn test_cookie_values() {
        assert!(set_cookie("abc").starts_with("firecheck_session=abc;"));
        assert!(clear_cookie().contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_create_get_remove() {
        let store = SessionStore::new();
        let id = store.create(user()).await;

        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(store.get(&id).await, Some(user()));
        assert_eq!(
            store.user_from_headers(&headers(&format!("{SESSION_COOKIE}={id}"))).await,
            Some(user())
        );

        assert_eq!(store.remove(&id).await, Some(user()));
        assert!(store.get(&id).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_ids_are_distinct() {
        let store = SessionStore::new();
        let first = store.create(user()).await;
        let second = store.create(user()).await;
        assert_ne!(first, second);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_expired_session_no_longer_resolves() {
        let store = SessionStore::with_ttl(Duration::ZERO);
        let id = store.create(user()).await;

        assert!(store.get(&id).await.is_none());
        assert!(store
            .user_from_headers(&headers(&format!("{SESSION_COOKIE}={id}")))
            .await
            .is_none());
        assert_eq!(store.stored().await, 0);
    }

    #[tokio::test]
    async fn test_create_prunes_expired_sessions() {
        let store = SessionStore::with_ttl(Duration::ZERO);
        store.create(user()).await;
        store.create(user()).await;

        assert_eq!(store.stored().await, 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_live_session_survives_within_ttl() {
        let store = SessionStore::with_ttl(Duration::from_secs(60));
        let id = store.create(user()).await;

        assert_eq!(store.get(&id).await, Some(user()));
        assert_eq!(store.get(&id).await, Some(user()));
        assert_eq!(store.ttl(), Duration::from_secs(60));
    }
}
