//! In-memory study sessions keyed by a browser cookie.

use axum::http::{header, HeaderMap};
use jee_core::StudySession;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "chatjee_session";

const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(2 * 60 * 60);
const DEFAULT_MAX_SESSIONS: usize = 1000;

/// One session; the mutex serialises turns within it.
pub type SessionHandle = Arc<tokio::sync::Mutex<StudySession>>;

struct Entry {
    handle: SessionHandle,
    last_seen: Instant,
}

/// Sessions idle for longer than the TTL are dropped, and past the cap the
/// least recently used one goes. A dropped session that comes back with
/// its cookie starts empty under the same id, so stored credentials still
/// sign it in again.
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Entry>>,
    history_capacity: usize,
    idle_ttl: Duration,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            history_capacity,
            idle_ttl: DEFAULT_IDLE_TTL,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    pub fn with_limits(mut self, idle_ttl: Duration, max_sessions: usize) -> Self {
        self.idle_ttl = idle_ttl;
        self.max_sessions = max_sessions.max(1);
        self
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, id: &str) -> Option<SessionHandle> {
        let mut sessions = self.lock();
        let entry = sessions.get_mut(id)?;
        if entry.last_seen.elapsed() >= self.idle_ttl {
            sessions.remove(id);
            return None;
        }
        entry.last_seen = Instant::now();
        Some(entry.handle.clone())
    }

    /// Look up the session for a cookie value. Unknown but well-formed ids
    /// are recreated under the same id so stored credentials still match.
    pub fn get_or_create(&self, id: Option<&str>) -> (String, SessionHandle) {
        let id = id
            .filter(|id| Uuid::parse_str(id).is_ok())
            .map(str::to_string)
            .unwrap_or_else(jee_core::new_id);

        let now = Instant::now();
        let idle_ttl = self.idle_ttl;
        let mut sessions = self.lock();

        if let Some(entry) = sessions.get_mut(&id) {
            if now.duration_since(entry.last_seen) < idle_ttl {
                entry.last_seen = now;
                return (id, entry.handle.clone());
            }
        }

        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < idle_ttl);
        while sessions.len() >= self.max_sessions {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            sessions.remove(&oldest);
        }

        let handle = Arc::new(tokio::sync::Mutex::new(StudySession::new(
            self.history_capacity,
        )));
        sessions.insert(
            id.clone(),
            Entry {
                handle: handle.clone(),
                last_seen: now,
            },
        );
        (id, handle)
    }

    pub fn remove(&self, id: &str) -> bool {
        self.lock().remove(id).is_some()
    }

    /// Sessions currently held, expired ones included until the next sweep.
    pub fn len(&self) -> usize {
        self.lock().len()
    }
}

/// The session id carried by the request, if any.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
}

pub fn session_cookie(id: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}

pub fn expired_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_cookie_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; chatjee_session=abc-123 ; other=1"),
        );
        assert_eq!(session_id_from_headers(&headers).as_deref(), Some("abc-123"));

        assert!(session_id_from_headers(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_get_or_create_reuses_known_ids() {
        let store = SessionStore::new(40);
        let (id, _) = store.get_or_create(None);
        let (again, _) = store.get_or_create(Some(&id));

        assert_eq!(id, again);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_malformed_ids_are_replaced() {
        let store = SessionStore::new(40);
        let (id, _) = store.get_or_create(Some("../../etc/passwd"));
        assert_ne!(id, "../../etc/passwd");
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_unknown_uuid_is_kept() {
        let store = SessionStore::new(40);
        let wanted = Uuid::new_v4().to_string();
        let (id, _) = store.get_or_create(Some(&wanted));
        assert_eq!(id, wanted);
        assert!(store.get(&wanted).is_some());
        assert!(store.remove(&wanted));
        assert!(store.get(&wanted).is_none());
    }

    #[test]
    fn test_idle_sessions_are_dropped() {
        let store = SessionStore::new(40).with_limits(Duration::ZERO, 100);
        let (first, _) = store.get_or_create(None);
        assert!(store.get(&first).is_none());

        store.get_or_create(None);
        store.get_or_create(None);
        // Each insert swept the previous, already idle, session.
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_least_recently_used_session_goes_past_the_cap() {
        let store = SessionStore::new(40).with_limits(Duration::from_secs(3600), 3);
        let (a, _) = store.get_or_create(None);
        std::thread::sleep(Duration::from_millis(2));
        let (b, _) = store.get_or_create(None);
        std::thread::sleep(Duration::from_millis(2));
        let (c, _) = store.get_or_create(None);
        std::thread::sleep(Duration::from_millis(2));

        // Touching `a` makes `b` the oldest.
        assert!(store.get(&a).is_some());
        std::thread::sleep(Duration::from_millis(2));
        let (d, _) = store.get_or_create(None);

        assert_eq!(store.len(), 3);
        assert!(store.get(&b).is_none());
        for id in [&a, &c, &d] {
            assert!(store.get(id).is_some());
        }
    }

    #[test]
    fn test_known_session_survives_a_full_store() {
        let store = SessionStore::new(40).with_limits(Duration::from_secs(3600), 2);
        let (a, handle) = store.get_or_create(None);
        store.get_or_create(None);

        let (again, same) = store.get_or_create(Some(&a));
        assert_eq!(again, a);
        assert!(Arc::ptr_eq(&handle, &same));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_cookie_strings() {
        assert_eq!(
            session_cookie("x"),
            "chatjee_session=x; Path=/; HttpOnly; SameSite=Lax"
        );
        assert!(expired_session_cookie().contains("Max-Age=0"));
    }
}
