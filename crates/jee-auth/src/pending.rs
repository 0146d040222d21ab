//! Logins that have been sent to the consent screen but not yet completed.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// How long a consent round trip may take.
const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

/// What is needed to finish one login.
#[derive(Debug, Clone)]
pub struct PendingLogin {
    pub verifier: String,
    pub session_id: String,
    created_at: Instant,
}

/// Pending logins keyed by OAuth `state`.
#[derive(Debug)]
pub struct PendingLogins {
    entries: Mutex<HashMap<String, PendingLogin>>,
    ttl: Duration,
}

impl PendingLogins {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, PendingLogin>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Remember a login. Expired entries are dropped on the way.
    pub fn insert(
        &self,
        state: impl Into<String>,
        verifier: impl Into<String>,
        session_id: impl Into<String>,
    ) {
        let ttl = self.ttl;
        let mut entries = self.lock();
        entries.retain(|_, login| login.created_at.elapsed() < ttl);
        entries.insert(
            state.into(),
            PendingLogin {
                verifier: verifier.into(),
                session_id: session_id.into(),
                created_at: Instant::now(),
            },
        );
    }

    /// Remove and return the login for `state`, if it has not expired.
    pub fn take(&self, state: &str) -> Option<PendingLogin> {
        let login = self.lock().remove(state)?;
        if login.created_at.elapsed() < self.ttl {
            Some(login)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PendingLogins {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_is_single_use() {
        let pending = PendingLogins::new();
        pending.insert("s1", "verifier", "session");

        let login = pending.take("s1").unwrap();
        assert_eq!(login.verifier, "verifier");
        assert_eq!(login.session_id, "session");
        assert!(pending.take("s1").is_none());
        assert!(pending.is_empty());
    }

    #[test]
    fn test_unknown_state() {
        let pending = PendingLogins::new();
        assert!(pending.take("nope").is_none());
    }

    #[test]
    fn test_expired_entries() {
        let pending = PendingLogins::with_ttl(Duration::ZERO);
        pending.insert("s1", "v", "sess");
        assert!(pending.take("s1").is_none());

        pending.insert("s2", "v", "sess");
        pending.insert("s3", "v", "sess");
        // Inserting s3 dropped the already expired s2.
        assert_eq!(pending.len(), 1);
    }
}
