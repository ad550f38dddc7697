// Session store
//
// Per-device session state keyed by `DeviceKey`. The switch's web UI
// expects a browser-like session: a cookie from the landing page, then a
// login handshake carrying a client-chosen numeric session id (SEID).
// This module only holds that state; `client.rs` drives the handshake.

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rand::rngs::{OsRng, StdRng};
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cookies::PersistentCookieJar;
use crate::device::DeviceKey;
use crate::error::Error;

/// Smallest SEID the firmware accepts (nine digits).
pub const SEID_MIN: u32 = 100_000_000;
/// Largest SEID the firmware accepts.
pub const SEID_MAX: u32 = 999_999_999;

/// Where a device's session is in the login sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Uninitialized,
    /// Landing page fetched to prime the cookie jar.
    Probing,
    /// Login handshake carrying the SEID is in flight.
    HandshakeSent,
    Ready,
}

/// Mutable part of a session, guarded by the per-device mutex.
#[derive(Debug, Default)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub seid: Option<String>,
}

impl SessionState {
    pub fn is_ready(&self) -> bool {
        self.phase == SessionPhase::Ready
    }

    pub(crate) fn clear(&mut self) {
        self.phase = SessionPhase::Uninitialized;
        self.seid = None;
    }
}

/// Everything kept for one device key.
///
/// The HTTP client is built once per session so its cookie provider can
/// point at this device's jar.
pub struct DeviceSession {
    pub(crate) http: reqwest::Client,
    pub(crate) jar: Arc<PersistentCookieJar>,
    pub(crate) state: Mutex<SessionState>,
}

impl DeviceSession {
    pub fn jar(&self) -> &PersistentCookieJar {
        &self.jar
    }

    /// Current SEID, if a handshake has produced one.
    pub async fn seid(&self) -> Option<String> {
        self.state.lock().await.seid.clone()
    }

    pub async fn phase(&self) -> SessionPhase {
        self.state.lock().await.phase
    }
}

/// Process-wide session cache, one entry per device key.
///
/// Owned by whoever runs the operations and shared by reference (usually
/// behind an `Arc`). Distinct keys never contend; a single key serialises
/// its handshake through the entry's mutex.
pub struct SessionStore {
    cookie_dir: PathBuf,
    sessions: DashMap<DeviceKey, Arc<DeviceSession>>,
}

impl SessionStore {
    /// Store whose cookie jars live in `cookie_dir`.
    pub fn new(cookie_dir: impl Into<PathBuf>) -> Self {
        Self {
            cookie_dir: cookie_dir.into(),
            sessions: DashMap::new(),
        }
    }

    /// Store using the system temp directory for cookie jars.
    pub fn in_temp_dir() -> Self {
        Self::new(std::env::temp_dir())
    }

    /// Deterministic cookie-jar path for a key.
    pub fn cookie_jar_path(&self, key: &DeviceKey) -> PathBuf {
        self.cookie_dir
            .join(format!("planet_{}.cookie", key.fingerprint()))
    }

    /// Existing session for `key`, if one was created.
    pub fn get(&self, key: &DeviceKey) -> Option<Arc<DeviceSession>> {
        self.sessions.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Fetch the session for `key`, creating it (and its jar) on first use.
    pub(crate) fn get_or_create(
        &self,
        key: &DeviceKey,
        build_http: impl FnOnce(Arc<PersistentCookieJar>) -> Result<reqwest::Client, Error>,
    ) -> Result<Arc<DeviceSession>, Error> {
        if let Some(existing) = self.get(key) {
            return Ok(existing);
        }

        let entry = match self.sessions.entry(key.clone()) {
            Entry::Occupied(occupied) => return Ok(Arc::clone(occupied.get())),
            Entry::Vacant(vacant) => vacant,
        };

        let jar = Arc::new(PersistentCookieJar::open(self.cookie_jar_path(key))?);
        let http = build_http(Arc::clone(&jar))?;
        debug!(key = %key, jar = %jar.path().display(), "created session entry");

        let session = Arc::new(DeviceSession {
            http,
            jar,
            state: Mutex::new(SessionState::default()),
        });
        entry.insert(Arc::clone(&session));
        Ok(session)
    }

    /// Forget the session for `key` and delete its cookie jar.
    ///
    /// Requests already holding the old session finish against it, but
    /// its jar is retired and no longer written; the next request starts
    /// from `Uninitialized` with an empty jar.
    pub async fn reset(&self, key: &DeviceKey) -> Result<(), Error> {
        let path = self.cookie_jar_path(key);
        debug!(key = %key, jar = %path.display(), "session reset");
        match self.sessions.remove(key) {
            Some((_, session)) => {
                session.jar.retire()?;
                session.state.lock().await.clear();
                Ok(())
            }
            None => PersistentCookieJar::delete_file(&path),
        }
    }

    /// Number of live session entries.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Draw a fresh nine-digit SEID.
///
/// Seeds a CSPRNG from the OS; if the OS source is unavailable, falls
/// back to the thread-local generator rather than failing the login.
pub fn generate_seid() -> String {
    let value = match StdRng::from_rng(OsRng) {
        Ok(mut rng) => rng.gen_range(SEID_MIN..=SEID_MAX),
        Err(e) => {
            warn!(error = %e, "OS entropy unavailable, using thread-local RNG for SEID");
            rand::thread_rng().gen_range(SEID_MIN..=SEID_MAX)
        }
    };
    value.to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn seid_is_nine_digits() {
        for _ in 0..256 {
            let seid = generate_seid();
            assert_eq!(seid.len(), 9, "{seid}");
            let n: u32 = seid.parse().unwrap();
            assert!((SEID_MIN..=SEID_MAX).contains(&n));
        }
    }

    #[test]
    fn jar_path_is_deterministic() {
        let store = SessionStore::new("/var/tmp/planet");
        let key = DeviceKey::named("core-1");
        assert_eq!(store.cookie_jar_path(&key), store.cookie_jar_path(&key));
        assert!(
            store
                .cookie_jar_path(&key)
                .to_string_lossy()
                .starts_with("/var/tmp/planet/planet_")
        );
    }

    #[tokio::test]
    async fn reset_removes_entry_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        let key = DeviceKey::named("lab");
        let session = store
            .get_or_create(&key, |_| Ok(reqwest::Client::new()))
            .unwrap();
        session.state.lock().await.seid = Some("123456789".into());
        assert!(store.cookie_jar_path(&key).exists());

        store.reset(&key).await.unwrap();

        assert!(store.get(&key).is_none());
        assert!(!store.cookie_jar_path(&key).exists());
        assert_eq!(session.seid().await, None);
    }

    #[tokio::test]
    async fn late_response_on_reset_session_leaves_new_jar_clean() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        let key = DeviceKey::named("lab");
        let old = store
            .get_or_create(&key, |_| Ok(reqwest::Client::new()))
            .unwrap();
        old.jar().insert("SESSION", "before-reset");
        old.jar().persist().unwrap();

        store.reset(&key).await.unwrap();
        // A request that was in flight during the reset now completes.
        old.jar().persist().unwrap();
        assert!(!store.cookie_jar_path(&key).exists());

        let fresh = store
            .get_or_create(&key, |_| Ok(reqwest::Client::new()))
            .unwrap();
        assert!(!Arc::ptr_eq(&old, &fresh));
        assert_eq!(fresh.jar().get("SESSION"), None);
    }
}
