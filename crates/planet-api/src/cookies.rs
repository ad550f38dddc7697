// On-disk cookie jar
//
// One jar per device key. reqwest's built-in `Jar` lives only in memory,
// so this store implements `CookieStore` over a small JSON file that is
// reloaded before each request and written back after each response.
// Every jar talks to exactly one host, so cookies are keyed by name alone.
// A retired jar keeps serving its in-memory cookies but never writes the
// file again.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

use cookie::Cookie;
use cookie::time::{Duration as CookieAge, OffsetDateTime};
use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use tracing::trace;
use url::Url;

use crate::error::Error;

/// File-backed cookie store for a single device.
#[derive(Debug)]
pub struct PersistentCookieJar {
    path: PathBuf,
    cookies: RwLock<BTreeMap<String, String>>,
    /// Held across every file write; `true` once the jar is retired.
    retired: Mutex<bool>,
}

impl PersistentCookieJar {
    /// Open the jar at `path`, creating an empty file if none exists.
    pub fn open(path: PathBuf) -> Result<Self, Error> {
        let jar = Self {
            path,
            cookies: RwLock::new(BTreeMap::new()),
            retired: Mutex::new(false),
        };
        if jar.path.exists() {
            jar.reload()?;
        } else {
            if let Some(parent) = jar.path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| jar.io_error(e))?;
            }
            std::fs::write(&jar.path, b"").map_err(|e| jar.io_error(e))?;
        }
        Ok(jar)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the in-memory cookies with what is on disk.
    ///
    /// A missing or empty file means "no cookies". A file that isn't valid
    /// JSON is treated the same way: the next `persist` overwrites it.
    pub fn reload(&self) -> Result<(), Error> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(self.io_error(e)),
        };
        let loaded: BTreeMap<String, String> = if raw.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_json::from_str(&raw).unwrap_or_default()
        };
        *self.cookies.write().unwrap_or_else(PoisonError::into_inner) = loaded;
        Ok(())
    }

    /// Write the current cookies back to disk. A no-op once retired.
    pub fn persist(&self) -> Result<(), Error> {
        let retired = self.retired.lock().unwrap_or_else(PoisonError::into_inner);
        if *retired {
            trace!(jar = %self.path.display(), "skipping persist on retired jar");
            return Ok(());
        }
        let snapshot = self
            .cookies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let raw = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| self.io_error(std::io::Error::other(e)))?;
        std::fs::write(&self.path, raw).map_err(|e| self.io_error(e))
    }

    /// Stop writing to the backing file and delete it.
    ///
    /// Waits for any in-progress `persist` to finish first.
    pub fn retire(&self) -> Result<(), Error> {
        let mut retired = self.retired.lock().unwrap_or_else(PoisonError::into_inner);
        *retired = true;
        Self::delete_file(&self.path)
    }

    pub fn is_retired(&self) -> bool {
        *self.retired.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set a cookie directly (the session token is injected this way).
    pub fn insert(&self, name: &str, value: &str) {
        self.cookies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_owned(), value.to_owned());
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.cookies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Remove the backing file. Missing files are fine.
    pub fn delete_file(path: &Path) -> Result<(), Error> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(Error::CookieJar {
                path: path.to_owned(),
                source,
            }),
        }
    }

    fn io_error(&self, source: std::io::Error) -> Error {
        Error::CookieJar {
            path: self.path.clone(),
            source,
        }
    }
}

impl CookieStore for PersistentCookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let mut cookies = self.cookies.write().unwrap_or_else(PoisonError::into_inner);
        for header in cookie_headers {
            let Ok(raw) = header.to_str() else {
                continue;
            };
            let Some((name, value, expired)) = parse_set_cookie(raw) else {
                continue;
            };
            trace!(cookie = %name, expired, host = url.host_str(), "device set cookie");
            if expired {
                cookies.remove(&name);
            } else {
                cookies.insert(name, value);
            }
        }
    }

    fn cookies(&self, _url: &Url) -> Option<HeaderValue> {
        let cookies = self.cookies.read().unwrap_or_else(PoisonError::into_inner);
        if cookies.is_empty() {
            return None;
        }
        let line = cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        HeaderValue::from_str(&line).ok()
    }
}

/// Pull `name`, `value`, and whether the cookie is being cleared out of a
/// `Set-Cookie` header. `Max-Age` wins over `Expires` when both are set.
fn parse_set_cookie(raw: &str) -> Option<(String, String, bool)> {
    let parsed = Cookie::parse(raw).ok()?;
    let expired = match parsed.max_age() {
        Some(age) => age <= CookieAge::ZERO,
        None => parsed
            .expires_datetime()
            .is_some_and(|at| at <= OffsetDateTime::now_utc()),
    };
    Some((parsed.name().to_owned(), parsed.value().to_owned(), expired))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn open_creates_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("jar.cookie");
        let jar = PersistentCookieJar::open(path.clone()).unwrap();
        assert!(path.exists());
        assert!(jar.cookies(&Url::parse("http://sw/").unwrap()).is_none());
    }

    #[test]
    fn cookies_survive_persist_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jar.cookie");
        let url = Url::parse("http://sw/").unwrap();

        let jar = PersistentCookieJar::open(path.clone()).unwrap();
        let header = HeaderValue::from_static("SESSION=abc; Path=/; HttpOnly");
        jar.set_cookies(&mut std::iter::once(&header), &url);
        jar.insert("seid", "123456789");
        jar.persist().unwrap();

        let reopened = PersistentCookieJar::open(path).unwrap();
        let line = reopened.cookies(&url).unwrap();
        assert_eq!(line.to_str().unwrap(), "SESSION=abc; seid=123456789");
    }

    #[test]
    fn max_age_zero_removes_cookie() {
        let dir = tempfile::tempdir().unwrap();
        let jar = PersistentCookieJar::open(dir.path().join("jar.cookie")).unwrap();
        let url = Url::parse("http://sw/").unwrap();
        jar.insert("SESSION", "abc");
        let header = HeaderValue::from_static("SESSION=; Max-Age=0");
        jar.set_cookies(&mut std::iter::once(&header), &url);
        assert_eq!(jar.get("SESSION"), None);
    }

    #[test]
    fn past_expires_removes_cookie() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jar.cookie");
        let jar = PersistentCookieJar::open(path.clone()).unwrap();
        let url = Url::parse("http://sw/").unwrap();
        jar.insert("SESSION", "abc");

        let header = HeaderValue::from_static(
            "SESSION=deleted; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Path=/",
        );
        jar.set_cookies(&mut std::iter::once(&header), &url);
        jar.persist().unwrap();

        assert_eq!(jar.get("SESSION"), None);
        assert!(jar.cookies(&url).is_none());
        let reopened = PersistentCookieJar::open(path).unwrap();
        assert_eq!(reopened.get("SESSION"), None);
    }

    #[test]
    fn future_expires_keeps_cookie() {
        let dir = tempfile::tempdir().unwrap();
        let jar = PersistentCookieJar::open(dir.path().join("jar.cookie")).unwrap();
        let url = Url::parse("http://sw/").unwrap();
        let header =
            HeaderValue::from_static("SESSION=abc; Expires=Fri, 01 Jan 2100 00:00:00 GMT");
        jar.set_cookies(&mut std::iter::once(&header), &url);
        assert_eq!(jar.get("SESSION").as_deref(), Some("abc"));
    }

    #[test]
    fn max_age_overrides_expires() {
        let dir = tempfile::tempdir().unwrap();
        let jar = PersistentCookieJar::open(dir.path().join("jar.cookie")).unwrap();
        let url = Url::parse("http://sw/").unwrap();
        let header = HeaderValue::from_static(
            "SESSION=abc; Max-Age=3600; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
        );
        jar.set_cookies(&mut std::iter::once(&header), &url);
        assert_eq!(jar.get("SESSION").as_deref(), Some("abc"));
    }

    #[test]
    fn retired_jar_never_rewrites_its_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jar.cookie");
        let jar = PersistentCookieJar::open(path.clone()).unwrap();
        jar.insert("SESSION", "old");
        jar.persist().unwrap();

        jar.retire().unwrap();
        assert!(jar.is_retired());
        assert!(!path.exists());

        jar.insert("SESSION", "stale");
        jar.persist().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn delete_missing_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        PersistentCookieJar::delete_file(&dir.path().join("absent.cookie")).unwrap();
    }
}
