// Transport configuration and request description
//
// `TransportConfig` builds the per-device `reqwest::Client`; `DeviceRequest`
// describes one exchange with the switch. The switch's CGI handlers check
// for browser-looking requests, so requests carry one of a few header
// profiles copied from what the stock web UI sends.

use std::sync::Arc;

use reqwest::Method;

use crate::cookies::PersistentCookieJar;
use crate::diagnostics::Diagnostics;
use crate::error::Error;

/// Default `User-Agent` sent to the switch.
pub const DEFAULT_USER_AGENT: &str = "PlanetAPI/1.0 (+reqwest)";

/// Content type for bodies that don't declare their own.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

/// Content type the web UI uses for field writes.
pub const TEXT_CONTENT_TYPE: &str = "text/plain;charset=UTF-8";

/// Shared transport settings for every device session.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub user_agent: String,
    /// Accept self-signed certificates on HTTPS management ports.
    pub accept_invalid_certs: bool,
    pub diagnostics: Diagnostics,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            accept_invalid_certs: true,
            diagnostics: Diagnostics::disabled(),
        }
    }
}

impl TransportConfig {
    /// Build a client whose cookies go through `jar`.
    ///
    /// Timeouts are applied per request from the device profile, so one
    /// client serves a device even if its profile changes.
    pub fn build_client(&self, jar: Arc<PersistentCookieJar>) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .user_agent(self.user_agent.clone())
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .redirect(reqwest::redirect::Policy::limited(10))
            .cookie_provider(jar)
            .build()
            .map_err(|e| Error::ClientBuild(e.to_string()))
    }
}

/// Query string of a device request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Query {
    #[default]
    None,
    /// Appended verbatim. Field selectors (`R=a$;b$;`) must reach the
    /// switch byte-for-byte.
    Raw(String),
    /// Form-encoded `key=value` pairs.
    Pairs(Vec<(String, String)>),
}

impl Query {
    /// Whether the query already names a `seid`.
    pub(crate) fn has_seid(&self) -> bool {
        match self {
            Self::None => false,
            Self::Raw(raw) => raw.to_ascii_lowercase().contains("seid="),
            Self::Pairs(pairs) => pairs.iter().any(|(k, _)| k == "seid"),
        }
    }

    /// Render to a query string (no leading `?`), appending `seid` if given.
    pub(crate) fn render(&self, seid: Option<&str>) -> String {
        let seid = seid.filter(|_| !self.has_seid());
        let mut out = match self {
            Self::None => String::new(),
            Self::Raw(raw) => raw.trim_start_matches('?').to_owned(),
            Self::Pairs(pairs) => url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs)
                .finish(),
        };
        if let Some(seid) = seid {
            if !out.is_empty() {
                out.push('&');
            }
            out.push_str("seid=");
            out.extend(url::form_urlencoded::byte_serialize(seid.as_bytes()));
        }
        out
    }
}

/// Browser header set to attach, named after the web UI page that would
/// have issued the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderProfile {
    /// Plain request: only the defaults.
    Plain,
    /// XHR read from `page`. Referer carries the SEID.
    Read { page: String },
    /// XHR field write from `page`. Referer without SEID, plus `Origin`.
    Write { page: String },
    /// XHR save/commit from `page`. Like `Read` but without the SEID.
    Save { page: String },
}

/// One exchange with the switch.
#[derive(Debug, Clone)]
pub struct DeviceRequest {
    pub method: Method,
    pub path: String,
    pub query: Query,
    pub body: Option<String>,
    pub headers: HeaderProfile,
}

impl DeviceRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Query::None,
            body: None,
            headers: HeaderProfile::Plain,
        }
    }

    pub fn post(path: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            query: Query::None,
            body: Some(body.into()),
            headers: HeaderProfile::Plain,
        }
    }

    pub fn raw_query(mut self, query: impl Into<String>) -> Self {
        self.query = Query::Raw(query.into());
        self
    }

    pub fn query_pairs<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query = Query::Pairs(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn read_from(mut self, page: impl Into<String>) -> Self {
        self.headers = HeaderProfile::Read { page: page.into() };
        self
    }

    pub fn write_from(mut self, page: impl Into<String>) -> Self {
        self.headers = HeaderProfile::Write { page: page.into() };
        self
    }

    pub fn save_from(mut self, page: impl Into<String>) -> Self {
        self.headers = HeaderProfile::Save { page: page.into() };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_query_is_kept_verbatim_and_gains_seid() {
        let q = Query::Raw("R=mac$;fwversion$;".into());
        assert_eq!(q.render(None), "R=mac$;fwversion$;");
        assert_eq!(
            q.render(Some("123456789")),
            "R=mac$;fwversion$;&seid=123456789"
        );
    }

    #[test]
    fn existing_seid_is_not_duplicated() {
        let q = Query::Pairs(vec![("seid".into(), "111111111".into())]);
        assert_eq!(q.render(Some("222222222")), "seid=111111111");
        let raw = Query::Raw("R=undefined&SEID=1".into());
        assert_eq!(raw.render(Some("2")), "R=undefined&SEID=1");
    }

    #[test]
    fn empty_query_becomes_seid_only() {
        assert_eq!(Query::None.render(Some("123456789")), "seid=123456789");
        assert_eq!(Query::None.render(None), "");
    }
}
