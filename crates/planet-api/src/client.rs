// Device HTTP client
//
// Wraps `reqwest` with the switch's session mechanics: lazy login
// handshake, SEID injection (query parameter and cookie), per-device
// cookie persistence, browser-like headers, and failure classification.
// Operation semantics live in `planet-core`; this module only moves bytes.

use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE, ORIGIN, PRAGMA, REFERER};
use secrecy::ExposeSecret;
use serde_json::json;
use tracing::{debug, trace};

use crate::device::{Device, DeviceKey};
use crate::diagnostics::body_preview;
use crate::error::Error;
use crate::session::{DeviceSession, SessionPhase, SessionStore, generate_seid};
use crate::transport::{
    DeviceRequest, FORM_CONTENT_TYPE, HeaderProfile, TEXT_CONTENT_TYPE, TransportConfig,
};

/// Landing page fetched to obtain the initial session cookie.
pub const PROBE_PATH: &str = "/";

/// Login handshake endpoint; receives the freshly generated SEID.
pub const LOGIN_PATH: &str = "/cgi-bin/login.cgi";

/// Name of the SEID query parameter and cookie.
pub const SEID_NAME: &str = "seid";

/// Session-aware HTTP client for PLANET switches.
///
/// Cheap to clone; clones share the same [`SessionStore`].
#[derive(Clone)]
pub struct PlanetClient {
    store: Arc<SessionStore>,
    config: TransportConfig,
}

impl PlanetClient {
    pub fn new(store: Arc<SessionStore>, config: TransportConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    // ── Session lifecycle ────────────────────────────────────────────

    /// Make sure `device` has a ready session, logging in if needed.
    ///
    /// A ready session returns immediately. Otherwise the landing page is
    /// fetched, a new SEID is generated, and the login handshake is sent.
    /// Concurrent callers for the same device wait on one handshake. Any
    /// failure drops back to `Uninitialized` so the next call retries.
    pub async fn ensure_session(&self, device: &Device) -> Result<(), Error> {
        let session = self.session(device)?;
        let mut state = session.state.lock().await;

        if state.is_ready() {
            return Ok(());
        }

        debug!(device = %device.key, "initializing new session");
        let diag = &self.config.diagnostics;
        diag.emit("Initializing new session", &json!({ "key": device.key.as_str() }));

        state.phase = SessionPhase::Probing;
        let probe = DeviceRequest::get(PROBE_PATH);
        if let Err(e) = self.dispatch(device, &session, None, &probe).await {
            state.clear();
            return Err(e);
        }

        let seid = generate_seid();
        state.seid = Some(seid.clone());
        state.phase = SessionPhase::HandshakeSent;
        diag.emit(
            "Performing login handshake",
            &json!({ "key": device.key.as_str(), "seid": seid }),
        );
        let login = DeviceRequest::get(LOGIN_PATH).query_pairs([(SEID_NAME, seid.as_str())]);
        if let Err(e) = self.dispatch(device, &session, Some(&seid), &login).await {
            state.clear();
            return Err(e);
        }

        state.phase = SessionPhase::Ready;
        debug!(device = %device.key, "session initialized");
        diag.emit("Session initialized", &json!({ "key": device.key.as_str() }));
        Ok(())
    }

    /// Drop session state for `key` and delete its cookie jar.
    pub async fn reset_session(&self, key: &DeviceKey) -> Result<(), Error> {
        self.store.reset(key).await
    }

    /// Current session phase for `key` (`Uninitialized` if never seen).
    pub async fn session_phase(&self, key: &DeviceKey) -> SessionPhase {
        match self.store.get(key) {
            Some(session) => session.phase().await,
            None => SessionPhase::Uninitialized,
        }
    }

    /// Current SEID for `key`, if a handshake has produced one.
    pub async fn session_token(&self, key: &DeviceKey) -> Option<String> {
        self.store.get(key)?.seid().await
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// Perform a request and return the raw body.
    pub async fn request(&self, device: &Device, req: &DeviceRequest) -> Result<Bytes, Error> {
        let session = self.session(device)?;
        let seid = session.seid().await;
        self.dispatch(device, &session, seid.as_deref(), req).await
    }

    /// Perform a request and return the body as (lossy) UTF-8 text.
    pub async fn request_text(&self, device: &Device, req: &DeviceRequest) -> Result<String, Error> {
        let body = self.request(device, req).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    fn session(&self, device: &Device) -> Result<Arc<DeviceSession>, Error> {
        self.store
            .get_or_create(&device.key, |jar| self.config.build_client(jar))
    }

    /// Send one request on `session`. Does not take the session lock, so
    /// `ensure_session` can call it while holding that lock.
    async fn dispatch(
        &self,
        device: &Device,
        session: &DeviceSession,
        seid: Option<&str>,
        req: &DeviceRequest,
    ) -> Result<Bytes, Error> {
        let profile = &device.profile;
        let label = device.label();
        let endpoint = req.path.as_str();
        let diag = &self.config.diagnostics;

        let query = req.query.render(seid);
        let mut url = format!("{}{}", profile.base(), endpoint);
        if !query.is_empty() {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&query);
        }
        let url = url::Url::parse(&url)?;

        session.jar.reload()?;
        if let Some(seid) = seid {
            session.jar.insert(SEID_NAME, seid);
        }

        debug!(method = %req.method, %url, "issuing request");
        diag.emit(
            "Issuing request",
            &json!({
                "method": req.method.as_str(),
                "url": url.as_str(),
                "has_query": !query.is_empty(),
                "has_payload": req.body.is_some(),
                "cookie_jar": session.jar.path().display().to_string(),
            }),
        );

        let mut builder = session
            .http
            .request(req.method.clone(), url)
            .timeout(profile.timeout)
            .basic_auth(&profile.username, Some(profile.password.expose_secret()))
            .header(ACCEPT, "*/*");

        builder = self.apply_header_profile(builder, device, seid, &req.headers);

        if let Some(body) = &req.body {
            if !matches!(req.headers, HeaderProfile::Write { .. }) {
                builder = builder.header(CONTENT_TYPE, FORM_CONTENT_TYPE);
            }
            builder = builder.body(body.clone());
        }

        let response = match builder.send().await {
            Ok(resp) => resp,
            Err(e) => return Err(self.connection_error(&label, endpoint, e)),
        };

        let status = response.status();
        if diag.is_enabled() {
            let headers: Vec<String> = response
                .headers()
                .iter()
                .map(|(name, value)| format!("{name}: {}", value.to_str().unwrap_or("<binary>")))
                .collect();
            diag.emit(
                "Response headers",
                &json!({ "headers": headers.join("\n"), "system": label, "endpoint": endpoint }),
            );
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => return Err(self.connection_error(&label, endpoint, e)),
        };
        session.jar.persist()?;

        trace!(status = status.as_u16(), len = body.len(), "response received");
        diag.emit(
            "Response received",
            &json!({
                "status": status.as_u16(),
                "body_length": body.len(),
                "body_preview": body_preview(&body),
                "system": label,
                "endpoint": endpoint,
            }),
        );

        if status.as_u16() >= 400 {
            return Err(Error::Http {
                status: status.as_u16(),
                device: label,
                endpoint: endpoint.to_owned(),
            });
        }

        Ok(body)
    }

    fn apply_header_profile(
        &self,
        builder: reqwest::RequestBuilder,
        device: &Device,
        seid: Option<&str>,
        profile: &HeaderProfile,
    ) -> reqwest::RequestBuilder {
        let base = device.profile.base();
        let referer = |page: &str, with_seid: bool| {
            let mut url = format!("{base}/{}", page.trim_start_matches('/'));
            if let Some(seid) = seid.filter(|_| with_seid) {
                url.push(if url.contains('?') { '&' } else { '?' });
                url.push_str("seid=");
                url.extend(url::form_urlencoded::byte_serialize(seid.as_bytes()));
            }
            url
        };

        match profile {
            HeaderProfile::Plain => builder,
            HeaderProfile::Read { page } => xhr_no_cache(builder).header(REFERER, referer(page, true)),
            HeaderProfile::Save { page } => {
                xhr_no_cache(builder).header(REFERER, referer(page, false))
            }
            HeaderProfile::Write { page } => builder
                .header("X-Requested-With", "XMLHttpRequest")
                .header(CONTENT_TYPE, TEXT_CONTENT_TYPE)
                .header(REFERER, referer(page, false))
                .header(ORIGIN, base),
        }
    }

    fn connection_error(&self, label: &str, endpoint: &str, source: reqwest::Error) -> Error {
        let err = Error::connection(label, endpoint, source);
        if let Error::Connection { code, message, .. } = &err {
            debug!(device = label, endpoint, ?code, "connection failure: {message}");
            self.config.diagnostics.emit(
                "Connection error",
                &json!({ "message": message, "errno": code, "system": label, "endpoint": endpoint }),
            );
        }
        err
    }
}

fn xhr_no_cache(builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    builder
        .header("X-Requested-With", "XMLHttpRequest")
        .header(CACHE_CONTROL, "no-cache")
        .header(PRAGMA, "no-cache")
}
