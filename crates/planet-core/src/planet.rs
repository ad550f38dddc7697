// ── Planet facade ──
//
// Entry point for consumers. Owns the device registry and the session-
// aware client, resolves targets, and funnels every operation through
// `guard` so callers only ever see an `OperationResult`. The operations
// themselves live in `crate::ops`, one `impl Planet` block per area.

use std::future::Future;
use std::sync::Arc;

use indexmap::IndexMap;
use planet_api::codec::{encode_write_frame, is_acknowledged};
use planet_api::{Device, DeviceKey, DeviceProfile, DeviceRequest, PlanetClient, SessionStore};
use tracing::{debug, warn};

use crate::config::PlanetConfig;
use crate::error::CoreError;
use crate::registry::{DeviceRegistry, DeviceTarget};
use crate::result::{Operation, OperationFailure, OperationResult};

pub(crate) const SAVE_PATH: &str = "/cgi-bin/save.cgi";
pub(crate) const SAVE_PAGE: &str = "sysinfo.htm";

/// Query the firmware expects on parameterless commands.
pub(crate) const UNDEFINED_QUERY: &str = "R=undefined";

/// Cheaply cloneable handle; clones share registry and sessions.
#[derive(Clone)]
pub struct Planet {
    inner: Arc<PlanetInner>,
}

struct PlanetInner {
    config: PlanetConfig,
    registry: DeviceRegistry,
    client: PlanetClient,
}

impl Planet {
    /// Build a facade with its own session store.
    pub fn new(config: PlanetConfig) -> Self {
        let store = match &config.cookie_dir {
            Some(dir) => SessionStore::new(dir.clone()),
            None => SessionStore::in_temp_dir(),
        };
        Self::with_session_store(config, Arc::new(store))
    }

    /// Build a facade on a caller-owned session store.
    pub fn with_session_store(config: PlanetConfig, store: Arc<SessionStore>) -> Self {
        let client = PlanetClient::new(store, config.transport.clone());
        Self {
            inner: Arc::new(PlanetInner {
                config,
                registry: DeviceRegistry::new(),
                client,
            }),
        }
    }

    pub fn config(&self) -> &PlanetConfig {
        &self.inner.config
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.inner.registry
    }

    pub fn client(&self) -> &PlanetClient {
        &self.inner.client
    }

    // ── Registry ─────────────────────────────────────────────────────

    pub fn register_device(&self, id: &str, profile: DeviceProfile) -> Result<(), CoreError> {
        self.inner.registry.register(id, profile)
    }

    /// Forget a named device and drop its session and cookie jar.
    pub async fn unregister_device(&self, id: &str) -> Result<Option<DeviceProfile>, CoreError> {
        let Some(profile) = self.inner.registry.unregister(id) else {
            return Ok(None);
        };
        self.inner.client.reset_session(&DeviceKey::named(id)).await?;
        Ok(Some(profile))
    }

    pub fn device(&self, id: &str) -> Option<DeviceProfile> {
        self.inner.registry.get(id)
    }

    // ── Shared plumbing for operations ───────────────────────────────

    /// Run `work` and fold any error into a failure record.
    pub(crate) async fn guard<T, F>(operation: Operation, work: F) -> OperationResult<T>
    where
        F: Future<Output = Result<T, CoreError>>,
    {
        match work.await {
            Ok(data) => OperationResult::success(operation, data),
            Err(e) => Self::failure(operation, &e),
        }
    }

    pub(crate) fn failure<T>(operation: Operation, err: &CoreError) -> OperationResult<T> {
        let code = err.code();
        let context = err.context();
        warn!(
            %operation,
            error = %err,
            code,
            endpoint = context.as_ref().map(|c| c.endpoint.as_str()),
            "operation failed"
        );
        OperationResult::Failure(OperationFailure {
            operation,
            message: err.to_string(),
            code,
            context,
        })
    }

    /// Resolve `target` and make sure it has a live session.
    pub(crate) async fn connect(&self, target: &DeviceTarget) -> Result<Device, CoreError> {
        let device = self.inner.registry.resolve(target)?;
        self.inner.client.ensure_session(&device).await?;
        Ok(device)
    }

    pub(crate) async fn fetch_text(
        &self,
        device: &Device,
        request: DeviceRequest,
    ) -> Result<String, CoreError> {
        Ok(self.inner.client.request_text(device, &request).await?)
    }

    /// POST a `W=` frame from `page` and report whether the switch said OK.
    /// An empty set of pairs writes nothing and counts as not acknowledged.
    pub(crate) async fn write_fields(
        &self,
        device: &Device,
        endpoint: &str,
        page: &str,
        pairs: &IndexMap<String, String>,
    ) -> Result<bool, CoreError> {
        if pairs.is_empty() {
            return Ok(false);
        }
        let request = DeviceRequest::post(endpoint, encode_write_frame(pairs)).write_from(page);
        let body = self.fetch_text(device, request).await?;
        let acknowledged = is_acknowledged(&body);
        debug!(device = %device.key, endpoint, acknowledged, "field write");
        Ok(acknowledged)
    }

    /// Commit the running configuration. Safe to repeat.
    pub(crate) async fn commit(&self, device: &Device) -> Result<bool, CoreError> {
        self.inner.client.ensure_session(device).await?;
        let request = DeviceRequest::get(SAVE_PATH)
            .raw_query(UNDEFINED_QUERY)
            .save_from(SAVE_PAGE);
        let body = self.fetch_text(device, request).await?;
        Ok(is_acknowledged(body.trim()))
    }

    /// Write, then save if the write was acknowledged.
    pub(crate) async fn write_and_commit(
        &self,
        device: &Device,
        endpoint: &str,
        page: &str,
        pairs: &IndexMap<String, String>,
    ) -> Result<bool, CoreError> {
        if !self.write_fields(device, endpoint, page, pairs).await? {
            return Ok(false);
        }
        self.commit(device).await
    }
}
