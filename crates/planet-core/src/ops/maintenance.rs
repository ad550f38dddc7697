// ── Maintenance operations ──
//
// Save, reboot, configuration backup, and login credential rotation.

use indexmap::IndexMap;
use planet_api::DeviceRequest;
use planet_api::codec::{decode_key_value_line, is_acknowledged, sanitize_value};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;

use crate::error::CoreError;
use crate::model::BackupArchive;
use crate::model::system::BACKUP_ARCHIVE_PATH;
use crate::planet::{Planet, UNDEFINED_QUERY};
use crate::registry::DeviceTarget;
use crate::result::{Operation, OperationResult};

const REBOOT_PATH: &str = "/cgi-bin/reboot.cgi";
const BACKUP_PATH: &str = "/cgi-bin/back.cgi";
const ACCOUNT_PATH: &str = "/cgi-bin/account.cgi";

/// Status the backup kickoff reports once the archive is ready.
const BACKUP_READY: &str = "bktar";

/// Outcome of a credential change.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialUpdate {
    /// Both the account write and the follow-up save were acknowledged.
    pub saved: bool,
    pub username: String,
    /// Password as the switch stored it.
    #[serde(skip)]
    pub password: SecretString,
    /// Target to use from now on. For named devices this is unchanged
    /// (the registry entry was updated); inline profiles get a new one.
    #[serde(skip)]
    pub target: DeviceTarget,
}

impl Planet {
    /// Commit the running configuration to flash.
    pub async fn save(&self, target: &DeviceTarget) -> OperationResult<bool> {
        Self::guard(Operation::Save, async {
            let device = self.registry().resolve(target)?;
            self.commit(&device).await
        })
        .await
    }

    /// Restart the switch. The firmware may drop the connection before it
    /// answers, so an empty body counts as success too.
    pub async fn reboot(&self, target: &DeviceTarget) -> OperationResult<bool> {
        Self::guard(Operation::Reboot, async {
            let device = self.connect(target).await?;
            let request = DeviceRequest::get(REBOOT_PATH).raw_query(UNDEFINED_QUERY);
            let body = self.fetch_text(&device, request).await?;
            Ok(body.trim().is_empty() || is_acknowledged(&body))
        })
        .await
    }

    /// Ask the switch to pack its configuration, then download the archive.
    pub async fn backup(&self, target: &DeviceTarget) -> OperationResult<BackupArchive> {
        Self::guard(Operation::Backup, async {
            let device = self.connect(target).await?;
            let kickoff = DeviceRequest::get(BACKUP_PATH)
                .raw_query(UNDEFINED_QUERY)
                .read_from("backup.htm");
            let body = self.fetch_text(&device, kickoff).await?;
            check_backup_status(body.trim())?;

            let archive = self
                .client()
                .request(&device, &DeviceRequest::get(BACKUP_ARCHIVE_PATH))
                .await?;
            debug!(device = %device.key, bytes = archive.len(), "backup archive fetched");
            Ok(BackupArchive::new(archive))
        })
        .await
    }

    /// Change the switch's web login.
    ///
    /// On an acknowledged write the stored profile is updated (registry for
    /// named devices, a fresh inline target otherwise), the old session is
    /// dropped, and the save is retried under the configured policy while
    /// the switch refuses connections.
    pub async fn set_credentials(
        &self,
        target: &DeviceTarget,
        username: &str,
        password: SecretString,
    ) -> OperationResult<CredentialUpdate> {
        Self::guard(Operation::SetCredentials, async {
            let device = self.connect(target).await?;

            // Store exactly what the switch receives.
            let username = sanitize_value(username);
            let password = SecretString::from(sanitize_value(password.expose_secret()));
            let pairs = IndexMap::from([
                ("User".to_owned(), username.clone()),
                ("Password".to_owned(), password.expose_secret().to_owned()),
            ]);
            let written = self
                .write_fields(&device, ACCOUNT_PATH, "system_account.htm", &pairs)
                .await?;
            if !written {
                return Ok(CredentialUpdate {
                    saved: false,
                    username: device.profile.username.clone(),
                    password: device.profile.password.clone(),
                    target: target.clone(),
                });
            }

            let updated = match target {
                DeviceTarget::Named(id) => {
                    self.registry()
                        .update_credentials(id, &username, password.clone())
                        .ok_or_else(|| CoreError::UnknownDevice { id: id.clone() })?;
                    target.clone()
                }
                DeviceTarget::Inline(profile) => {
                    DeviceTarget::Inline(profile.with_credentials(username.clone(), password.clone()))
                }
            };

            self.client().reset_session(&device.key).await?;
            let next = self.registry().resolve(&updated)?;
            debug!(device = %next.key, "credentials changed, saving with new login");

            let planet = self;
            let next_ref = &next;
            let saved = self
                .config()
                .credential_retry
                .run(
                    move || async move { planet.commit(next_ref).await },
                    CoreError::is_connection,
                )
                .await?;

            Ok(CredentialUpdate {
                saved,
                username,
                password,
                target: updated,
            })
        })
        .await
    }
}

fn check_backup_status(body: &str) -> Result<(), CoreError> {
    if body.is_empty() {
        return Err(CoreError::application(
            "Backup request returned an empty response.",
        ));
    }
    let params = decode_key_value_line(body);
    match params.get("back") {
        None => Err(CoreError::application(
            "Backup response did not include a status token.",
        )),
        Some(status) if status == BACKUP_READY => Ok(()),
        Some(status) => Err(CoreError::application(format!(
            "Unexpected backup status value \"{status}\"."
        ))),
    }
}
