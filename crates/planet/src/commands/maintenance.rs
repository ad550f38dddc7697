//! Save, reboot, credential, and backup handlers.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use planet_core::{BackupArchive, DeviceTarget, Planet};
use secrecy::SecretString;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::cli::{BackupArgs, CredentialsArgs, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output::{self, detail_lines};

use super::util;

pub async fn save(planet: &Planet, target: &DeviceTarget, global: &GlobalOpts) -> Result<(), CliError> {
    let saved = util::data(planet.save(target).await)?;
    util::require_ack(saved, "save")?;
    output::success("Configuration saved", global.quiet);
    Ok(())
}

pub async fn reboot(
    planet: &Planet,
    target: &DeviceTarget,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if !util::confirm("Reboot the switch? Unsaved changes are lost.", "reboot", global.yes)? {
        return Ok(());
    }
    let accepted = util::data(planet.reboot(target).await)?;
    util::require_ack(accepted, "reboot")?;
    output::success("Reboot initiated", global.quiet);
    Ok(())
}

// ── Credentials ─────────────────────────────────────────────────────

pub async fn credentials(
    planet: &Planet,
    target: &DeviceTarget,
    args: CredentialsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let password = match args.new_password {
        Some(pw) => SecretString::from(pw),
        None => config::prompt_password("New password: ", "the new login")?,
    };

    let update = util::data(
        planet
            .set_credentials(target, &args.new_username, password)
            .await,
    )?;
    util::require_ack(update.saved, "credential change")?;
    output::success(
        &format!("Login changed to '{}' and saved", update.username),
        global.quiet,
    );

    if let DeviceTarget::Named(name) = target {
        remember_password(name, &update.password, global);
    }
    Ok(())
}

/// Keep a keyring-backed device entry usable after its password changed.
fn remember_password(name: &str, password: &SecretString, global: &GlobalOpts) {
    let cfg = planet_config::load_config_or_default();
    let Some(entry) = cfg.devices.get(name) else {
        return;
    };

    if entry.password.is_none() && entry.password_env.is_none() {
        match planet_config::store_password(name, password) {
            Ok(()) => output::success("Keyring entry updated", global.quiet),
            Err(e) => tracing::warn!(device = name, error = %e, "could not update keyring"),
        }
    } else if !global.quiet {
        eprintln!(
            "Note: device '{name}' reads its password from the config file or environment; \
             update it there before the next run."
        );
    }
}

// ── Backup ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct SavedBackup {
    path: PathBuf,
    size: usize,
    sha256: String,
    fetched_at: DateTime<Utc>,
}

fn backup_file_name(fetched_at: &DateTime<Utc>) -> String {
    format!("planet_backup_{}.tar.gz", fetched_at.format("%Y%m%d_%H%M%S"))
}

fn write_archive(archive: &BackupArchive, dir: &Path) -> Result<SavedBackup, CliError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(backup_file_name(&archive.fetched_at));
    std::fs::write(&path, &archive.bytes)?;
    Ok(SavedBackup {
        path,
        size: archive.size,
        sha256: hex::encode(Sha256::digest(&archive.bytes)),
        fetched_at: archive.fetched_at,
    })
}

pub async fn backup(
    planet: &Planet,
    target: &DeviceTarget,
    args: &BackupArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let archive = util::data(planet.backup(target).await)?;
    let saved = write_archive(&archive, &args.dir)?;

    let out = output::render_single(&global.output, &saved, |s| {
        detail_lines(&[
            ("File", s.path.display().to_string()),
            ("Size", format!("{} bytes", s.size)),
            ("SHA-256", s.sha256.clone()),
        ])
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn backup_names_use_the_fetch_time() {
        let at = Utc.with_ymd_and_hms(2026, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(backup_file_name(&at), "planet_backup_20260309_140507.tar.gz");
    }

    #[test]
    fn archive_is_written_with_its_digest() {
        let dir = tempfile::tempdir().unwrap();
        let fetched_at = Utc.with_ymd_and_hms(2026, 3, 9, 14, 5, 7).unwrap();
        let archive = BackupArchive {
            fetched_at,
            ..BackupArchive::new(bytes::Bytes::from_static(b"abc"))
        };

        let saved = write_archive(&archive, &dir.path().join("out")).unwrap();

        assert_eq!(
            saved.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(saved.size, 3);
        assert_eq!(
            saved.path,
            dir.path().join("out").join("planet_backup_20260309_140507.tar.gz")
        );
        assert_eq!(std::fs::read(&saved.path).unwrap(), b"abc");
    }
}
