/*
 * zimplyd ZIMply service supervisor
 * Copyright (C) 2022 viridIT SAS
 *
 * This program is free software: you can redistribute it and/or modify it under
 * the terms of the GNU General Public License as published by the Free Software
 * Foundation, either version 3 of the License, or any later version.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT
 * ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
 * FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License along with
 * this program. If not, see https://www.gnu.org/licenses/.
 *
*/
use crate::log_channels;
use std::ffi::OsStr;
use zimplyd_common::{
    libc_abstraction::chown,
    re::{anyhow, libc, log},
};
use zimplyd_config::ConfigServerSystem;

/// Names of the account, group and state directory dedicated to the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAccount {
    ///
    pub user: String,
    ///
    pub group: String,
    /// home of the user, receives the search indexes
    pub state_dir: std::path::PathBuf,
}

impl From<&ConfigServerSystem> for ServiceAccount {
    fn from(system: &ConfigServerSystem) -> Self {
        Self {
            user: system.user.clone(),
            group: system.group.clone(),
            state_dir: system.state_dir.clone(),
        }
    }
}

/// The provisioned identity the server runs under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceIdentity {
    ///
    pub user: String,
    ///
    pub group: String,
    ///
    pub uid: libc::uid_t,
    ///
    pub gid: libc::gid_t,
    ///
    pub state_dir: std::path::PathBuf,
}

/// An entry of the account database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    ///
    pub uid: libc::uid_t,
    ///
    pub gid: libc::gid_t,
    ///
    pub home: std::path::PathBuf,
}

/// Lookup and creation of system accounts
pub trait AccountDatabase {
    /// id of the group, if it exists
    fn group_id(&self, name: &str) -> Option<libc::gid_t>;

    /// the user, if it exists
    fn user(&self, name: &str) -> Option<Account>;

    /// create a system group
    ///
    /// # Errors
    ///
    /// * the group cannot be created
    fn create_group(&mut self, name: &str) -> Result<(), ProvisionError>;

    /// create a non-interactive system user, whose primary group is `group`
    ///
    /// # Errors
    ///
    /// * the user cannot be created
    fn create_user(
        &mut self,
        name: &str,
        group: &str,
        home: &std::path::Path,
    ) -> Result<(), ProvisionError>;
}

/// The accounts of the host, created with `groupadd(8)` and `useradd(8)`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAccounts;

impl SystemAccounts {
    fn run(program: &str, args: &[&OsStr]) -> Result<(), ProvisionError> {
        let mut command = std::process::Command::new(program);
        command.args(args);

        log::trace!(target: log_channels::PROVISION, "running command: {:?}", command);

        let output = command.output().map_err(|e| ProvisionError::Command {
            program: program.to_string(),
            reason: e.to_string(),
        })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(ProvisionError::Command {
                program: program.to_string(),
                reason: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            })
        }
    }
}

impl AccountDatabase for SystemAccounts {
    fn group_id(&self, name: &str) -> Option<libc::gid_t> {
        users::get_group_by_name(name).map(|group| group.gid())
    }

    fn user(&self, name: &str) -> Option<Account> {
        users::get_user_by_name(name).map(|user| Account {
            uid: user.uid(),
            gid: user.primary_group_id(),
            home: users::os::unix::UserExt::home_dir(&user).to_path_buf(),
        })
    }

    fn create_group(&mut self, name: &str) -> Result<(), ProvisionError> {
        Self::run("groupadd", &[OsStr::new("--system"), OsStr::new(name)])
    }

    fn create_user(
        &mut self,
        name: &str,
        group: &str,
        home: &std::path::Path,
    ) -> Result<(), ProvisionError> {
        Self::run(
            "useradd",
            &[
                OsStr::new("--system"),
                OsStr::new("--gid"),
                OsStr::new(group),
                OsStr::new("--home-dir"),
                home.as_os_str(),
                OsStr::new("--no-create-home"),
                OsStr::new("--shell"),
                OsStr::new("/usr/sbin/nologin"),
                OsStr::new("--comment"),
                OsStr::new("ZIMply server"),
                OsStr::new(name),
            ],
        )
    }
}

/// Failure while provisioning the identity of the server
#[allow(clippy::module_name_repetitions)]
#[derive(Debug)]
pub enum ProvisionError {
    /// an account management command failed
    Command {
        ///
        program: String,
        ///
        reason: String,
    },
    /// the account or group is still missing after its creation
    NotFound {
        /// "user" or "group"
        kind: &'static str,
        ///
        name: String,
    },
    /// an existing account lives elsewhere than the state directory
    HomeMismatch {
        ///
        user: String,
        ///
        home: std::path::PathBuf,
        ///
        expected: std::path::PathBuf,
    },
    /// the state directory cannot be created or handed to the identity
    StateDirectory {
        ///
        path: std::path::PathBuf,
        ///
        source: anyhow::Error,
    },
}

impl std::error::Error for ProvisionError {}

impl std::fmt::Display for ProvisionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Command { program, reason } => write!(f, "'{}' failed: {}", program, reason),
            Self::NotFound { kind, name } => write!(f, "{} not found: '{}'", kind, name),
            Self::HomeMismatch {
                user,
                home,
                expected,
            } => write!(
                f,
                "home of '{}' is '{}', expected '{}'",
                user,
                home.display(),
                expected.display()
            ),
            Self::StateDirectory { path, source } => {
                write!(
                    f,
                    "cannot prepare state directory '{}': {:#}",
                    path.display(),
                    source
                )
            }
        }
    }
}

/// Ensure the group, the user and its state directory exist, creating only
/// what is missing.
///
/// # Errors
///
/// * see [ProvisionError]
pub fn provision_identity<A: AccountDatabase>(
    accounts: &mut A,
    account: &ServiceAccount,
) -> Result<ServiceIdentity, ProvisionError> {
    if accounts.group_id(&account.group).is_none() {
        log::info!(
            target: log_channels::PROVISION,
            "creating system group '{}'",
            account.group
        );
        accounts.create_group(&account.group)?;
    }
    let gid = accounts
        .group_id(&account.group)
        .ok_or_else(|| ProvisionError::NotFound {
            kind: "group",
            name: account.group.clone(),
        })?;

    if accounts.user(&account.user).is_none() {
        log::info!(
            target: log_channels::PROVISION,
            "creating system user '{}' in '{}'",
            account.user,
            account.state_dir.display()
        );
        accounts.create_user(&account.user, &account.group, &account.state_dir)?;
    }
    let user = accounts
        .user(&account.user)
        .ok_or_else(|| ProvisionError::NotFound {
            kind: "user",
            name: account.user.clone(),
        })?;

    if user.home != account.state_dir {
        return Err(ProvisionError::HomeMismatch {
            user: account.user.clone(),
            home: user.home,
            expected: account.state_dir.clone(),
        });
    }

    prepare_state_dir(&account.state_dir, user.uid, gid).map_err(|source| {
        ProvisionError::StateDirectory {
            path: account.state_dir.clone(),
            source,
        }
    })?;

    Ok(ServiceIdentity {
        user: account.user.clone(),
        group: account.group.clone(),
        uid: user.uid,
        gid,
        state_dir: account.state_dir.clone(),
    })
}

/// mode of the state directory
const STATE_DIR_MODE: u32 = 0o750;

fn prepare_state_dir(
    path: &std::path::Path,
    uid: libc::uid_t,
    gid: libc::gid_t,
) -> anyhow::Result<()> {
    use anyhow::Context;
    use std::os::unix::fs::{MetadataExt, PermissionsExt};

    std::fs::create_dir_all(path).context("cannot create the directory")?;

    let metadata = std::fs::metadata(path)?;
    if metadata.uid() != uid || metadata.gid() != gid {
        chown(path, Some(uid), Some(gid))?;
    }
    if metadata.mode() & 0o777 != STATE_DIR_MODE {
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(STATE_DIR_MODE))
            .context("cannot change the permissions")?;
    }

    Ok(())
}
