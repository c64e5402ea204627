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
#![allow(clippy::module_name_repetitions)]

use zimplyd_common::re::log;

///
pub struct WantsVersion(pub(crate) ());

///
pub struct WantsServer {
    #[allow(dead_code)]
    pub(crate) parent: WantsVersion,
    pub(super) version_requirement: semver::VersionReq,
}

///
pub struct WantsServerInterfaces {
    pub(crate) parent: WantsServer,
    pub(super) enable: bool,
    pub(super) zim_path: std::path::PathBuf,
}

///
pub struct WantsServerSystem {
    pub(crate) parent: WantsServerInterfaces,
    pub(super) ip_address: String,
    pub(super) port: u16,
}

///
pub struct WantsServerLogs {
    pub(crate) parent: WantsServerSystem,
    pub(super) user: String,
    pub(super) group: String,
    pub(super) state_dir: std::path::PathBuf,
}

///
pub struct WantsApp {
    pub(crate) parent: WantsServerLogs,
    pub(super) filepath: std::path::PathBuf,
    pub(super) format: String,
    pub(super) level: std::collections::BTreeMap<String, log::LevelFilter>,
}

///
pub struct WantsSupervisor {
    pub(crate) parent: WantsApp,
    pub(super) interpreter: std::path::PathBuf,
    pub(super) dirpath: std::path::PathBuf,
    pub(super) strict: bool,
}

///
pub struct WantsBuild {
    pub(crate) parent: WantsSupervisor,
    pub(super) stop_timeout: std::time::Duration,
    pub(super) poll_period: std::time::Duration,
}
