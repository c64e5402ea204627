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
use crate::config::{
    ConfigApp, ConfigServer, ConfigServerLogs, ConfigServerSystem, ConfigSupervisor,
};
use zimplyd_common::re::log;

impl ConfigServer {
    pub(crate) fn default_ip_address() -> String {
        "0.0.0.0".to_string()
    }

    pub(crate) const fn default_port() -> u16 {
        8081
    }
}

impl Default for ConfigServerSystem {
    fn default() -> Self {
        Self {
            user: Self::default_user(),
            group: Self::default_group(),
            state_dir: Self::default_state_dir(),
        }
    }
}

impl ConfigServerSystem {
    /// name of the account owning the ZIMply process
    pub const USER: &'static str = "zimply";

    /// name of the group owning the ZIMply process
    pub const GROUP: &'static str = "zimply";

    pub(crate) fn default_user() -> String {
        Self::USER.to_string()
    }

    pub(crate) fn default_group() -> String {
        Self::GROUP.to_string()
    }

    pub(crate) fn default_state_dir() -> std::path::PathBuf {
        std::path::PathBuf::from_iter(["/", "var", "lib", "zimply"])
    }
}

impl Default for ConfigServerLogs {
    fn default() -> Self {
        Self {
            filepath: Self::default_filepath(),
            format: Self::default_format(),
            level: Self::default_level(),
        }
    }
}

impl ConfigServerLogs {
    pub(crate) fn default_filepath() -> std::path::PathBuf {
        std::path::PathBuf::from_iter(["/", "var", "log", "zimplyd", "zimplyd.log"])
    }

    pub(crate) fn default_format() -> String {
        "{d} {l} - {m}{n}".to_string()
    }

    pub(crate) fn default_level() -> std::collections::BTreeMap<String, log::LevelFilter> {
        std::collections::BTreeMap::from([("default".to_string(), log::LevelFilter::Warn)])
    }
}

impl Default for ConfigApp {
    fn default() -> Self {
        Self {
            interpreter: Self::default_interpreter(),
            dirpath: Self::default_dirpath(),
            strict: Self::default_strict(),
        }
    }
}

impl ConfigApp {
    pub(crate) fn default_interpreter() -> std::path::PathBuf {
        std::path::PathBuf::from_iter(["/", "usr", "bin", "python3"])
    }

    pub(crate) fn default_dirpath() -> std::path::PathBuf {
        std::path::PathBuf::from_iter(["/", "usr", "share", "zimply"])
    }

    pub(crate) const fn default_strict() -> bool {
        true
    }
}

impl Default for ConfigSupervisor {
    fn default() -> Self {
        Self {
            stop_timeout: Self::default_stop_timeout(),
            poll_period: Self::default_poll_period(),
        }
    }
}

impl ConfigSupervisor {
    pub(crate) const fn default_stop_timeout() -> std::time::Duration {
        std::time::Duration::from_secs(10)
    }

    pub(crate) const fn default_poll_period() -> std::time::Duration {
        std::time::Duration::from_millis(250)
    }
}
