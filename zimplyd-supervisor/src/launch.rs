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
use crate::ServiceIdentity;
use std::ffi::OsString;
use zimplyd_common::re::libc;
use zimplyd_config::ValidatedConfig;

/// Everything needed to spawn the ZIMply server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpecification {
    /// program executed
    pub interpreter: std::path::PathBuf,
    /// first argument of the interpreter
    pub script: std::path::PathBuf,
    /// arguments of the script, paths are passed untouched
    pub args: Vec<OsString>,
    /// variables added to the inherited environment
    pub environment: std::collections::BTreeMap<String, OsString>,
    ///
    pub working_dir: std::path::PathBuf,
    ///
    pub uid: libc::uid_t,
    ///
    pub gid: libc::gid_t,
}

impl LaunchSpecification {
    /// variable exposing the package to the interpreter
    pub const CODE_PATH_VARIABLE: &'static str = "PYTHONPATH";

    /// Assemble the invocation of the server, the state directory of the
    /// identity receives the indexes.
    #[must_use]
    pub fn new(config: &ValidatedConfig, identity: &ServiceIdentity) -> Self {
        let args = vec![
            OsString::from("--zim-path"),
            config.server.zim_path.clone().into_os_string(),
            OsString::from("--index-dir"),
            identity.state_dir.clone().into_os_string(),
            OsString::from("--template"),
            config.app.template().into_os_string(),
            OsString::from("--ip"),
            OsString::from(&config.server.ip_address),
            OsString::from("--port"),
            OsString::from(config.server.port.to_string()),
        ];

        Self {
            interpreter: config.app.interpreter.clone(),
            script: config.app.main_script(),
            args,
            environment: std::collections::BTreeMap::from([(
                Self::CODE_PATH_VARIABLE.to_string(),
                config.app.dirpath.clone().into_os_string(),
            )]),
            working_dir: identity.state_dir.clone(),
            uid: identity.uid,
            gid: identity.gid,
        }
    }

    /// the full command line, interpreter first
    #[must_use]
    pub fn command_line(&self) -> Vec<OsString> {
        [
            self.interpreter.clone().into_os_string(),
            self.script.clone().into_os_string(),
        ]
        .into_iter()
        .chain(self.args.iter().cloned())
        .collect()
    }
}
