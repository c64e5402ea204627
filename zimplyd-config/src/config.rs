#![allow(clippy::module_name_repetitions)]
#![allow(missing_docs)]

use zimplyd_common::re::log;

/// Configuration of the supervisor and of the ZIMply server it runs
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(
        serialize_with = "crate::parser::semver::serialize",
        deserialize_with = "crate::parser::semver::deserialize"
    )]
    pub version_requirement: semver::VersionReq,
    pub server: ConfigServer,
    #[serde(default)]
    pub app: ConfigApp,
    #[serde(default)]
    pub supervisor: ConfigSupervisor,
}

/// The ZIMply service itself
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigServer {
    #[serde(default)]
    pub enable: bool,
    /// directory holding the `.zim` archives
    pub zim_path: std::path::PathBuf,
    #[serde(default = "ConfigServer::default_ip_address")]
    pub ip_address: String,
    #[serde(default = "ConfigServer::default_port")]
    pub port: u16,
    #[serde(default)]
    pub system: ConfigServerSystem,
    #[serde(default)]
    pub logs: ConfigServerLogs,
}

/// Identity the ZIMply process runs under
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigServerSystem {
    #[serde(default = "ConfigServerSystem::default_user")]
    pub user: String,
    #[serde(default = "ConfigServerSystem::default_group")]
    pub group: String,
    /// home of the user, where the search indexes are generated
    #[serde(default = "ConfigServerSystem::default_state_dir")]
    pub state_dir: std::path::PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigServerLogs {
    #[serde(default = "ConfigServerLogs::default_filepath")]
    pub filepath: std::path::PathBuf,
    #[serde(default = "ConfigServerLogs::default_format")]
    pub format: String,
    #[serde(default = "ConfigServerLogs::default_level")]
    pub level: std::collections::BTreeMap<String, log::LevelFilter>,
}

/// Installation of the ZIMply package
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigApp {
    #[serde(default = "ConfigApp::default_interpreter")]
    pub interpreter: std::path::PathBuf,
    /// root of the package, exported to the interpreter
    #[serde(default = "ConfigApp::default_dirpath")]
    pub dirpath: std::path::PathBuf,
    /// check the template and the archive directory before starting
    #[serde(default = "ConfigApp::default_strict")]
    pub strict: bool,
}

impl ConfigApp {
    /// entry point of the server, inside the package
    pub const MAIN_SCRIPT: &'static str = "main.py";

    /// html template rendered by the server, inside the package
    pub const TEMPLATE: &'static str = "zimply/template.html";

    ///
    #[must_use]
    pub fn main_script(&self) -> std::path::PathBuf {
        self.dirpath.join(Self::MAIN_SCRIPT)
    }

    ///
    #[must_use]
    pub fn template(&self) -> std::path::PathBuf {
        self.dirpath.join(Self::TEMPLATE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigSupervisor {
    /// delay between SIGTERM and SIGKILL when stopping the server
    #[serde(
        with = "humantime_serde",
        default = "ConfigSupervisor::default_stop_timeout"
    )]
    pub stop_timeout: std::time::Duration,
    /// how long a single wait on the server lasts before checking stop requests
    #[serde(
        with = "humantime_serde",
        default = "ConfigSupervisor::default_poll_period"
    )]
    pub poll_period: std::time::Duration,
}
