// this produce just too much false positive in this file
#![allow(clippy::missing_const_for_fn)]

use super::wants::{
    WantsApp, WantsBuild, WantsServer, WantsServerInterfaces, WantsServerLogs, WantsServerSystem,
    WantsSupervisor, WantsVersion,
};
use crate::{
    config::{
        ConfigApp, ConfigServer, ConfigServerLogs, ConfigServerSystem, ConfigSupervisor,
    },
    Config,
};
use zimplyd_common::re::{
    anyhow::{self, Context},
    log,
};

///
pub struct Builder<State> {
    pub(crate) state: State,
}

impl Builder<WantsVersion> {
    /// # Panics
    ///
    /// * CARGO_PKG_VERSION is not valid
    #[must_use]
    pub fn with_current_version(self) -> Builder<WantsServer> {
        self.with_version_str(&format!(">={}", env!("CARGO_PKG_VERSION")))
            .unwrap()
    }

    /// # Errors
    ///
    /// * version_requirement is not valid format
    pub fn with_version_str(
        self,
        version_requirement: &str,
    ) -> anyhow::Result<Builder<WantsServer>> {
        semver::VersionReq::parse(version_requirement)
            .with_context(|| format!("version is not valid: '{version_requirement}'"))
            .map(|version_requirement| Builder::<WantsServer> {
                state: WantsServer {
                    parent: self.state,
                    version_requirement,
                },
            })
    }
}

impl Builder<WantsServer> {
    /// the service is declared but not started
    #[must_use]
    pub fn with_zim_path(
        self,
        zim_path: impl Into<std::path::PathBuf>,
    ) -> Builder<WantsServerInterfaces> {
        self.with_service(false, zim_path)
    }

    ///
    #[must_use]
    pub fn with_enabled_zim_path(
        self,
        zim_path: impl Into<std::path::PathBuf>,
    ) -> Builder<WantsServerInterfaces> {
        self.with_service(true, zim_path)
    }

    ///
    #[must_use]
    pub fn with_service(
        self,
        enable: bool,
        zim_path: impl Into<std::path::PathBuf>,
    ) -> Builder<WantsServerInterfaces> {
        Builder::<WantsServerInterfaces> {
            state: WantsServerInterfaces {
                parent: self.state,
                enable,
                zim_path: zim_path.into(),
            },
        }
    }
}

impl Builder<WantsServerInterfaces> {
    /// listen on every interface, port 8081
    #[must_use]
    pub fn with_default_interfaces(self) -> Builder<WantsServerSystem> {
        self.with_interface(
            &ConfigServer::default_ip_address(),
            ConfigServer::default_port(),
        )
    }

    ///
    #[must_use]
    pub fn with_ipv4_localhost(self) -> Builder<WantsServerSystem> {
        self.with_interface("127.0.0.1", ConfigServer::default_port())
    }

    ///
    #[must_use]
    pub fn with_interface(self, ip_address: &str, port: u16) -> Builder<WantsServerSystem> {
        Builder::<WantsServerSystem> {
            state: WantsServerSystem {
                parent: self.state,
                ip_address: ip_address.to_string(),
                port,
            },
        }
    }
}

impl Builder<WantsServerSystem> {
    /// `zimply:zimply` with its state in `/var/lib/zimply`
    #[must_use]
    pub fn with_default_system(self) -> Builder<WantsServerLogs> {
        self.with_system(
            &ConfigServerSystem::default_user(),
            &ConfigServerSystem::default_group(),
            ConfigServerSystem::default_state_dir(),
        )
    }

    ///
    #[must_use]
    pub fn with_system(
        self,
        user: &str,
        group: &str,
        state_dir: impl Into<std::path::PathBuf>,
    ) -> Builder<WantsServerLogs> {
        Builder::<WantsServerLogs> {
            state: WantsServerLogs {
                parent: self.state,
                user: user.to_string(),
                group: group.to_string(),
                state_dir: state_dir.into(),
            },
        }
    }
}

impl Builder<WantsServerLogs> {
    ///
    #[must_use]
    pub fn with_default_logs_settings(self) -> Builder<WantsApp> {
        self.with_logs_settings(
            ConfigServerLogs::default_filepath(),
            &ConfigServerLogs::default_format(),
            ConfigServerLogs::default_level(),
        )
    }

    ///
    #[must_use]
    pub fn with_logs_settings(
        self,
        filepath: impl Into<std::path::PathBuf>,
        format: &str,
        level: std::collections::BTreeMap<String, log::LevelFilter>,
    ) -> Builder<WantsApp> {
        Builder::<WantsApp> {
            state: WantsApp {
                parent: self.state,
                filepath: filepath.into(),
                format: format.to_string(),
                level,
            },
        }
    }
}

impl Builder<WantsApp> {
    /// package installed in `/usr/share/zimply`, run by `/usr/bin/python3`
    #[must_use]
    pub fn with_default_app(self) -> Builder<WantsSupervisor> {
        self.with_app(
            ConfigApp::default_interpreter(),
            ConfigApp::default_dirpath(),
            ConfigApp::default_strict(),
        )
    }

    ///
    #[must_use]
    pub fn with_app_dirpath(
        self,
        dirpath: impl Into<std::path::PathBuf>,
    ) -> Builder<WantsSupervisor> {
        self.with_app(
            ConfigApp::default_interpreter(),
            dirpath,
            ConfigApp::default_strict(),
        )
    }

    ///
    #[must_use]
    pub fn with_app(
        self,
        interpreter: impl Into<std::path::PathBuf>,
        dirpath: impl Into<std::path::PathBuf>,
        strict: bool,
    ) -> Builder<WantsSupervisor> {
        Builder::<WantsSupervisor> {
            state: WantsSupervisor {
                parent: self.state,
                interpreter: interpreter.into(),
                dirpath: dirpath.into(),
                strict,
            },
        }
    }
}

impl Builder<WantsSupervisor> {
    ///
    #[must_use]
    pub fn with_default_supervisor(self) -> Builder<WantsBuild> {
        self.with_supervisor(
            ConfigSupervisor::default_stop_timeout(),
            ConfigSupervisor::default_poll_period(),
        )
    }

    ///
    #[must_use]
    pub fn with_supervisor(
        self,
        stop_timeout: std::time::Duration,
        poll_period: std::time::Duration,
    ) -> Builder<WantsBuild> {
        Builder::<WantsBuild> {
            state: WantsBuild {
                parent: self.state,
                stop_timeout,
                poll_period,
            },
        }
    }
}

impl Builder<WantsBuild> {
    /// Assemble the [Config], the preconditions are checked by [Config::validate]
    #[must_use]
    pub fn build(self) -> Config {
        let supervisor = self.state;
        let app = supervisor.parent;
        let srv_logs = app.parent;
        let srv_syst = srv_logs.parent;
        let srv_inet = srv_syst.parent;
        let srv = srv_inet.parent;
        let version = srv.parent;

        Config {
            version_requirement: version.version_requirement,
            server: ConfigServer {
                enable: srv.enable,
                zim_path: srv.zim_path,
                ip_address: srv_inet.ip_address,
                port: srv_inet.port,
                system: ConfigServerSystem {
                    user: srv_syst.user,
                    group: srv_syst.group,
                    state_dir: srv_syst.state_dir,
                },
                logs: ConfigServerLogs {
                    filepath: srv_logs.filepath,
                    format: srv_logs.format,
                    level: srv_logs.level,
                },
            },
            app: ConfigApp {
                interpreter: app.interpreter,
                dirpath: app.dirpath,
                strict: app.strict,
            },
            supervisor: ConfigSupervisor {
                stop_timeout: supervisor.stop_timeout,
                poll_period: supervisor.poll_period,
            },
        }
    }
}
