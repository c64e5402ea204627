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
use crate::{
    identity::{provision_identity, AccountDatabase, ProvisionError, SystemAccounts},
    log_channels,
    process::{ChildProcess, CommandSpawner, Spawner},
    LaunchSpecification, ServiceAccount, ServiceIdentity,
};
use zimplyd_common::{
    libc_abstraction::stop_signal_received,
    re::{anyhow, log},
};
use zimplyd_config::{Config, ConfigError, ConfigSupervisor, ValidatedConfig};

/// Lifecycle of the supervised server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// no configuration accepted yet
    Unconfigured,
    /// the configuration passed its preconditions
    Validated,
    /// the identity and its state directory exist
    Provisioned,
    /// a server instance is (or is being re-) spawned
    Running,
    /// stopped on request, never restarted
    Stopped,
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Unconfigured => "unconfigured",
            Self::Validated => "validated",
            Self::Provisioned => "provisioned",
            Self::Running => "running",
            Self::Stopped => "stopped",
        })
    }
}

/// Request the termination of a supervised server, from any thread
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    requested: std::sync::Arc<std::sync::atomic::AtomicBool>,
    follow_signals: bool,
}

impl StopHandle {
    ///
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// a handle also stopped by SIGTERM and SIGINT, see
    /// [zimplyd_common::libc_abstraction::catch_stop_signals]
    #[must_use]
    pub fn with_stop_signals() -> Self {
        Self {
            requested: std::sync::Arc::default(),
            follow_signals: true,
        }
    }

    ///
    pub fn stop(&self) {
        self.requested
            .store(true, std::sync::atomic::Ordering::SeqCst);
    }

    ///
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.requested.load(std::sync::atomic::Ordering::SeqCst)
            || (self.follow_signals && stop_signal_received())
    }
}

/// Failure of the supervisor
#[allow(clippy::module_name_repetitions)]
#[derive(Debug)]
pub enum SupervisorError {
    /// the operation is not allowed in the current state
    State {
        ///
        operation: &'static str,
        ///
        state: State,
    },
    ///
    Config(ConfigError),
    ///
    Provision(ProvisionError),
    /// the first instance of the server cannot be spawned
    Spawn(std::io::Error),
    /// the running instance cannot be waited on
    Wait(std::io::Error),
    /// the running instance cannot be terminated
    Stop(anyhow::Error),
}

impl std::error::Error for SupervisorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::State { .. } | Self::Stop(_) => None,
            Self::Config(e) => Some(e),
            Self::Provision(e) => Some(e),
            Self::Spawn(e) | Self::Wait(e) => Some(e),
        }
    }
}

impl std::fmt::Display for SupervisorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::State { operation, state } => {
                write!(f, "cannot {} the server while {}", operation, state)
            }
            Self::Config(e) => write!(f, "invalid configuration: {}", e),
            Self::Provision(e) => write!(f, "cannot provision the identity: {}", e),
            Self::Spawn(e) => write!(f, "cannot spawn the server: {}", e),
            Self::Wait(e) => write!(f, "cannot wait for the server: {}", e),
            Self::Stop(e) => write!(f, "cannot terminate the server: {:#}", e),
        }
    }
}

impl From<ConfigError> for SupervisorError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ProvisionError> for SupervisorError {
    fn from(e: ProvisionError) -> Self {
        Self::Provision(e)
    }
}

/// Drives one ZIMply server: validation, provisioning, spawn and
/// unconditional restart until a stop is requested.
pub struct Supervisor<S = CommandSpawner, A = SystemAccounts> {
    account: ServiceAccount,
    accounts: A,
    spawner: S,
    stop: StopHandle,
    state: State,
    spawn_count: usize,
    timing: ConfigSupervisor,
}

impl Supervisor {
    /// A supervisor spawning os processes, managing the accounts of the host
    #[must_use]
    pub fn new(account: ServiceAccount) -> Self {
        Self::with_backends(account, SystemAccounts, CommandSpawner)
    }
}

impl<S: Spawner, A: AccountDatabase> Supervisor<S, A> {
    ///
    pub fn with_backends(account: ServiceAccount, accounts: A, spawner: S) -> Self {
        Self {
            account,
            accounts,
            spawner,
            stop: StopHandle::new(),
            state: State::Unconfigured,
            spawn_count: 0,
            timing: ConfigSupervisor::default(),
        }
    }

    /// replace the handle used to request the stop
    #[must_use]
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    /// a handle stopping this supervisor
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    ///
    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    /// number of spawn attempts, including the failed ones
    #[must_use]
    pub const fn spawn_count(&self) -> usize {
        self.spawn_count
    }

    /// the accounts backend
    #[must_use]
    pub const fn accounts(&self) -> &A {
        &self.accounts
    }

    /// the process backend
    #[must_use]
    pub const fn spawner(&self) -> &S {
        &self.spawner
    }

    fn expect_state(
        &self,
        operation: &'static str,
        allowed: &[State],
    ) -> Result<(), SupervisorError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(SupervisorError::State {
                operation,
                state: self.state,
            })
        }
    }

    /// Check the preconditions of the configuration, nothing is started on failure.
    ///
    /// # Errors
    ///
    /// * a server is already running
    /// * see [ConfigError]
    pub fn validate(&mut self, config: Config) -> Result<ValidatedConfig, SupervisorError> {
        self.expect_state(
            "validate",
            &[
                State::Unconfigured,
                State::Validated,
                State::Provisioned,
                State::Stopped,
            ],
        )?;
        self.state = State::Unconfigured;

        let validated = config.validate()?;
        self.timing = validated.supervisor.clone();
        self.state = State::Validated;

        log::info!(
            target: log_channels::SUPERVISOR,
            "configuration validated, serving '{}' on {}:{}",
            validated.server.zim_path.display(),
            validated.server.ip_address,
            validated.server.port
        );

        Ok(validated)
    }

    /// Ensure the dedicated account, group and state directory exist.
    ///
    /// # Errors
    ///
    /// * the configuration has not been validated
    /// * see [ProvisionError]
    pub fn provision(&mut self) -> Result<ServiceIdentity, SupervisorError> {
        self.expect_state("provision", &[State::Validated, State::Provisioned])?;

        let identity = provision_identity(&mut self.accounts, &self.account)?;
        self.state = State::Provisioned;

        log::info!(
            target: log_channels::PROVISION,
            "server runs as '{}' (uid={}) / '{}' (gid={})",
            identity.user,
            identity.uid,
            identity.group,
            identity.gid
        );

        Ok(identity)
    }

    /// The invocation of the server, pure.
    #[must_use]
    pub fn launch_specification(
        config: &ValidatedConfig,
        identity: &ServiceIdentity,
    ) -> LaunchSpecification {
        LaunchSpecification::new(config, identity)
    }

    /// Spawn the first instance of the server.
    ///
    /// # Errors
    ///
    /// * the identity has not been provisioned
    /// * the server cannot be spawned
    pub fn start(&mut self, spec: &LaunchSpecification) -> Result<S::Child, SupervisorError> {
        self.expect_state("start", &[State::Provisioned])?;

        self.spawn_count += 1;
        let child = self.spawner.spawn(spec).map_err(SupervisorError::Spawn)?;
        self.state = State::Running;

        log::info!(
            target: log_channels::SUPERVISOR,
            "server started (pid={}): {:?}",
            child.id(),
            spec.command_line()
        );

        Ok(child)
    }

    fn respawn(&mut self, spec: &LaunchSpecification) -> Option<S::Child> {
        self.spawn_count += 1;
        match self.spawner.spawn(spec) {
            Ok(child) => {
                log::info!(
                    target: log_channels::SUPERVISOR,
                    "server restarted (pid={})",
                    child.id()
                );
                Some(child)
            }
            Err(e) => {
                log::warn!(target: log_channels::SUPERVISOR, "cannot restart the server: {}", e);
                None
            }
        }
    }

    /// Block until a stop is requested, restarting the server each time it
    /// exits, whatever the reason.
    ///
    /// # Errors
    ///
    /// * the server is not running
    /// * the running instance cannot be waited on or terminated
    pub fn supervise(
        &mut self,
        spec: &LaunchSpecification,
        child: S::Child,
    ) -> Result<(), SupervisorError> {
        self.expect_state("supervise", &[State::Running])?;

        let mut child = Some(child);
        loop {
            if self.stop.is_stopped() {
                if let Some(mut running) = child.take() {
                    let pid = running.id();
                    let status = running
                        .terminate(self.timing.stop_timeout)
                        .map_err(SupervisorError::Stop)?;
                    log::info!(
                        target: log_channels::SUPERVISOR,
                        "server (pid={}) stopped: {}",
                        pid,
                        status
                    );
                }
                self.state = State::Stopped;
                return Ok(());
            }

            match &mut child {
                Some(running) => match running.wait_timeout(self.timing.poll_period) {
                    Ok(Some(status)) => {
                        log::warn!(
                            target: log_channels::SUPERVISOR,
                            "server (pid={}) exited: {}",
                            running.id(),
                            status
                        );
                        child = None;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        // the server is not left behind the supervisor
                        if let Err(stop) = running.terminate(self.timing.stop_timeout) {
                            log::error!(
                                target: log_channels::SUPERVISOR,
                                "cannot terminate the server (pid={}): {:#}",
                                running.id(),
                                stop
                            );
                        }
                        return Err(SupervisorError::Wait(e));
                    }
                },
                // no backoff: a configuration crashing at startup restarts in a tight loop
                None => child = self.respawn(spec),
            }
        }
    }

    /// Request the termination of the running server, it will not be restarted.
    pub fn stop(&self) {
        log::info!(target: log_channels::SUPERVISOR, "stop requested");
        self.stop.stop();
    }

    /// Validate, provision, start and supervise, until a stop is requested.
    /// A disabled service is left untouched.
    ///
    /// # Errors
    ///
    /// * see [SupervisorError]
    pub fn run(&mut self, config: Config) -> Result<(), SupervisorError> {
        if !config.server.enable {
            log::info!(
                target: log_channels::SUPERVISOR,
                "service is disabled, nothing to do"
            );
            return Ok(());
        }

        let config = self.validate(config)?;
        let identity = self.provision()?;
        let spec = Self::launch_specification(&config, &identity);

        if self.stop.is_stopped() {
            self.state = State::Stopped;
            return Ok(());
        }

        let child = self.start(&spec)?;
        self.supervise(&spec, child)
    }
}
