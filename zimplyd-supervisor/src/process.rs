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
use crate::{log_channels, LaunchSpecification};
use zimplyd_common::{
    libc_abstraction::kill,
    re::{
        anyhow::{self, Context},
        libc, log,
    },
};

/// A running server, owned by the supervisor
pub trait ChildProcess {
    /// os assigned process id
    fn id(&self) -> u32;

    /// wait for the exit of the process, at most `timeout`
    ///
    /// # Errors
    ///
    /// * the process cannot be waited on
    fn wait_timeout(
        &mut self,
        timeout: std::time::Duration,
    ) -> std::io::Result<Option<std::process::ExitStatus>>;

    /// ask the process to terminate, force-kill it after `grace`, then reap it
    ///
    /// # Errors
    ///
    /// * the process cannot be signaled or waited on
    fn terminate(&mut self, grace: std::time::Duration)
        -> anyhow::Result<std::process::ExitStatus>;
}

/// Creates the server processes
pub trait Spawner {
    /// the process produced
    type Child: ChildProcess;

    /// start one instance of the server
    ///
    /// # Errors
    ///
    /// * the interpreter cannot be executed
    fn spawn(&mut self, spec: &LaunchSpecification) -> std::io::Result<Self::Child>;
}

/// Spawn the server as an os process, its output being forwarded to the logs
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandSpawner;

/// An os process spawned by [CommandSpawner]
#[derive(Debug)]
pub struct ServerProcess {
    child: std::process::Child,
}

impl CommandSpawner {
    fn command(spec: &LaunchSpecification) -> std::process::Command {
        let mut command = std::process::Command::new(&spec.interpreter);
        command
            .arg(&spec.script)
            .args(&spec.args)
            .envs(&spec.environment)
            .current_dir(&spec.working_dir)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped());

        // switching identity requires privileges, only do it when needed
        if spec.gid != users::get_current_gid() {
            std::os::unix::prelude::CommandExt::gid(&mut command, spec.gid);
        }
        if spec.uid != users::get_current_uid() {
            std::os::unix::prelude::CommandExt::uid(&mut command, spec.uid);
        }
        command
    }

    /// spawn `command` then `attach` to its output, a child whose output
    /// cannot be attached is killed and reaped before returning the error
    fn spawn_with<F>(
        mut command: std::process::Command,
        attach: F,
    ) -> std::io::Result<ServerProcess>
    where
        F: FnOnce(&mut std::process::Child) -> std::io::Result<()>,
    {
        log::trace!(target: log_channels::SUPERVISOR, "running command: {:#?}", command);

        let mut child = command.spawn()?;

        if let Err(e) = attach(&mut child) {
            log::warn!(
                target: log_channels::SUPERVISOR,
                "cannot forward the output of the server (pid={}), killing it: {}",
                child.id(),
                e
            );
            if let Err(error) = child.kill() {
                log::error!(target: log_channels::SUPERVISOR, "cannot kill the server: {}", error);
            }
            child.wait()?;
            return Err(e);
        }

        Ok(ServerProcess { child })
    }
}

impl Spawner for CommandSpawner {
    type Child = ServerProcess;

    fn spawn(&mut self, spec: &LaunchSpecification) -> std::io::Result<Self::Child> {
        Self::spawn_with(Self::command(spec), |child| {
            if let Some(stdout) = child.stdout.take() {
                forward_output(stdout, log_channels::STDOUT, log::Level::Info)?;
            }
            if let Some(stderr) = child.stderr.take() {
                forward_output(stderr, log_channels::STDERR, log::Level::Warn)?;
            }
            Ok(())
        })
    }
}

/// log each line written by the server, until it closes the pipe
fn forward_output<R: std::io::Read + Send + 'static>(
    output: R,
    target: &'static str,
    level: log::Level,
) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name(target.to_string())
        .spawn(move || {
            for line in std::io::BufRead::lines(std::io::BufReader::new(output)) {
                match line {
                    Ok(line) => log::log!(target: target, level, "{}", line),
                    Err(_) => break,
                }
            }
        })
        .map(|_| ())
}

impl ChildProcess for ServerProcess {
    fn id(&self) -> u32 {
        self.child.id()
    }

    fn wait_timeout(
        &mut self,
        timeout: std::time::Duration,
    ) -> std::io::Result<Option<std::process::ExitStatus>> {
        wait_timeout::ChildExt::wait_timeout(&mut self.child, timeout)
    }

    fn terminate(
        &mut self,
        grace: std::time::Duration,
    ) -> anyhow::Result<std::process::ExitStatus> {
        if let Some(status) = self.child.try_wait()? {
            return Ok(status);
        }

        let pid = libc::pid_t::try_from(self.child.id())?;
        kill(pid, libc::SIGTERM)?;

        match wait_timeout::ChildExt::wait_timeout(&mut self.child, grace)? {
            Some(status) => Ok(status),
            None => {
                log::warn!(
                    target: log_channels::SUPERVISOR,
                    "server (pid={pid}) still running after {grace:?}, killing it"
                );
                self.child.kill().context("cannot kill the server")?;
                self.child.wait().context("cannot reap the server")
            }
        }
    }
}
