use crate::{
    Account, AccountDatabase, ChildProcess, LaunchSpecification, ProvisionError, Spawner,
};
use zimplyd_common::re::{anyhow, libc};

mod provision;

/// accounts kept in memory, owned by the user running the tests
#[derive(Debug, Default)]
pub struct FakeAccounts {
    pub groups: std::collections::HashMap<String, libc::gid_t>,
    pub users: std::collections::HashMap<String, Account>,
    pub created_groups: usize,
    pub created_users: usize,
    pub refuse_creation: bool,
}

impl AccountDatabase for FakeAccounts {
    fn group_id(&self, name: &str) -> Option<libc::gid_t> {
        self.groups.get(name).copied()
    }

    fn user(&self, name: &str) -> Option<Account> {
        self.users.get(name).cloned()
    }

    fn create_group(&mut self, name: &str) -> Result<(), ProvisionError> {
        if self.refuse_creation {
            return Err(ProvisionError::Command {
                program: "groupadd".to_string(),
                reason: "exit status: 10: permission denied".to_string(),
            });
        }
        self.created_groups += 1;
        self.groups
            .insert(name.to_string(), unsafe { libc::getgid() });
        Ok(())
    }

    fn create_user(
        &mut self,
        name: &str,
        group: &str,
        home: &std::path::Path,
    ) -> Result<(), ProvisionError> {
        self.created_users += 1;
        let gid = self.group_id(group).unwrap();
        self.users.insert(
            name.to_string(),
            Account {
                uid: unsafe { libc::getuid() },
                gid,
                home: home.to_path_buf(),
            },
        );
        Ok(())
    }
}

/// behavior of the next spawned server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// exit immediately with code 1
    Crash,
    /// the interpreter cannot be executed
    FailSpawn,
    /// run until terminated
    RunUntilStopped,
    /// request the stop then run until terminated
    RequestStopAndRun,
    /// request the stop then exit by itself
    ExitAfterStop,
    /// running, but cannot be waited on
    WaitFails,
}

/// spawn the outcomes in order, then servers running until terminated
#[derive(Debug, Default)]
pub struct FakeSpawner {
    pub script: std::collections::VecDeque<Outcome>,
    pub stop: crate::StopHandle,
    pub spawned: Vec<LaunchSpecification>,
    pub terminated: std::sync::Arc<std::sync::atomic::AtomicUsize>,
}

impl FakeSpawner {
    pub fn new(script: &[Outcome], stop: crate::StopHandle) -> Self {
        Self {
            script: script.iter().copied().collect(),
            stop,
            ..Self::default()
        }
    }
}

#[derive(Debug)]
pub struct FakeChild {
    pid: u32,
    outcome: Outcome,
    stop: crate::StopHandle,
    terminated: std::sync::Arc<std::sync::atomic::AtomicUsize>,
}

fn exit_status(raw: i32) -> std::process::ExitStatus {
    std::os::unix::process::ExitStatusExt::from_raw(raw)
}

impl ChildProcess for FakeChild {
    fn id(&self) -> u32 {
        self.pid
    }

    fn wait_timeout(
        &mut self,
        timeout: std::time::Duration,
    ) -> std::io::Result<Option<std::process::ExitStatus>> {
        match self.outcome {
            Outcome::Crash => Ok(Some(exit_status(1 << 8))),
            Outcome::ExitAfterStop => {
                self.stop.stop();
                Ok(Some(exit_status(0)))
            }
            Outcome::RequestStopAndRun => {
                self.stop.stop();
                std::thread::sleep(timeout);
                Ok(None)
            }
            Outcome::RunUntilStopped => {
                std::thread::sleep(timeout);
                Ok(None)
            }
            Outcome::WaitFails => Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "No child processes",
            )),
            Outcome::FailSpawn => unreachable!(),
        }
    }

    fn terminate(
        &mut self,
        _grace: std::time::Duration,
    ) -> anyhow::Result<std::process::ExitStatus> {
        self.terminated
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(exit_status(libc::SIGTERM))
    }
}

impl Spawner for FakeSpawner {
    type Child = FakeChild;

    fn spawn(&mut self, spec: &LaunchSpecification) -> std::io::Result<Self::Child> {
        let outcome = self.script.pop_front().unwrap_or(Outcome::RunUntilStopped);
        if outcome == Outcome::FailSpawn {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no such interpreter",
            ));
        }

        self.spawned.push(spec.clone());
        Ok(FakeChild {
            pid: 1000 + u32::try_from(self.spawned.len()).unwrap(),
            outcome,
            stop: self.stop.clone(),
            terminated: self.terminated.clone(),
        })
    }
}
