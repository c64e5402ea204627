//! zimplyd supervisor

#![doc(html_no_source)]
#![deny(missing_docs)]
//
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::cargo)]
//
#![allow(clippy::doc_markdown)]

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

/// targets for log! macro
pub mod log_channels {
    /// lifecycle of the server
    pub const SUPERVISOR: &str = "supervisor";
    /// accounts and state directory
    pub const PROVISION: &str = "supervisor::provision";
    /// standard output of the server
    pub const STDOUT: &str = "zimply::stdout";
    /// standard error of the server
    pub const STDERR: &str = "zimply::stderr";
}

#[cfg(test)]
mod tests;

mod identity;
mod launch;
mod process;
mod supervisor;
mod unit;

pub use identity::{
    provision_identity, Account, AccountDatabase, ProvisionError, ServiceAccount,
    ServiceIdentity, SystemAccounts,
};
pub use launch::LaunchSpecification;
pub use process::{ChildProcess, CommandSpawner, ServerProcess, Spawner};
pub use supervisor::{State, StopHandle, Supervisor, SupervisorError};
pub use unit::render_systemd_unit;
