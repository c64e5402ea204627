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

/// return type of [fork]
pub enum ForkResult {
    /// to the parent, with the pid of the child process
    Parent(libc::pid_t),
    /// to the child
    Child,
}

/// create a child process
///
/// # Errors
///
/// see fork(2) ERRORS
#[inline]
pub fn fork() -> anyhow::Result<ForkResult> {
    match unsafe { libc::fork() } {
        -1 => Err(anyhow::anyhow!(
            "fork: '{}'",
            std::io::Error::last_os_error()
        )),
        0 => Ok(ForkResult::Child),
        child_pid => Ok(ForkResult::Parent(child_pid)),
    }
}

/// run a program as a background process
///
/// # Errors
///
/// see daemon(2) ERRORS
pub fn daemon() -> anyhow::Result<ForkResult> {
    match fork()? {
        ForkResult::Parent(_) => std::process::exit(0),
        ForkResult::Child => {
            setsid()?;
            fork()
        }
    }
}

/// run a program in a new session
///
/// # Errors
///
/// see setsid(2) ERRORS
pub fn setsid() -> anyhow::Result<libc::pid_t> {
    match unsafe { libc::setsid() } {
        -1 => Err(anyhow::anyhow!(
            "setsid: '{}'",
            std::io::Error::last_os_error()
        )),
        res => Ok(res),
    }
}

/// change ownership of a file, `None` leaves the id unchanged
///
/// # Errors
///
/// * `path` contains a null byte
/// * see chown(2) ERRORS
pub fn chown(
    path: &std::path::Path,
    user: Option<libc::uid_t>,
    group: Option<libc::gid_t>,
) -> anyhow::Result<()> {
    let path_c = std::ffi::CString::new(std::os::unix::ffi::OsStrExt::as_bytes(
        path.as_os_str(),
    ))?;

    match unsafe {
        libc::chown(
            path_c.as_ptr(),
            user.unwrap_or(libc::uid_t::MAX),
            group.unwrap_or(libc::gid_t::MAX),
        )
    } {
        0 => Ok(()),
        otherwise => Err(anyhow::anyhow!(
            "failed to change owner of '{}': ({}) '{}'",
            path.display(),
            otherwise,
            std::io::Error::last_os_error()
        )),
    }
}

/// send a signal to a process
///
/// # Errors
///
/// see kill(2) ERRORS
pub fn kill(pid: libc::pid_t, signal: libc::c_int) -> anyhow::Result<()> {
    match unsafe { libc::kill(pid, signal) } {
        0 => Ok(()),
        _ => Err(anyhow::anyhow!(
            "kill({pid}, {signal}): '{}'",
            std::io::Error::last_os_error()
        )),
    }
}

static STOP_SIGNAL_RECEIVED: std::sync::atomic::AtomicBool =
    std::sync::atomic::AtomicBool::new(false);

extern "C" fn on_stop_signal(_: libc::c_int) {
    STOP_SIGNAL_RECEIVED.store(true, std::sync::atomic::Ordering::SeqCst);
}

/// record SIGTERM and SIGINT instead of terminating the process,
/// see [stop_signal_received]
///
/// # Errors
///
/// see signal(2) ERRORS
pub fn catch_stop_signals() -> anyhow::Result<()> {
    for signal in [libc::SIGTERM, libc::SIGINT] {
        let handler = on_stop_signal as extern "C" fn(libc::c_int);
        if unsafe { libc::signal(signal, handler as libc::sighandler_t) } == libc::SIG_ERR {
            anyhow::bail!(
                "signal({signal}): '{}'",
                std::io::Error::last_os_error()
            );
        }
    }
    Ok(())
}

/// has a SIGTERM or SIGINT been received since [catch_stop_signals]
#[must_use]
pub fn stop_signal_received() -> bool {
    STOP_SIGNAL_RECEIVED.load(std::sync::atomic::Ordering::SeqCst)
}
