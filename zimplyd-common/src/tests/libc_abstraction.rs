use crate::libc_abstraction::{
    catch_stop_signals, chown, fork, kill, setsid, stop_signal_received, ForkResult,
};

#[test]
fn test_fork() {
    match fork().unwrap() {
        ForkResult::Parent(pid) => {
            let mut status = 0;
            assert_eq!(unsafe { libc::waitpid(pid, &mut status, 0) }, pid);
        }
        ForkResult::Child => unsafe { libc::_exit(0) },
    }
}

#[test]
fn test_setsid() {
    match fork().unwrap() {
        ForkResult::Parent(pid) => {
            let mut status = 0;
            assert_eq!(unsafe { libc::waitpid(pid, &mut status, 0) }, pid);
            assert!(libc::WIFEXITED(status));
            assert_eq!(libc::WEXITSTATUS(status), 0);
        }
        ForkResult::Child => {
            // running the test in a subprocess to not pollute the other tests
            let code = i32::from(!(setsid().is_ok() && setsid().is_err()));
            unsafe { libc::_exit(code) }
        }
    }
}

#[test]
fn test_chown_file() {
    let user = users::get_current_uid();
    let group = users::get_current_gid();

    assert!(chown(
        std::path::Path::new("./no_such_file_exist"),
        Some(user),
        None
    )
    .is_err());

    assert!(chown(std::path::Path::new("./with\0null_byte"), Some(user), None).is_err());

    let dir = tempfile::tempdir().unwrap();
    let file_to_create = dir.path().join("owned");
    let _file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .open(&file_to_create)
        .unwrap();

    assert!(chown(&file_to_create, Some(user), None).is_ok());
    assert!(chown(&file_to_create, None, Some(group)).is_ok());
    assert!(chown(&file_to_create, None, None).is_ok());
}

#[test]
fn test_kill() {
    let mut child = std::process::Command::new("sleep")
        .arg("30")
        .spawn()
        .unwrap();

    let pid = libc::pid_t::try_from(child.id()).unwrap();
    assert!(kill(pid, 0).is_ok());
    assert!(kill(pid, libc::SIGTERM).is_ok());

    let status = child.wait().unwrap();
    assert_eq!(
        std::os::unix::process::ExitStatusExt::signal(&status),
        Some(libc::SIGTERM)
    );

    assert!(kill(libc::pid_t::MAX, 0).is_err());
}

#[test]
fn test_catch_stop_signals() {
    match fork().unwrap() {
        ForkResult::Parent(pid) => {
            let mut status = 0;
            assert_eq!(unsafe { libc::waitpid(pid, &mut status, 0) }, pid);
            assert!(libc::WIFEXITED(status));
            assert_eq!(libc::WEXITSTATUS(status), 0);
        }
        ForkResult::Child => {
            // the handler is process wide, keep it out of the test runner
            let ok = catch_stop_signals().is_ok()
                && !stop_signal_received()
                && unsafe { libc::raise(libc::SIGTERM) } == 0
                && stop_signal_received();
            unsafe { libc::_exit(i32::from(!ok)) }
        }
    }
}
