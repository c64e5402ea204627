use super::FakeAccounts;
use crate::{provision_identity, Account, AccountDatabase, ProvisionError, ServiceAccount};
use zimplyd_common::re::libc;

fn account(state_dir: &std::path::Path) -> ServiceAccount {
    ServiceAccount {
        user: "zimply".to_string(),
        group: "zimply".to_string(),
        state_dir: state_dir.to_path_buf(),
    }
}

#[test]
fn create_identity() {
    let root = tempfile::tempdir().unwrap();
    let state_dir = root.path().join("var/lib/zimply");
    let mut accounts = FakeAccounts::default();

    let identity = provision_identity(&mut accounts, &account(&state_dir)).unwrap();

    assert_eq!(identity.user, "zimply");
    assert_eq!(identity.group, "zimply");
    assert_eq!(identity.uid, unsafe { libc::getuid() });
    assert_eq!(identity.gid, unsafe { libc::getgid() });
    assert_eq!(identity.state_dir, state_dir);

    let metadata = std::fs::metadata(&state_dir).unwrap();
    assert!(metadata.is_dir());
    assert_eq!(
        std::os::unix::fs::PermissionsExt::mode(&metadata.permissions()) & 0o777,
        0o750
    );
    assert_eq!(
        accounts.user("zimply").unwrap().home,
        state_dir,
        "the state directory is the home of the account"
    );
}

#[test]
fn idempotent() {
    let root = tempfile::tempdir().unwrap();
    let mut accounts = FakeAccounts::default();
    let account = account(&root.path().join("zimply"));

    let first = provision_identity(&mut accounts, &account).unwrap();
    std::fs::write(first.state_dir.join("wikipedia_en_all.idx"), "index").unwrap();

    let second = provision_identity(&mut accounts, &account).unwrap();

    assert_eq!(first, second);
    assert_eq!((accounts.created_groups, accounts.created_users), (1, 1));
    assert_eq!((accounts.groups.len(), accounts.users.len()), (1, 1));
    assert_eq!(
        std::fs::read_to_string(second.state_dir.join("wikipedia_en_all.idx")).unwrap(),
        "index",
        "the state directory survives"
    );
}

#[test]
fn existing_accounts_are_reused() {
    let root = tempfile::tempdir().unwrap();
    let state_dir = root.path().join("zimply");
    let mut accounts = FakeAccounts::default();
    accounts
        .groups
        .insert("zimply".to_string(), unsafe { libc::getgid() });
    accounts.users.insert(
        "zimply".to_string(),
        Account {
            uid: unsafe { libc::getuid() },
            gid: unsafe { libc::getgid() },
            home: state_dir.clone(),
        },
    );

    let identity = provision_identity(&mut accounts, &account(&state_dir)).unwrap();

    assert_eq!((accounts.created_groups, accounts.created_users), (0, 0));
    assert_eq!(identity.state_dir, state_dir);
    assert!(state_dir.is_dir());
}

#[test]
fn home_mismatch_is_refused() {
    let root = tempfile::tempdir().unwrap();
    let state_dir = root.path().join("zimply");
    let mut accounts = FakeAccounts::default();
    accounts
        .groups
        .insert("zimply".to_string(), unsafe { libc::getgid() });
    accounts.users.insert(
        "zimply".to_string(),
        Account {
            uid: unsafe { libc::getuid() },
            gid: unsafe { libc::getgid() },
            home: "/nonexistent".into(),
        },
    );

    let err = provision_identity(&mut accounts, &account(&state_dir)).unwrap_err();
    match &err {
        ProvisionError::HomeMismatch {
            user,
            home,
            expected,
        } => {
            assert_eq!(user, "zimply");
            assert_eq!(home, std::path::Path::new("/nonexistent"));
            assert_eq!(expected, &state_dir);
        }
        otherwise => panic!("{otherwise:?}"),
    }
    assert_eq!(
        err.to_string(),
        format!(
            "home of 'zimply' is '/nonexistent', expected '{}'",
            state_dir.display()
        )
    );
    assert_eq!((accounts.created_groups, accounts.created_users), (0, 0));
    assert!(!state_dir.exists(), "nothing is created after a failure");
}

#[test]
fn creation_refused() {
    let root = tempfile::tempdir().unwrap();
    let state_dir = root.path().join("zimply");
    let mut accounts = FakeAccounts {
        refuse_creation: true,
        ..FakeAccounts::default()
    };

    match provision_identity(&mut accounts, &account(&state_dir)) {
        Err(ProvisionError::Command { program, .. }) => assert_eq!(program, "groupadd"),
        otherwise => panic!("{otherwise:?}"),
    }
    assert!(!state_dir.exists(), "nothing is created after a failure");
}

#[test]
fn state_dir_is_a_file() {
    let root = tempfile::tempdir().unwrap();
    let state_dir = root.path().join("zimply");
    std::fs::write(&state_dir, "").unwrap();

    let err = provision_identity(&mut FakeAccounts::default(), &account(&state_dir)).unwrap_err();
    assert!(matches!(err, ProvisionError::StateDirectory { ref path, .. } if path == &state_dir));
    assert!(err
        .to_string()
        .starts_with(&format!("cannot prepare state directory '{}'", state_dir.display())));
}
