use crate::Config;


mod root_example {
    mod minimal;
    mod relaxed;
    mod simple;
}

#[test]
fn version_requirement_not_fulfilled() {
    let err = Config::from_toml(
        r#"
version_requirement = "<1.0.0"

[server]
zim_path = "/data/zim"
"#,
    )
    .unwrap_err();

    assert!(
        err.to_string()
            .starts_with("Version requirement not fulfilled: expected '<1.0.0'"),
        "{err}"
    );
}

#[test]
fn zim_path_is_mandatory() {
    assert!(Config::from_toml(
        r#"
version_requirement = ">=1.0.0"

[server]
port = 8081
"#,
    )
    .is_err());
}

#[test]
fn unknown_field() {
    assert!(Config::from_toml(
        r#"
version_requirement = ">=1.0.0"

[server]
zim_path = "/data/zim"
zimPath = "/data/zim"
"#,
    )
    .is_err());
}

#[test]
fn port_out_of_range() {
    assert!(Config::from_toml(
        r#"
version_requirement = ">=1.0.0"

[server]
zim_path = "/data/zim"
port = 65536
"#,
    )
    .is_err());
}
