use crate::Config;

#[test]
fn parse() {
    let toml = include_str!("../../../../config/relaxed.toml");
    pretty_assertions::assert_eq!(
        Config::from_toml(toml).unwrap(),
        Config::builder()
            .with_version_str(">=1.0.0")
            .unwrap()
            .with_enabled_zim_path("/srv/wikipedia")
            .with_default_interfaces()
            .with_default_system()
            .with_default_logs_settings()
            .with_app("/opt/zimply/venv/bin/python", "/opt/zimply", false)
            .with_default_supervisor()
            .build()
    );
}

#[test]
fn validate_without_filesystem_checks() {
    let config = Config::from_toml(include_str!("../../../../config/relaxed.toml"))
        .unwrap()
        .validate()
        .unwrap();

    assert_eq!(config.server.zim_path, std::path::PathBuf::from("/srv/wikipedia"));
}
