use crate::Config;

#[test]
fn parse() {
    let toml = include_str!("../../../../config/minimal.toml");
    pretty_assertions::assert_eq!(
        Config::from_toml(toml).unwrap(),
        Config::builder()
            .with_version_str(">=1.0.0")
            .unwrap()
            .with_zim_path("/data/zim")
            .with_default_interfaces()
            .with_default_system()
            .with_default_logs_settings()
            .with_default_app()
            .with_default_supervisor()
            .build()
    );
}
