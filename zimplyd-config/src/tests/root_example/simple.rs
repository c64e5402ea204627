use crate::Config;
use zimplyd_common::re::log;

#[test]
fn parse() {
    let toml = include_str!("../../../../config/simple.toml");
    pretty_assertions::assert_eq!(
        Config::from_toml(toml).unwrap(),
        Config::builder()
            .with_version_str(">=1.0.0")
            .unwrap()
            .with_enabled_zim_path("/data/zim")
            .with_interface("127.0.0.1", 9000)
            .with_system("zimply", "zimply", "/var/lib/zimply")
            .with_logs_settings(
                "/var/log/zimplyd/zimplyd.log",
                "{d} {l} {t} - {m}{n}",
                std::collections::BTreeMap::from([
                    ("default".to_string(), log::LevelFilter::Info),
                    ("zimply::stderr".to_string(), log::LevelFilter::Warn),
                ])
            )
            .with_app("/usr/bin/python3", "/usr/share/zimply", true)
            .with_supervisor(
                std::time::Duration::from_secs(30),
                std::time::Duration::from_millis(100)
            )
            .build()
    );
}
