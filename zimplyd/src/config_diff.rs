use zimplyd_common::re::{anyhow, serde_json};
use zimplyd_config::Config;

/// The configuration zimplyd would use if only the mandatory fields of
/// `config` were provided.
#[must_use]
pub fn default_of(config: &Config) -> Config {
    Config::builder()
        .with_current_version()
        .with_zim_path(&config.server.zim_path)
        .with_default_interfaces()
        .with_default_system()
        .with_default_logs_settings()
        .with_default_app()
        .with_default_supervisor()
        .build()
}

/// Line by line difference between the json serialization of two configurations,
/// `-` lines are only in `reference`, `+` lines only in `loaded`.
///
/// # Errors
///
/// * one of the configuration cannot be serialized
pub fn render_diff(reference: &Config, loaded: &Config, colored: bool) -> anyhow::Result<String> {
    let reference = serde_json::to_string_pretty(reference)?;
    let loaded = serde_json::to_string_pretty(loaded)?;

    let (red, green, reset) = if colored {
        ("\x1b[0;31m", "\x1b[0;32m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    let mut out = String::new();
    for line in diff::lines(&reference, &loaded) {
        let line = match line {
            diff::Result::Left(left) => format!("-{red}{left}{reset}"),
            diff::Result::Both(same, _) => format!(" {same}"),
            diff::Result::Right(right) => format!("+{green}{right}{reset}"),
        };
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}
