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
use crate::LaunchSpecification;
use zimplyd_config::ValidatedConfig;

/// Placeholders:
/// - `{user}`, `{group}` - the service identity
/// - `{state_line}` - `StateDirectory=` when under `/var/lib`, `ReadWritePaths=` otherwise
/// - `{working_dir}` - the state directory
/// - `{environment}` - one `Environment=` line per variable
/// - `{exec_start}` - the full invocation of the server
const SYSTEMD_UNIT: &str = r#"[Unit]
Description=ZIMply offline encyclopedia server
After=network.target

[Service]
Type=simple
User={user}
Group={group}
{state_line}
WorkingDirectory={working_dir}
{environment}ExecStart={exec_start}
Restart=always

[Install]
WantedBy=multi-user.target
"#;

/// root of the directories systemd manages with `StateDirectory=`
const SYSTEMD_STATE_ROOT: &str = "/var/lib";

/// Render the systemd unit equivalent to the supervision of `spec`.
#[must_use]
pub fn render_systemd_unit(config: &ValidatedConfig, spec: &LaunchSpecification) -> String {
    let system = &config.server.system;

    let state_line = match system.state_dir.strip_prefix(SYSTEMD_STATE_ROOT) {
        Ok(relative) if !relative.as_os_str().is_empty() => {
            format!("StateDirectory={}", quote(&relative.to_string_lossy()))
        }
        _ => format!("ReadWritePaths={}", quote(&system.state_dir.to_string_lossy())),
    };

    let environment = spec
        .environment
        .iter()
        .map(|(key, value)| {
            format!(
                "Environment={}\n",
                quote(&format!("{key}={}", value.to_string_lossy()))
            )
        })
        .collect::<String>();

    let exec_start = spec
        .command_line()
        .iter()
        .map(|arg| quote(&arg.to_string_lossy()).replace('$', "$$"))
        .collect::<Vec<_>>()
        .join(" ");

    SYSTEMD_UNIT
        .replace("{user}", &system.user)
        .replace("{group}", &system.group)
        .replace("{state_line}", &state_line)
        .replace(
            "{working_dir}",
            &escape_specifiers(&spec.working_dir.to_string_lossy()),
        )
        .replace("{environment}", &environment)
        .replace("{exec_start}", &exec_start)
}

/// `%` introduces a specifier in most settings of a unit
fn escape_specifiers(word: &str) -> String {
    word.replace('%', "%%")
}

/// escape the specifiers of systemd, and double-quote the words that need it
fn quote(word: &str) -> String {
    let escaped = escape_specifiers(word);
    if word.is_empty()
        || word
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '\'' || c == '\\')
    {
        format!("\"{}\"", escaped.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        escaped
    }
}
