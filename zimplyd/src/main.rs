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
use zimplyd::{default_of, render_diff, Args, Commands};
use zimplyd_common::{
    libc_abstraction::{catch_stop_signals, daemon, ForkResult},
    re::{
        anyhow::{self, Context},
        log, serde_json,
    },
};
use zimplyd_config::{get_log4rs_config, re::log4rs, Config};
use zimplyd_supervisor::{
    log_channels, render_systemd_unit, AccountDatabase, LaunchSpecification, ServiceAccount,
    ServiceIdentity, StopHandle, Supervisor, SystemAccounts,
};

fn systemd_unit(config: Config) -> anyhow::Result<String> {
    let config = config.validate()?;
    let account = ServiceAccount::from(&config.server.system);

    // the unit refers to the identity by name, the ids are informative only
    let identity = ServiceIdentity {
        uid: SystemAccounts.user(&account.user).map_or(0, |user| user.uid),
        gid: SystemAccounts.group_id(&account.group).unwrap_or(0),
        user: account.user,
        group: account.group,
        state_dir: account.state_dir,
    };

    Ok(render_systemd_unit(
        &config,
        &LaunchSpecification::new(&config, &identity),
    ))
}

fn run_supervisor(config: Config) -> anyhow::Result<()> {
    catch_stop_signals()?;

    Supervisor::new(ServiceAccount::from(&config.server.system))
        .with_stop_handle(StopHandle::with_stop_signals())
        .run(config)
        .context("Supervisor failed")?;

    log::info!(target: log_channels::SUPERVISOR, "zimplyd stopped");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = <Args as clap::StructOpt>::parse();

    let config = std::fs::read_to_string(&args.config)
        .with_context(|| format!("Cannot read file '{}'", args.config))
        .and_then(|data| Config::from_toml(&data).context("File contains format error"))
        .context("Cannot parse the configuration")?;

    if let Some(command) = args.command {
        match command {
            Commands::ConfigShow => {
                let stringified = serde_json::to_string_pretty(&config)?;
                println!("Loaded configuration: {}", stringified);
            }
            Commands::ConfigDiff => {
                print!("{}", render_diff(&default_of(&config), &config, true)?);
            }
            Commands::ConfigCheck => {
                config.validate().context("Configuration check failed")?;
                println!("Configuration is valid");
            }
            Commands::SystemdUnit => {
                print!("{}", systemd_unit(config)?);
            }
        }
        return Ok(());
    }

    get_log4rs_config(&config, args.no_daemon)
        .context("Logs configuration contain error")
        .map(log4rs::init_config)
        .context("Cannot initialize logs")??;

    if args.no_daemon {
        run_supervisor(config)
    } else {
        match daemon()? {
            ForkResult::Child => run_supervisor(config),
            ForkResult::Parent(pid) => {
                log::info!(
                    target: log_channels::SUPERVISOR,
                    "zimplyd running in process id={pid}"
                );
                Ok(())
            }
        }
    }
}
