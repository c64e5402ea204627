use crate::{log_channel, Config};
use zimplyd_common::re::{anyhow, log};

/// key of `[server.logs.level]` giving the level of the root logger
pub const ROOT_LEVEL_KEY: &str = "default";

const FILE_APPENDER: &str = "file";
const CONSOLE_APPENDER: &str = "console";

/// the target column tells the supervisor records from the server output
const CONSOLE_PATTERN: &str = "{d(%H:%M:%S%.3f)} {h({l:<5})} {t:<16} | {m}{n}";

fn encoder(pattern: &str) -> Box<log4rs::encode::pattern::PatternEncoder> {
    Box::new(log4rs::encode::pattern::PatternEncoder::new(pattern))
}

/// Build the logging configuration of zimplyd: every record goes to
/// `server.logs.filepath`, and to the console as well when not daemonised.
///
/// # Errors
///
/// * the log file cannot be opened
/// * a logger name is invalid
pub fn get_log4rs_config(config: &Config, no_daemon: bool) -> anyhow::Result<log4rs::Config> {
    use anyhow::Context;
    use log4rs::{
        append::{console::ConsoleAppender, file::FileAppender},
        config::{Appender, Logger, Root},
    };

    let logs = &config.server.logs;

    let mut appenders = vec![Appender::builder().build(
        FILE_APPENDER,
        Box::new(
            FileAppender::builder()
                .encoder(encoder(&logs.format))
                .build(&logs.filepath)
                .with_context(|| format!("Cannot open log file '{}'", logs.filepath.display()))?,
        ),
    )];
    if no_daemon {
        appenders.push(Appender::builder().build(
            CONSOLE_APPENDER,
            Box::new(
                ConsoleAppender::builder()
                    .encoder(encoder(CONSOLE_PATTERN))
                    .build(),
            ),
        ));
    }
    let appender_names = appenders
        .iter()
        .map(|appender| appender.name().to_string())
        .collect::<Vec<_>>();

    let root_level = logs
        .level
        .get(ROOT_LEVEL_KEY)
        .copied()
        .unwrap_or(log::LevelFilter::Warn);

    log4rs::Config::builder()
        .appenders(appenders)
        .loggers(
            logs.level
                .iter()
                .filter(|(target, _)| target.as_str() != ROOT_LEVEL_KEY)
                .map(|(target, level)| Logger::builder().build(target, *level)),
        )
        .build(Root::builder().appenders(appender_names).build(root_level))
        .map_err(|errors| {
            for e in errors.errors() {
                log::error!(target: log_channel::CONFIG, "{}", e);
            }
            anyhow::anyhow!(errors)
        })
}
