/// Flags and command to change zimplyd execution
#[derive(Debug, clap::Parser, PartialEq)]
#[clap(about, version, author)]
pub struct Args {
    /// Path of the zimplyd configuration file (toml format)
    #[clap(short, long)]
    pub config: String,

    /// Commands
    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// Do not run the program as a daemon
    #[clap(short, long)]
    pub no_daemon: bool,
}

/// Subcommand run instead of the supervisor
#[derive(Debug, clap::Subcommand, PartialEq)]
pub enum Commands {
    /// Show the loaded config (as serialized json format)
    ConfigShow,
    /// Show the difference between the loaded config and the default one
    ConfigDiff,
    /// Check the preconditions of the loaded config, without starting anything
    ConfigCheck,
    /// Print the systemd unit equivalent to the supervision
    SystemdUnit,
}
