use crate::{log_channel, Config, ConfigError};
use zimplyd_common::re::log;

/// A [Config] whose preconditions were checked, the only way to launch the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    inner: Config,
}

impl std::ops::Deref for ValidatedConfig {
    type Target = Config;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl ValidatedConfig {
    ///
    #[must_use]
    pub fn into_inner(self) -> Config {
        self.inner
    }
}

impl Config {
    /// Check the preconditions of the service before anything is started.
    ///
    /// The template asset is checked first, then the archive directory; both
    /// are skipped when `app.strict` is false.
    ///
    /// # Errors
    ///
    /// * [ConfigError::InvalidPort] the port is 0
    /// * [ConfigError::InvalidAddress] the bind address is not an ip address
    /// * [ConfigError::MissingAsset] the template of the package is not a file
    /// * [ConfigError::MissingArchiveDir] the archive directory cannot be listed
    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidPort(self.server.port));
        }

        if self.server.ip_address.parse::<std::net::IpAddr>().is_err() {
            return Err(ConfigError::InvalidAddress(self.server.ip_address));
        }

        if self.app.strict {
            let template = self.app.template();
            if !template.is_file() {
                return Err(ConfigError::MissingAsset { path: template });
            }

            let archive_count = count_archives(&self.server.zim_path).map_err(|source| {
                ConfigError::MissingArchiveDir {
                    path: self.server.zim_path.clone(),
                    source,
                }
            })?;

            if archive_count == 0 {
                log::warn!(
                    target: log_channel::CONFIG,
                    "no zim archive found in '{}'",
                    self.server.zim_path.display()
                );
            }
        } else {
            log::debug!(
                target: log_channel::CONFIG,
                "strict mode disabled, template and archive directory are not checked"
            );
        }

        Ok(ValidatedConfig { inner: self })
    }
}

fn count_archives(dir: &std::path::Path) -> std::io::Result<usize> {
    if !std::fs::metadata(dir)?.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            "not a directory",
        ));
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        if entry?.path().extension() == Some(std::ffi::OsStr::new("zim")) {
            count += 1;
        }
    }
    Ok(count)
}
