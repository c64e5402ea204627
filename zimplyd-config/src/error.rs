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

/// A precondition of the service is not fulfilled, the server must not be started
#[allow(clippy::module_name_repetitions)]
#[derive(Debug)]
pub enum ConfigError {
    /// the html template of the package cannot be found
    MissingAsset {
        ///
        path: std::path::PathBuf,
    },
    /// the archive directory does not exist, is not a directory or cannot be listed
    MissingArchiveDir {
        ///
        path: std::path::PathBuf,
        ///
        source: std::io::Error,
    },
    /// port 0 cannot be bound by the server
    InvalidPort(u16),
    /// the bind address is not an ip address
    InvalidAddress(String),
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MissingArchiveDir { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingAsset { path } => {
                write!(f, "template asset not found: '{}'", path.display())
            }
            Self::MissingArchiveDir { path, source } => {
                write!(
                    f,
                    "zim archive directory is not accessible: '{}' ({})",
                    path.display(),
                    source
                )
            }
            Self::InvalidPort(port) => {
                write!(f, "port must be in range 1-65535, got '{}'", port)
            }
            Self::InvalidAddress(address) => {
                write!(f, "bind address is not a valid ip address: '{}'", address)
            }
        }
    }
}
