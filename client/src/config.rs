// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration of the client endpoint.

use crate::role::AsyncFilter;
use crate::role::Role;
use crate::Error;
use ofagent_messages::message::version;
use std::time::Duration;

/// Return the default interval between reconnection attempts.
pub const fn default_reconnect_interval() -> Duration {
    Duration::from_millis(5000)
}

/// Return the default controller host.
pub fn default_host() -> String {
    String::from("127.0.0.1")
}

/// Return the default controller port.
pub const fn default_port() -> u16 {
    ofagent_messages::PORT
}

/// Configuration for a [`crate::Client`].
///
/// The [`ConfigBuilder`] constructs this with defaults suitable for a
/// controller on the local machine.
#[derive(Clone, Debug)]
pub struct Config {
    /// Host name or address of the controller.
    pub host: String,

    /// TCP port of the controller.
    pub port: u16,

    /// Protocol versions to offer, ascending and unique. Never empty: the
    /// preferred version is always a member.
    pub versions: Vec<u8>,

    /// The interval between reconnection attempts after a connection is
    /// lost or refused.
    pub reconnect_interval: Duration,

    /// The controller role assumed at startup.
    pub role: Role,

    /// The initial asynchronous-event filter.
    pub filter: AsyncFilter,
}

impl Config {
    /// The highest version this configuration offers, which is also the
    /// version of the HELLO header sent on connect.
    pub fn highest_version(&self) -> u8 {
        self.versions.iter().copied().max().unwrap_or(version::V4)
    }
}

/// A builder interface for generating client configuration.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    version: Option<u8>,
    versions: Vec<u8>,
    reconnect_interval: Option<Duration>,
    role: Option<Role>,
    filter: Option<AsyncFilter>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the controller host name or address.
    pub fn host(mut self, host: impl AsRef<str>) -> Self {
        self.host = Some(String::from(host.as_ref()));
        self
    }

    /// Set the controller TCP port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the preferred protocol version. Defaults to 4.
    pub fn version(mut self, version: u8) -> Self {
        self.version = Some(version);
        self
    }

    /// Add further supported protocol versions, merged with the preferred
    /// version into a unique sorted set.
    pub fn versions(mut self, versions: impl IntoIterator<Item = u8>) -> Self {
        self.versions.extend(versions);
        self
    }

    /// Set the interval between reconnection attempts.
    pub fn reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = Some(interval);
        self
    }

    /// Set the controller role assumed at startup.
    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Set the initial asynchronous-event filter.
    pub fn filter(mut self, filter: AsyncFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Build a `Config` from `self`.
    pub fn build(self) -> Result<Config, Error> {
        let mut versions = self.versions;
        versions.push(self.version.unwrap_or(version::V4));
        // The version rides in a 7-bit field; zero is not a version.
        if let Some(&bad) = versions.iter().find(|&&v| v == 0 || v > 0x7f) {
            return Err(Error::BadVersion(bad));
        }
        versions.sort_unstable();
        versions.dedup();
        Ok(Config {
            host: self.host.unwrap_or_else(default_host),
            port: self.port.unwrap_or_else(default_port),
            versions,
            reconnect_interval: self
                .reconnect_interval
                .unwrap_or_else(default_reconnect_interval),
            role: self.role.unwrap_or_default(),
            filter: self.filter.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::ConfigBuilder;
    use crate::role::Role;
    use crate::Error;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let config = ConfigBuilder::new().build().unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 6633);
        assert_eq!(config.versions, vec![4]);
        assert_eq!(config.reconnect_interval, Duration::from_millis(5000));
        assert_eq!(config.role, Role::Equal);
    }

    #[test]
    fn test_versions_merged_sorted_unique() {
        let config = ConfigBuilder::new()
            .version(4)
            .versions([1, 4, 3, 1])
            .build()
            .unwrap();
        assert_eq!(config.versions, vec![1, 3, 4]);
        assert_eq!(config.highest_version(), 4);
    }

    #[test]
    fn test_bad_version_rejected() {
        assert!(matches!(
            ConfigBuilder::new().version(0).build().unwrap_err(),
            Error::BadVersion(0),
        ));
        assert!(matches!(
            ConfigBuilder::new().versions([200]).build().unwrap_err(),
            Error::BadVersion(200),
        ));
    }
}
