//! Relayer configuration

pub mod error;

use core::time::Duration;
use std::{
    fs,
    fs::File,
    io::Write,
    path::Path,
};

use serde_derive::{Deserialize, Serialize};

pub use error::Error;

pub mod default {
    use super::*;

    pub fn max_failures() -> u64 {
        3
    }

    pub fn failure_cooldown() -> Duration {
        Duration::from_secs(5)
    }

    pub fn max_attempts() -> u32 {
        5
    }

    pub fn retry_delay() -> Duration {
        Duration::from_millis(400)
    }

    pub fn max_retry_delay() -> Duration {
        Duration::from_secs(5)
    }

    pub fn max_msg_num() -> usize {
        30
    }

    pub fn max_tx_size() -> usize {
        2 * 1024 * 1024
    }

    pub fn poll_interval() -> Duration {
        Duration::from_millis(100)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub handshake: HandshakeConfig,
    #[serde(default)]
    pub header_sync: HeaderSyncConfig,
    #[serde(default)]
    pub tx: TxConfig,
    #[serde(default)]
    pub event_listener: EventListenerConfig,
}

impl Config {
    /// Check the values that deserialization alone cannot rule out.
    pub fn validate(&self) -> Result<(), Error> {
        if self.handshake.max_failures == 0 {
            return Err(Error::invalid_value(
                "handshake.max_failures".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        if self.header_sync.max_attempts == 0 {
            return Err(Error::invalid_value(
                "header_sync.max_attempts".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        if self.tx.max_msg_num == 0 {
            return Err(Error::invalid_value(
                "tx.max_msg_num".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        if self.tx.max_tx_size == 0 {
            return Err(Error::invalid_value(
                "tx.max_tx_size".to_string(),
                "must be at least 1 byte".to_string(),
            ));
        }

        Ok(())
    }
}

/// Bounds of the channel handshake driver.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HandshakeConfig {
    /// The driver gives up on the handshake when this many consecutive
    /// submissions have failed.
    #[serde(default = "default::max_failures")]
    pub max_failures: u64,

    /// How long the driver waits after a failed submission.
    #[serde(default = "default::failure_cooldown", with = "humantime_serde")]
    pub failure_cooldown: Duration,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            max_failures: default::max_failures(),
            failure_cooldown: default::failure_cooldown(),
        }
    }
}

/// Retry bounds when computing the update headers of a handshake step.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderSyncConfig {
    /// Total number of attempts, including the first one.
    #[serde(default = "default::max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default::retry_delay", with = "humantime_serde")]
    pub retry_delay: Duration,

    #[serde(default = "default::max_retry_delay", with = "humantime_serde")]
    pub max_retry_delay: Duration,
}

impl Default for HeaderSyncConfig {
    fn default() -> Self {
        Self {
            max_attempts: default::max_attempts(),
            retry_delay: default::retry_delay(),
            max_retry_delay: default::max_retry_delay(),
        }
    }
}

/// Bounds on the transactions a batch of messages is split into.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TxConfig {
    #[serde(default = "default::max_msg_num")]
    pub max_msg_num: usize,

    /// Maximum encoded size of the messages of one transaction, in bytes.
    #[serde(default = "default::max_tx_size")]
    pub max_tx_size: usize,
}

impl Default for TxConfig {
    fn default() -> Self {
        Self {
            max_msg_num: default::max_msg_num(),
            max_tx_size: default::max_tx_size(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EventListenerConfig {
    #[serde(default = "default::poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,
}

impl Default for EventListenerConfig {
    fn default() -> Self {
        Self {
            poll_interval: default::poll_interval(),
        }
    }
}

/// Attempt to load and parse the TOML config file as a `Config`.
pub fn load(path: impl AsRef<Path>) -> Result<Config, Error> {
    let config_toml = fs::read_to_string(&path).map_err(Error::io)?;

    let config = toml::from_str::<Config>(&config_toml[..]).map_err(Error::decode)?;
    config.validate()?;

    Ok(config)
}

/// Serialize the given `Config` as TOML to the given config file.
pub fn store(config: &Config, path: impl AsRef<Path>) -> Result<(), Error> {
    let mut file = if path.as_ref().exists() {
        fs::OpenOptions::new().write(true).truncate(true).open(path)
    } else {
        File::create(path)
    }
    .map_err(Error::io)?;

    store_writer(config, &mut file)
}

/// Serialize the given `Config` as TOML to the given writer.
pub(crate) fn store_writer(config: &Config, mut writer: impl Write) -> Result<(), Error> {
    let toml_config = toml::to_string_pretty(&config).map_err(Error::encode)?;

    writeln!(writer, "{toml_config}").map_err(Error::io)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn defaults() {
        let config = Config::default();

        assert_eq!(config.handshake.max_failures, 3);
        assert_eq!(config.handshake.failure_cooldown, Duration::from_secs(5));
        assert_eq!(config.header_sync.max_attempts, 5);
        assert_eq!(config.header_sync.retry_delay, Duration::from_millis(400));
        assert_eq!(config.tx.max_msg_num, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_partial_config() {
        let config = toml::from_str::<Config>(
            r#"
            [handshake]
            failure_cooldown = "250ms"

            [header_sync]
            max_attempts = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.handshake.max_failures, 3);
        assert_eq!(
            config.handshake.failure_cooldown,
            Duration::from_millis(250)
        );
        assert_eq!(config.header_sync.max_attempts, 2);
        assert_eq!(config.header_sync.retry_delay, Duration::from_millis(400));
        assert_eq!(config.event_listener, EventListenerConfig::default());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let res = toml::from_str::<Config>("[handshake]\nmax_failure = 2\n");
        assert!(res.is_err());
    }

    #[test]
    fn zero_max_failures_is_invalid() {
        let mut config = Config::default();
        config.handshake.max_failures = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn serialize() {
        let config = Config::default();

        let mut buffer = Vec::new();
        let res = store_writer(&config, &mut buffer);
        assert!(res.is_ok(), "{res:?}");
    }

    #[test]
    fn store_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.tx.max_msg_num = 5;
        config.handshake.failure_cooldown = Duration::from_secs(2);

        store(&config, &path).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded, config);
    }
}
