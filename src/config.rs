use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client;
use crate::protocol::{defaults, LengthPrefixedFramer, LineFramer, PrefixWidth};
use crate::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub line: LineConfig,
    #[serde(default)]
    pub prefixed: PrefixedConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineConfig {
    #[serde(default = "LineConfig::default_delimiter")]
    pub delimiter: String,
    #[serde(default = "LineConfig::default_max_length")]
    pub max_length: usize,
}

impl LineConfig {
    fn default_delimiter() -> String {
        String::from_utf8_lossy(defaults::LINE_DELIMITER).into_owned()
    }

    fn default_max_length() -> usize {
        defaults::LINE_MAX_LENGTH
    }

    pub fn framer(&self) -> crate::Result<LineFramer> {
        LineFramer::new()
            .with_delimiter(self.delimiter.clone().into_bytes())
            .map(|it| it.with_max_length(self.max_length))
    }
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            delimiter: Self::default_delimiter(),
            max_length: Self::default_max_length(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixedConfig {
    /// Prefix width in bytes: 1, 2 or 4.
    #[serde(default = "PrefixedConfig::default_width")]
    pub width: u8,
    #[serde(default = "PrefixedConfig::default_max_length")]
    pub max_length: usize,
}

impl PrefixedConfig {
    fn default_width() -> u8 {
        PrefixWidth::U16 as u8
    }

    fn default_max_length() -> usize {
        defaults::PREFIXED_MAX_LENGTH
    }

    pub fn framer(&self) -> crate::Result<LengthPrefixedFramer> {
        let width = PrefixWidth::try_from(self.width)?;
        Ok(LengthPrefixedFramer::new(width).with_max_length(self.max_length))
    }
}

impl Default for PrefixedConfig {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
            max_length: Self::default_max_length(),
        }
    }
}

/// Query timeouts in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "QueryConfig::default_datagram_timeout")]
    pub datagram_timeout: u64,
    #[serde(default = "QueryConfig::default_stream_timeout")]
    pub stream_timeout: u64,
}

impl QueryConfig {
    fn default_datagram_timeout() -> u64 {
        client::defaults::DATAGRAM_TIMEOUT.as_secs()
    }

    fn default_stream_timeout() -> u64 {
        client::defaults::STREAM_TIMEOUT.as_secs()
    }

    pub fn datagram_timeout(&self) -> Duration {
        Duration::from_secs(self.datagram_timeout)
    }

    pub fn stream_timeout(&self) -> Duration {
        Duration::from_secs(self.stream_timeout)
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            datagram_timeout: Self::default_datagram_timeout(),
            stream_timeout: Self::default_stream_timeout(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> crate::Result<()> {
        if self.line.delimiter.is_empty() {
            bail!(Error::InvalidConfig("line.delimiter cannot be empty".into()));
        }
        if self.line.max_length == 0 {
            bail!(Error::InvalidConfig("line.max_length cannot be zero".into()));
        }
        PrefixWidth::try_from(self.prefixed.width)?;
        let max = client::defaults::MAX_TIMEOUT.as_secs();
        for timeout in [self.query.datagram_timeout, self.query.stream_timeout] {
            if timeout == 0 || timeout > max {
                bail!(Error::InvalidConfig(
                    format!("query timeout must be within 1..={} seconds", max).into()
                ));
            }
        }
        Ok(())
    }
}

impl FromStr for Config {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let c: Config = toml::from_str(s)?;
        c.validate()?;
        Ok(c)
    }
}

pub fn read_from_toml(pt: &PathBuf) -> crate::Result<Config> {
    let b = std::fs::read(pt)?;
    let s = String::from_utf8(b)?;
    s.parse()
}
