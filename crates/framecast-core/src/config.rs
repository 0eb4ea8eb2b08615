//! Runtime configuration (spec §4.11, ambient stack). The reference
//! design treats every tunable as a compile-time constant; this layer
//! only lets an operator override those defaults from a TOML file
//! without recompiling — every field falls back to the spec's
//! compile-time constant when the file is absent or the field omitted,
//! in the style of the teacher's `Config`/`ConfigError`.

use crate::constants::{
    BUFFER_SIZE, CHUNK_SIZE, GAP_WAIT_NACK_MS, JITTER_BUFFER_SIZE, JITTER_DELAY_MS,
    MAX_STORED_PACKETS, NACK_BUFFER_SIZE, NACK_MAX_RETRIES, NEXT_PACKET_WAIT_MS,
    REORDER_BUFFER_SIZE, RTT_MS, WAIT_NACK_MS,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_BIND_TIMEOUT_MS: u64 = 50;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    TomlDeserialization {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize default config: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    #[error("invalid config: {reason}")]
    Validation { reason: String },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub chunk_size: usize,
    pub jitter_buffer_size: usize,
    pub jitter_delay_ms: u64,
    pub reorder_buffer_size: usize,
    pub next_packet_wait_ms: u64,
    pub nack_buffer_size: usize,
    pub nack_max_retries: u32,
    pub rtt_ms: u64,
    pub buffer_size: usize,
    pub max_stored_packets: usize,
    pub wait_nack_ms: u64,
    pub gap_wait_nack_ms: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            jitter_buffer_size: JITTER_BUFFER_SIZE,
            jitter_delay_ms: JITTER_DELAY_MS,
            reorder_buffer_size: REORDER_BUFFER_SIZE,
            next_packet_wait_ms: NEXT_PACKET_WAIT_MS,
            nack_buffer_size: NACK_BUFFER_SIZE,
            nack_max_retries: NACK_MAX_RETRIES,
            rtt_ms: RTT_MS,
            buffer_size: BUFFER_SIZE,
            max_stored_packets: MAX_STORED_PACKETS,
            wait_nack_ms: WAIT_NACK_MS,
            gap_wait_nack_ms: GAP_WAIT_NACK_MS,
        }
    }
}

/// Network-facing overrides (spec §4.11): an operator can pin the
/// receiver's listen address or the sender's destination/image in the
/// config file instead of passing them on the command line every time.
/// A CLI positional argument, when given, still wins — see each
/// binary's `main.rs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub listen_addr: Option<String>,
    pub destination_addr: Option<String>,
    pub image_path: Option<String>,
    pub bind_timeout_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            listen_addr: None,
            destination_addr: None,
            image_path: None,
            bind_timeout_ms: DEFAULT_BIND_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub tuning: Tuning,
}

impl Config {
    /// Loads `path` if it exists, otherwise returns built-in defaults —
    /// no file is written, unlike the teacher's `config::handle()`,
    /// since this is a CLI tool rather than a long-lived server.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config =
            toml::from_str(&text).map_err(|source| ConfigError::TomlDeserialization {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let n = &self.network;
        if let Some(addr) = &n.listen_addr {
            if SocketAddr::from_str(addr).is_err() {
                return Err(ConfigError::Validation {
                    reason: format!("network.listen_addr {addr:?} is not a valid IP:PORT"),
                });
            }
        }
        if let Some(addr) = &n.destination_addr {
            if SocketAddr::from_str(addr).is_err() {
                return Err(ConfigError::Validation {
                    reason: format!("network.destination_addr {addr:?} is not a valid IP:PORT"),
                });
            }
        }
        if n.bind_timeout_ms == 0 {
            return Err(ConfigError::Validation {
                reason: "network.bind_timeout_ms must be nonzero".into(),
            });
        }

        let t = &self.tuning;
        if t.chunk_size == 0 {
            return Err(ConfigError::Validation {
                reason: "tuning.chunk_size must be nonzero".into(),
            });
        }
        if t.reorder_buffer_size == 0 {
            return Err(ConfigError::Validation {
                reason: "tuning.reorder_buffer_size must be nonzero".into(),
            });
        }
        if t.jitter_buffer_size == 0 {
            return Err(ConfigError::Validation {
                reason: "tuning.jitter_buffer_size must be nonzero".into(),
            });
        }
        if t.nack_buffer_size == 0 {
            return Err(ConfigError::Validation {
                reason: "tuning.nack_buffer_size must be nonzero".into(),
            });
        }
        if t.max_stored_packets == 0 {
            return Err(ConfigError::Validation {
                reason: "tuning.max_stored_packets must be nonzero".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_spec_defaults() {
        let config = Config::load_or_default(Path::new("/nonexistent/framecast.toml")).unwrap();
        assert_eq!(config.tuning.chunk_size, CHUNK_SIZE);
        assert_eq!(config.tuning.nack_max_retries, NACK_MAX_RETRIES);
    }

    #[test]
    fn zero_sized_tunable_fails_validation() {
        let mut config = Config::default();
        config.tuning.chunk_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn partial_toml_falls_back_to_defaults_for_missing_fields() {
        let parsed: Config = toml::from_str("[tuning]\nrtt_ms = 50\n").unwrap();
        assert_eq!(parsed.tuning.rtt_ms, 50);
        assert_eq!(parsed.tuning.chunk_size, CHUNK_SIZE);
    }

    #[test]
    fn network_section_is_absent_by_default() {
        let config = Config::default();
        assert!(config.network.listen_addr.is_none());
        assert!(config.network.destination_addr.is_none());
        assert_eq!(config.network.bind_timeout_ms, DEFAULT_BIND_TIMEOUT_MS);
    }

    #[test]
    fn malformed_listen_addr_fails_validation() {
        let mut config = Config::default();
        config.network.listen_addr = Some("not-an-address".into());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn partial_toml_can_pin_network_section() {
        let parsed: Config =
            toml::from_str("[network]\nlisten_addr = \"0.0.0.0:5004\"\n").unwrap();
        assert_eq!(parsed.network.listen_addr.as_deref(), Some("0.0.0.0:5004"));
        assert!(parsed.validate().is_ok());
    }
}
