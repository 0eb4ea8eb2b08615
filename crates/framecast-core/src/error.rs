use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Recoverable pipeline failures (spec §7: PROTOCOL_DROP, CAPACITY).
/// Every one of these is absorbed by its caller inside the receive or
/// send loop — a `CoreError` never unwinds past a single iteration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("short read: need at least {needed} bytes, got {got}")]
    ShortRead { needed: usize, got: usize },

    #[error("payload of {len} bytes exceeds the {max} byte limit")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("unrecognized packet type {0:#04x}")]
    UnrecognizedPacketType(u8),

    #[error("jitter buffer is full")]
    JitterBufferFull,

    #[error("sequence is outside the reorder window")]
    ReorderOutOfWindow,
}

/// Startup failures that abort the process (spec §7: FATAL).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to bind UDP socket at {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to set socket read timeout: {0}")]
    SocketConfig(#[source] std::io::Error),

    #[error("failed to open image {path:?}: {source}")]
    ImageOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create output directory {path:?}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error("invalid destination address: {0}")]
    InvalidAddress(String),
}
