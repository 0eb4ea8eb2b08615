//! Compile-time protocol constants (spec §6). A [`crate::config::Tuning`]
//! may override any of these at runtime; these values are what a
//! tuning field falls back to when absent.

pub const CHUNK_SIZE: usize = 1400;
pub const JITTER_BUFFER_SIZE: usize = 50;
pub const JITTER_DELAY_MS: u64 = 100;
pub const REORDER_BUFFER_SIZE: usize = 101;
pub const NEXT_PACKET_WAIT_MS: u64 = 15;
pub const NACK_BUFFER_SIZE: usize = 256;
pub const NACK_MAX_RETRIES: u32 = 3;
pub const RTT_MS: u64 = 20;
pub const BUFFER_SIZE: usize = 10_000_000;
pub const MAX_STORED_PACKETS: usize = 1000;
pub const WAIT_NACK_MS: u64 = 5_000;
pub const GAP_WAIT_NACK_MS: u64 = 2_000;

/// Gaps at or beyond this many sequences are treated as a stream
/// reset/wrap rather than loss (spec §4.6).
pub const GAP_SANITY_CAP: i32 = 100;

pub const RTP_VERSION: u8 = 2;
pub const RTP_PAYLOAD_TYPE_JPEG: u8 = 26;
pub const DEFAULT_SSRC: u32 = 0x1234_5678;
pub const DEFAULT_PORT: u16 = 5004;

pub const RTP_HEADER_LEN: usize = 12;
pub const NACK_PACKET_LEN: usize = 5;
pub const PACKET_TYPE_NACK: u8 = 1;
pub const MAX_PACKET_SIZE: usize = 65535;
pub const MAX_PAYLOAD_SIZE: usize = MAX_PACKET_SIZE - RTP_HEADER_LEN;
