//! Core receive/send pipeline for streaming fragmented JPEG frames over
//! best-effort UDP: gap detection, NACK management, jitter buffering,
//! reorder buffering, and frame assembly. The command-line entry
//! points, file I/O, and UDP socket itself are collaborators that live
//! in the `framecast-receiver`/`framecast-sender` binaries.

pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod fragment;
pub mod frame;
pub mod gap;
pub mod jitter;
pub mod nack;
pub mod pipeline;
pub mod reorder;
pub mod retransmit;
pub mod stats;
pub mod wire;

pub use clock::{Clock, FakeClock, Millis, SystemClock};
pub use config::Config;
pub use error::{AppError, CoreError};
pub use fragment::{fragment, Fragment};
pub use frame::FrameAssembler;
pub use gap::GapDetector;
pub use jitter::{Arrival, JitterBuffer};
pub use nack::NackManager;
pub use pipeline::ReceivePipeline;
pub use reorder::{InsertOutcome, ReorderBuffer};
pub use retransmit::RetransmitStore;
pub use stats::Stats;
pub use wire::{decode, decode_nack, encode, encode_nack, DecodedPacket, NackPacket, RtpHeader};
