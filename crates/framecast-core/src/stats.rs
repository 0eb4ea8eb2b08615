//! Pipeline counters (spec §3, §4.9). Deliberately plain: fields are
//! `pub` so each component bumps the counter it owns directly, the way
//! the C prototype threads a single `stats_t *` through every stage.

use crate::clock::{Clock, Millis};
use log::info;

#[derive(Debug, Clone, Copy)]
pub struct Stats {
    pub packets_received: u32,
    pub packets_lost: u32,
    pub frames_received: u32,
    pub last_seq: u16,
    pub total_bytes: u64,
    pub retransmit_requests: u32,
    pub packets_reordered: u32,
    start_ms: Millis,
}

impl Stats {
    pub fn new(clock: &dyn Clock) -> Self {
        Self {
            packets_received: 0,
            packets_lost: 0,
            frames_received: 0,
            last_seq: 0,
            total_bytes: 0,
            retransmit_requests: 0,
            packets_reordered: 0,
            start_ms: clock.now_ms(),
        }
    }

    /// Bumps the counters owned by packet arrival: total received count,
    /// byte total (header included, spec I6), and last seen sequence.
    pub fn update_on_arrival(&mut self, seq: u16, bytes_on_wire: usize) {
        self.packets_received += 1;
        self.total_bytes += bytes_on_wire as u64;
        self.last_seq = seq;
    }

    pub fn elapsed_ms(&self, clock: &dyn Clock) -> Millis {
        clock.now_ms().saturating_sub(self.start_ms)
    }

    /// Logs a one-line summary with derived bitrate/frame-rate. Callers
    /// that also want a console printout (spec §1: out of core scope)
    /// can read the public counters directly.
    pub fn print_snapshot(&self, clock: &dyn Clock) {
        let elapsed_ms = self.elapsed_ms(clock).max(1);
        let elapsed_s = elapsed_ms as f64 / 1000.0;
        let bitrate_bps = (self.total_bytes as f64 * 8.0) / elapsed_s;
        let fps = self.frames_received as f64 / elapsed_s;
        info!(
            "stats: received={} lost={} frames={} reordered={} retransmit_requests={} \
             bytes={} elapsed={:.1}s bitrate={:.1}kbps fps={:.2}",
            self.packets_received,
            self.packets_lost,
            self.frames_received,
            self.packets_reordered,
            self.retransmit_requests,
            self.total_bytes,
            elapsed_s,
            bitrate_bps / 1000.0,
            fps,
        );
    }
}
