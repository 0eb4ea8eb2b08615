//! NACK manager (spec §4.7): an open-addressed table indexed by
//! `seq mod M` with exponential backoff. Uses a tagged slot
//! (`Empty | Pending`) rather than overloading `retry_count == 0` to
//! mean "no live entry", per the spec §9 redesign note.

use crate::clock::Millis;

#[derive(Debug, Clone, Copy)]
enum NackSlot {
    Empty,
    Pending {
        seq: u16,
        retries: u32,
        last_ms: Millis,
    },
}

pub struct NackManager {
    table: Vec<NackSlot>,
    size: usize,
    max_retries: u32,
    rtt_ms: u64,
}

/// `required_wait(k) = RTT_MS^k`: 0 before any attempt has been made,
/// then superlinear per retry (spec §4.7).
fn required_wait(rtt_ms: u64, retries: u32) -> Millis {
    if retries == 0 {
        0
    } else {
        rtt_ms.saturating_pow(retries)
    }
}

impl NackManager {
    pub fn new(size: usize, max_retries: u32, rtt_ms: u64) -> Self {
        assert!(size > 0, "NACK table size must be nonzero");
        Self {
            table: vec![NackSlot::Empty; size],
            size,
            max_retries,
            rtt_ms,
        }
    }

    fn index(&self, seq: u16) -> usize {
        (seq as usize) % self.size
    }

    /// Re-arms the table for a new frame (spec §4.5 B1).
    pub fn reset(&mut self) {
        for slot in &mut self.table {
            *slot = NackSlot::Empty;
        }
    }

    /// True if there is no live entry for `seq`, or there is but its
    /// backoff has elapsed and it hasn't exhausted its retries.
    pub fn can_send(&self, seq: u16, now_ms: Millis) -> bool {
        match self.table[self.index(seq)] {
            NackSlot::Empty => true,
            NackSlot::Pending {
                seq: s,
                retries,
                last_ms,
            } => {
                s != seq
                    || (retries < self.max_retries
                        && now_ms.saturating_sub(last_ms) >= required_wait(self.rtt_ms, retries))
            }
        }
    }

    /// Seeds or bumps the retry count for `seq`. A collision with a
    /// different tracked sequence simply overwrites (spec §4.7: "the
    /// stream window is small relative to M by design").
    pub fn record_attempt(&mut self, seq: u16, now_ms: Millis) {
        let idx = self.index(seq);
        match &mut self.table[idx] {
            NackSlot::Pending {
                seq: s,
                retries,
                last_ms,
            } if *s == seq => {
                *retries += 1;
                *last_ms = now_ms;
            }
            slot => {
                *slot = NackSlot::Pending {
                    seq,
                    retries: 1,
                    last_ms: now_ms,
                };
            }
        }
    }

    /// Clears the entry for `seq` if it is the one being tracked —
    /// called when a matching packet arrives.
    pub fn clear(&mut self, seq: u16) {
        let idx = self.index(seq);
        if let NackSlot::Pending { seq: s, .. } = self.table[idx] {
            if s == seq {
                self.table[idx] = NackSlot::Empty;
            }
        }
    }

    /// Calls `send_fn(seq)` for every live entry whose backoff has
    /// elapsed, bumps its retry count, and reaps it once
    /// `NACK_MAX_RETRIES` is reached.
    pub fn tick(&mut self, now_ms: Millis, mut send_fn: impl FnMut(u16)) {
        let rtt_ms = self.rtt_ms;
        let max_retries = self.max_retries;
        for slot in self.table.iter_mut() {
            if let NackSlot::Pending {
                seq,
                retries,
                last_ms,
            } = slot
            {
                if *retries < max_retries
                    && now_ms.saturating_sub(*last_ms) >= required_wait(rtt_ms, *retries)
                {
                    send_fn(*seq);
                    *retries += 1;
                    *last_ms = now_ms;
                    if *retries >= max_retries {
                        *slot = NackSlot::Empty;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_send_true_on_empty_slot() {
        let mgr = NackManager::new(256, 3, 20);
        assert!(mgr.can_send(5, 0));
    }

    #[test]
    fn record_and_clear_round_trip() {
        let mut mgr = NackManager::new(256, 3, 20);
        mgr.record_attempt(5, 0);
        assert!(!mgr.can_send(5, 10)); // backoff(1) == 20ms, not yet elapsed
        mgr.clear(5);
        assert!(mgr.can_send(5, 10));
    }

    #[test]
    fn retries_are_capped_at_max_retries() {
        // P4
        let mut mgr = NackManager::new(256, 3, 20);
        let mut sent = Vec::new();
        mgr.record_attempt(100, 0);
        mgr.tick(20, |seq| sent.push(seq)); // retries: 1 -> 2
        mgr.tick(420, |seq| sent.push(seq)); // retries: 2 -> 3, reaped
        mgr.tick(100_000, |seq| sent.push(seq)); // entry gone, nothing fires
        assert_eq!(sent, vec![100, 100]);
        assert!(mgr.can_send(100, 100_000));
    }

    #[test]
    fn collision_overwrites_a_different_tracked_sequence() {
        let mut mgr = NackManager::new(4, 3, 20);
        mgr.record_attempt(1, 0); // index 1
        mgr.record_attempt(5, 0); // also index 1 (5 % 4 == 1)
        assert!(mgr.can_send(1, 0));
    }

    #[test]
    fn backoff_schedule_matches_rtt_ms_pow_k() {
        assert_eq!(required_wait(20, 0), 0);
        assert_eq!(required_wait(20, 1), 20);
        assert_eq!(required_wait(20, 2), 400);
        assert_eq!(required_wait(20, 3), 8000);
    }
}
