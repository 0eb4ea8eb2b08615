//! Gap detector (spec §4.6): tracks the high-water-mark sequence and
//! reports which sequences a jump skipped over, so the caller can
//! drive NACK scheduling. Wrap/reset jumps (≥ 100 sequences) are
//! reported as nothing to NACK, per the sanity cap.

use crate::constants::GAP_SANITY_CAP;

#[derive(Debug, Default, Clone)]
pub struct GapOutcome {
    /// Sequences skipped by this arrival, oldest first. Empty when the
    /// arrival was contiguous, late/duplicate, or a wrap/reset.
    pub missing: Vec<u16>,
}

pub struct GapDetector {
    max_seq_seen: u16,
    initialized: bool,
}

impl GapDetector {
    pub fn new() -> Self {
        Self {
            max_seq_seen: 0,
            initialized: false,
        }
    }

    pub fn observe(&mut self, seq: u16) -> GapOutcome {
        if !self.initialized {
            self.initialized = true;
            self.max_seq_seen = seq;
            return GapOutcome::default();
        }
        let diff = seq.wrapping_sub(self.max_seq_seen) as i16;
        if diff <= 0 {
            return GapOutcome::default(); // late or duplicate
        }
        let mut missing = Vec::new();
        if (diff as i32) < GAP_SANITY_CAP {
            let mut m = self.max_seq_seen.wrapping_add(1);
            while m != seq {
                missing.push(m);
                m = m.wrapping_add(1);
            }
        }
        self.max_seq_seen = seq;
        GapOutcome { missing }
    }
}

impl Default for GapDetector {
    fn default() -> Self {
        Self::new()
    }
}
