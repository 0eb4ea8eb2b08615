//! Reorder buffer (spec §4.4): a fixed window of slots that presents
//! payloads in strictly ascending sequence order, aging out a stuck
//! head after a bounded wait. Slot storage is an owned, index-addressed
//! arena allocated once at init and rotated on release — never an
//! aliased pointer handed to a caller (spec §9 redesign note).

use crate::clock::Millis;
use crate::stats::Stats;

#[derive(Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    InOrder,
    Buffered,
    Duplicate,
    OutOfWindow,
}

struct Slot {
    seq: u16,
    data: Vec<u8>,
    len: usize,
    valid: bool,
}

pub struct ReorderBuffer {
    slots: Vec<Slot>,
    window: usize,
    expected_seq: u16,
    initialized: bool,
    next_wait_ms: Millis,
    wait_since_ms: Millis,
}

impl ReorderBuffer {
    pub fn new(window: usize, slot_capacity: usize, next_wait_ms: Millis) -> Self {
        assert!(window > 0, "reorder window must be nonzero");
        let slots = (0..window)
            .map(|_| Slot {
                seq: 0,
                data: vec![0u8; slot_capacity],
                len: 0,
                valid: false,
            })
            .collect();
        Self {
            slots,
            window,
            expected_seq: 0,
            initialized: false,
            next_wait_ms,
            wait_since_ms: 0,
        }
    }

    pub fn expected_seq(&self) -> u16 {
        self.expected_seq
    }

    /// Re-arms the buffer for a new frame (spec §4.5 B1). Any partially
    /// buffered payloads are discarded.
    pub fn reset(&mut self, now_ms: Millis) {
        for slot in &mut self.slots {
            slot.valid = false;
            slot.len = 0;
        }
        self.initialized = false;
        self.wait_since_ms = now_ms;
    }

    pub fn insert(&mut self, seq: u16, payload: &[u8], now_ms: Millis) -> InsertOutcome {
        if !self.initialized {
            self.expected_seq = seq;
            self.initialized = true;
            self.wait_since_ms = now_ms;
        }
        let offset = seq.wrapping_sub(self.expected_seq) as i16;
        if offset < 0 {
            return InsertOutcome::OutOfWindow;
        }
        let offset = offset as usize;
        if offset >= self.window {
            return InsertOutcome::OutOfWindow;
        }
        let slot = &mut self.slots[offset];
        if slot.valid {
            return InsertOutcome::Duplicate;
        }
        let n = payload.len().min(slot.data.len());
        slot.data[..n].copy_from_slice(&payload[..n]);
        slot.len = n;
        slot.seq = seq;
        slot.valid = true;
        if offset == 0 {
            InsertOutcome::InOrder
        } else {
            InsertOutcome::Buffered
        }
    }

    /// Shifts every slot down by one and recycles the freed (now stale)
    /// buffer as the new tail, advancing `expected_seq`.
    fn advance(&mut self) {
        let mut freed = self.slots.remove(0);
        freed.valid = false;
        freed.len = 0;
        freed.seq = 0;
        self.slots.push(freed);
        self.expected_seq = self.expected_seq.wrapping_add(1);
    }

    /// Releases the next in-order payload, or ages out a stuck hole and
    /// tries again, per spec §4.4. Returns `None` only when the head is
    /// empty and still within its wait budget.
    pub fn take_next(&mut self, stats: &mut Stats, now_ms: Millis) -> Option<(u16, Vec<u8>)> {
        loop {
            if self.slots[0].valid && self.slots[0].seq == self.expected_seq {
                let seq = self.slots[0].seq;
                let payload = self.slots[0].data[..self.slots[0].len].to_vec();
                self.advance();
                self.wait_since_ms = now_ms;
                return Some((seq, payload));
            }
            if now_ms.saturating_sub(self.wait_since_ms) > self.next_wait_ms {
                stats.packets_lost += 1;
                self.advance();
                self.wait_since_ms = now_ms;
                continue;
            }
            return None;
        }
    }
}
