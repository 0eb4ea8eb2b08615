//! Jitter buffer (spec §4.3): a bounded FIFO that holds every arrival
//! for at least the jitter delay before releasing it. Reordering is
//! not this buffer's job — see `reorder.rs`.

use crate::clock::Millis;
use crate::error::CoreError;
use crate::wire::RtpHeader;
use bytes::Bytes;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct Arrival {
    pub header: RtpHeader,
    pub payload: Bytes,
    pub size: usize,
}

struct Entry {
    arrival: Arrival,
    arrival_ms: Millis,
}

pub struct JitterBuffer {
    queue: VecDeque<Entry>,
    capacity: usize,
    delay_ms: Millis,
}

impl JitterBuffer {
    pub fn new(capacity: usize, delay_ms: Millis) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity),
            capacity,
            delay_ms,
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Enqueues an arrival. Fails with [`CoreError::JitterBufferFull`]
    /// and drops the new arrival when the buffer is at capacity — the
    /// gap detector may already have NACKed the hole this leaves.
    pub fn add(&mut self, arrival: Arrival, now_ms: Millis) -> Result<(), CoreError> {
        if self.queue.len() >= self.capacity {
            return Err(CoreError::JitterBufferFull);
        }
        self.queue.push_back(Entry {
            arrival,
            arrival_ms: now_ms,
        });
        Ok(())
    }

    /// Returns the head arrival and advances the FIFO iff its dwell has
    /// reached `delay_ms`; otherwise returns `None` without mutating state.
    pub fn try_take(&mut self, now_ms: Millis) -> Option<Arrival> {
        let ready = self
            .queue
            .front()
            .is_some_and(|e| now_ms.saturating_sub(e.arrival_ms) >= self.delay_ms);
        if ready {
            self.queue.pop_front().map(|e| e.arrival)
        } else {
            None
        }
    }
}
