//! Frame assembler (spec §4.5): a thin layer above the reorder buffer
//! that writes each released payload at its byte offset into one
//! reassembly buffer and detects frame boundaries.

#[derive(Debug, PartialEq, Eq)]
pub struct FrameBoundaryHit {
    /// True when this arrival forced a reset (B1: timestamp change)
    /// before it was adopted as the start of a new frame.
    pub reset: bool,
}

pub struct FrameAssembler {
    buffer: Vec<u8>,
    frame_len: usize,
    current_ts: Option<u32>,
    frame_start_seq: Option<u16>,
    frame_end_seq: Option<u16>,
    chunk_size: usize,
}

impl FrameAssembler {
    pub fn new(buffer_size: usize, chunk_size: usize) -> Self {
        Self {
            buffer: vec![0u8; buffer_size],
            frame_len: 0,
            current_ts: None,
            frame_start_seq: None,
            frame_end_seq: None,
            chunk_size,
        }
    }

    /// Called once per packet released from the jitter buffer, before
    /// reorder insertion (spec §4.5 B1). When the timestamp differs
    /// from the frame in progress, the partial frame is discarded and
    /// this arrival becomes the start of a new one; the caller must
    /// then reset its reorder buffer and NACK manager.
    pub fn observe_jitter_release(&mut self, seq: u16, ts: u32) -> FrameBoundaryHit {
        let mut reset = false;
        if let Some(cur) = self.current_ts {
            if cur != ts {
                self.frame_len = 0;
                self.frame_end_seq = None;
                self.current_ts = None;
                reset = true;
            }
        }
        if self.current_ts.is_none() {
            self.current_ts = Some(ts);
            self.frame_start_seq = Some(seq);
        }
        FrameBoundaryHit { reset }
    }

    pub fn note_marker(&mut self, seq: u16, marker: bool) {
        if marker {
            self.frame_end_seq = Some(seq);
        }
    }

    /// Called for each payload released, in sequence order, by the
    /// reorder buffer. Writes it at `(seq - frame_start_seq) *
    /// chunk_size`. Returns the assembled bytes when `seq` is the
    /// marker-tagged final fragment (spec §4.5 B2) — the caller
    /// validates and writes it out, then calls [`Self::reset`].
    pub fn place_and_maybe_finalize(&mut self, seq: u16, payload: &[u8]) -> Option<Vec<u8>> {
        let start = self.frame_start_seq.unwrap_or(seq);
        let position = (seq.wrapping_sub(start) as usize) * self.chunk_size;
        let end = position + payload.len();
        if end <= self.buffer.len() {
            self.buffer[position..end].copy_from_slice(payload);
            if end > self.frame_len {
                self.frame_len = end;
            }
        }
        if self.frame_end_seq == Some(seq) {
            Some(self.buffer[..self.frame_len].to_vec())
        } else {
            None
        }
    }

    /// Zeroes assembly state after a frame has been finalized (or
    /// discarded). Does not touch the reorder buffer or NACK manager —
    /// those are the caller's to reset alongside this.
    pub fn reset(&mut self) {
        self.frame_len = 0;
        self.current_ts = None;
        self.frame_start_seq = None;
        self.frame_end_seq = None;
    }
}

/// Spec §4.5/§7 INTEGRITY check: a finalized frame is only written if
/// it starts with the JPEG SOI marker and ends with EOI.
pub fn is_valid_jpeg(bytes: &[u8]) -> bool {
    bytes.len() >= 4
        && bytes[0] == 0xFF
        && bytes[1] == 0xD8
        && bytes[bytes.len() - 2] == 0xFF
        && bytes[bytes.len() - 1] == 0xD9
}
