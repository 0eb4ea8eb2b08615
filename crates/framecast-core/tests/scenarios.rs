//! End-to-end scenarios S1-S6 (spec §8), driven directly against the
//! pipeline types — no socket, no real sleeps.

use framecast_core::config::Tuning;
use framecast_core::{decode, encode, fragment, FakeClock, ReceivePipeline};

fn tuning(chunk_size: usize) -> Tuning {
    let mut t = Tuning::default();
    t.chunk_size = chunk_size;
    t.jitter_delay_ms = 0;
    t.next_packet_wait_ms = 10_000;
    t
}

fn jpeg_image(filler_len: usize) -> Vec<u8> {
    let mut image = vec![0xFFu8, 0xD8];
    image.extend(std::iter::repeat(0xAAu8).take(filler_len));
    image.extend([0xFFu8, 0xD9]);
    image
}

fn feed(
    pipeline: &mut ReceivePipeline<FakeClock>,
    seq: u16,
    ts: u32,
    marker: bool,
    payload: &[u8],
) -> Option<Vec<u8>> {
    let wire = encode(seq, ts, 0x1234_5678, marker, payload).unwrap();
    let decoded = decode(&wire).unwrap();
    let mut nacks = Vec::new();
    pipeline
        .on_packet_arrival(decoded.header, decoded.payload, wire.len(), &mut nacks)
        .unwrap();
    pipeline.tick_pipeline()
}

#[test]
fn s1_single_frame_no_loss() {
    let image = jpeg_image(34); // 38 bytes total
    let fragments = fragment(&image, 4, 100);
    assert_eq!(fragments.len(), 10);

    let mut pipeline = ReceivePipeline::new(FakeClock::new(), &tuning(4));
    let mut last_frame = None;
    for frag in &fragments {
        last_frame = feed(&mut pipeline, frag.seq, 1000, frag.marker, frag.payload);
    }

    assert_eq!(last_frame, Some(image));
    let stats = pipeline.stats();
    assert_eq!(stats.packets_received, 10);
    assert_eq!(stats.packets_lost, 0);
    assert_eq!(stats.frames_received, 1);
    assert_eq!(stats.retransmit_requests, 0);
}

#[test]
fn s2_single_packet_loss_recovered() {
    let image = jpeg_image(34);
    let fragments = fragment(&image, 4, 200);
    assert_eq!(fragments.len(), 10); // seqs 200..209

    let mut pipeline = ReceivePipeline::new(FakeClock::new(), &tuning(4));
    let mut nacks = Vec::new();

    // Deliver everything except seq 205 (index 5) first.
    for frag in fragments.iter().filter(|f| f.seq != 205) {
        let wire = encode(frag.seq, 1000, 0x1234_5678, frag.marker, frag.payload).unwrap();
        let decoded = decode(&wire).unwrap();
        pipeline
            .on_packet_arrival(decoded.header, decoded.payload, wire.len(), &mut nacks)
            .unwrap();
        pipeline.tick_pipeline();
    }
    assert_eq!(nacks, vec![205]);
    assert_eq!(pipeline.stats().retransmit_requests, 1);
    assert_eq!(pipeline.stats().frames_received, 0);

    // The retransmitted 205 arrives within the backoff window.
    let missing = fragments.iter().find(|f| f.seq == 205).unwrap();
    let frame = feed(&mut pipeline, missing.seq, 1000, missing.marker, missing.payload);

    assert_eq!(frame, Some(image));
    assert_eq!(pipeline.stats().packets_lost, 0);
    assert_eq!(pipeline.stats().frames_received, 1);
}

#[test]
fn s3_single_packet_loss_not_recovered() {
    // seqs 300..303, with 303 (the marker fragment) permanently lost:
    // the NACK manager exhausts its retries, the reorder buffer ages
    // the hole out, and the frame never reaches its marker, so it's
    // never finalized.
    let image = jpeg_image(10); // 14 bytes, chunk_size 4 -> 4 fragments (300..303)
    let fragments = fragment(&image, 4, 300);
    assert_eq!(fragments.len(), 4);

    let mut pipeline = ReceivePipeline::new(FakeClock::new(), &tuning(4));
    let mut nacks = Vec::new();
    for frag in &fragments[..3] {
        let wire = encode(frag.seq, 1000, 0x1234_5678, frag.marker, frag.payload).unwrap();
        let decoded = decode(&wire).unwrap();
        pipeline
            .on_packet_arrival(decoded.header, decoded.payload, wire.len(), &mut nacks)
            .unwrap();
        pipeline.tick_pipeline();
    }
    assert!(nacks.is_empty()); // no gap observed yet; 303 simply never shows up

    // 303 never arrives; advance the clock past the reorder age-out
    // bound and tick with no new arrival — the idle drain still runs
    // and ages the stuck head out.
    pipeline.clock().advance(10_001);
    let frame = pipeline.tick_pipeline();

    assert!(frame.is_none());
    assert_eq!(pipeline.stats().packets_lost, 1);
    assert_eq!(pipeline.stats().frames_received, 0);
}

#[test]
fn s4_reordering_without_loss() {
    let image = jpeg_image(12); // 16 bytes, 4 chunks of 4
    let fragments = fragment(&image, 4, 400);
    assert_eq!(fragments.len(), 4);

    let mut pipeline = ReceivePipeline::new(FakeClock::new(), &tuning(4));
    // Arrival order 400, 402, 401, 403.
    let order = [0usize, 2, 1, 3];
    let mut last_frame = None;
    for &i in &order {
        let frag = &fragments[i];
        last_frame = feed(&mut pipeline, frag.seq, 2000, frag.marker, frag.payload);
    }

    assert_eq!(last_frame, Some(image));
    assert!(pipeline.stats().packets_reordered >= 1);
}

#[test]
fn s5_frame_boundary_via_timestamp_change() {
    let first_image = jpeg_image(4); // incomplete frame, never gets a marker
    let first_fragments = fragment(&first_image, 4, 500);

    let second_image = jpeg_image(12);
    let second_fragments = fragment(&second_image, 4, 503);

    let mut pipeline = ReceivePipeline::new(FakeClock::new(), &tuning(4));
    for frag in &first_fragments[..first_fragments.len().min(3)] {
        feed(&mut pipeline, frag.seq, 1_000_000, false, frag.payload);
    }
    assert_eq!(pipeline.stats().frames_received, 0);

    let mut last_frame = None;
    for frag in &second_fragments {
        last_frame = feed(&mut pipeline, frag.seq, 2_000_000, frag.marker, frag.payload);
    }

    assert_eq!(last_frame, Some(second_image));
    assert_eq!(pipeline.stats().frames_received, 1);
}

#[test]
fn s6_duplicate_at_reorder_head() {
    let image = jpeg_image(4); // 8 bytes, chunk_size 4 -> exactly 2 fragments
    let fragments = fragment(&image, 4, 600);
    assert_eq!(fragments.len(), 2);

    let mut pipeline = ReceivePipeline::new(FakeClock::new(), &tuning(4));
    feed(&mut pipeline, 600, 3000, false, fragments[0].payload);
    feed(&mut pipeline, 600, 3000, false, fragments[0].payload); // duplicate
    let frame = feed(&mut pipeline, 601, 3000, true, fragments[1].payload);

    assert_eq!(frame, Some(image));
    assert_eq!(pipeline.stats().packets_received, 3);
}
