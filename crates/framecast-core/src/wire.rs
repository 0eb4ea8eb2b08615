//! RTP-style header and NACK packet codec (spec §4.1, §6). Fixed-width,
//! big-endian fields with a bit-packed first two bytes, in the idiom of
//! the teacher's `BinaryReader`/`BinaryWritter` extension traits — but
//! free functions suffice here since the wire format has exactly two
//! shapes, not an open-ended packet zoo.

use crate::constants::{
    MAX_PAYLOAD_SIZE, NACK_PACKET_LEN, PACKET_TYPE_NACK, RTP_HEADER_LEN, RTP_PAYLOAD_TYPE_JPEG,
    RTP_VERSION,
};
use crate::error::CoreError;
use bytes::{Buf, BufMut, Bytes, BytesMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtpHeader {
    pub version: u8,
    pub padding: bool,
    pub extension: bool,
    pub csrc_count: u8,
    pub marker: bool,
    pub payload_type: u8,
    pub seq: u16,
    pub ts: u32,
    pub ssrc: u32,
}

#[derive(Debug, Clone)]
pub struct DecodedPacket {
    pub header: RtpHeader,
    pub payload: Bytes,
}

/// Encodes an RTP data packet. Decoders never validate `version`/
/// `payload_type` (spec §4.1 open question) — only `seq`, `ts`, and
/// `marker` are load-bearing downstream.
pub fn encode(seq: u16, ts: u32, ssrc: u32, marker: bool, payload: &[u8]) -> Result<Bytes, CoreError> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(CoreError::PayloadTooLarge {
            len: payload.len(),
            max: MAX_PAYLOAD_SIZE,
        });
    }
    let mut buf = BytesMut::with_capacity(RTP_HEADER_LEN + payload.len());
    let byte0 = (RTP_VERSION & 0x03) << 6;
    buf.put_u8(byte0);
    let byte1 = ((marker as u8) << 7) | (RTP_PAYLOAD_TYPE_JPEG & 0x7f);
    buf.put_u8(byte1);
    buf.put_u16(seq);
    buf.put_u32(ts);
    buf.put_u32(ssrc);
    buf.put_slice(payload);
    Ok(buf.freeze())
}

/// Decodes an RTP data packet. Fails with [`CoreError::ShortRead`] when
/// `bytes` is smaller than the fixed 12-byte header.
pub fn decode(bytes: &[u8]) -> Result<DecodedPacket, CoreError> {
    if bytes.len() < RTP_HEADER_LEN {
        return Err(CoreError::ShortRead {
            needed: RTP_HEADER_LEN,
            got: bytes.len(),
        });
    }
    let mut buf = Bytes::copy_from_slice(bytes);
    let byte0 = buf.get_u8();
    let byte1 = buf.get_u8();
    let header = RtpHeader {
        version: byte0 >> 6,
        padding: (byte0 & 0x20) != 0,
        extension: (byte0 & 0x10) != 0,
        csrc_count: byte0 & 0x0f,
        marker: (byte1 & 0x80) != 0,
        payload_type: byte1 & 0x7f,
        seq: buf.get_u16(),
        ts: buf.get_u32(),
        ssrc: buf.get_u32(),
    };
    Ok(DecodedPacket {
        header,
        payload: buf,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NackPacket {
    pub seq_start: u16,
    pub seq_count: u16,
}

/// Encodes a NACK packet. `seq_count` is carried in full even though
/// every emitter in this implementation sets it to 1 — the format is
/// intentionally range-capable (spec §9 open question).
pub fn encode_nack(seq_start: u16, seq_count: u16) -> Bytes {
    let mut buf = BytesMut::with_capacity(NACK_PACKET_LEN);
    buf.put_u8(PACKET_TYPE_NACK);
    buf.put_u16(seq_start);
    buf.put_u16(seq_count);
    buf.freeze()
}

pub fn decode_nack(bytes: &[u8]) -> Result<NackPacket, CoreError> {
    if bytes.len() < NACK_PACKET_LEN {
        return Err(CoreError::ShortRead {
            needed: NACK_PACKET_LEN,
            got: bytes.len(),
        });
    }
    let mut buf = Bytes::copy_from_slice(bytes);
    let ty = buf.get_u8();
    if ty != PACKET_TYPE_NACK {
        return Err(CoreError::UnrecognizedPacketType(ty));
    }
    Ok(NackPacket {
        seq_start: buf.get_u16(),
        seq_count: buf.get_u16(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_data_packet() {
        let payload = b"jpeg-bytes-go-here";
        let encoded = encode(42, 1000, 0x1234_5678, true, payload).unwrap();
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded.header.seq, 42);
        assert_eq!(decoded.header.ts, 1000);
        assert_eq!(decoded.header.ssrc, 0x1234_5678);
        assert!(decoded.header.marker);
        assert_eq!(&decoded.payload[..], &payload[..]);
    }

    #[test]
    fn decoder_accepts_any_version_and_payload_type() {
        // Hand-build a header with version=0 and payload_type=0, neither
        // of which matches our encoder's own constants.
        let mut buf = BytesMut::new();
        buf.put_u8(0x00);
        buf.put_u8(0x00);
        buf.put_u16(7);
        buf.put_u32(9);
        buf.put_u32(0);
        buf.put_slice(b"x");
        let decoded = decode(&buf).unwrap();
        assert_eq!(decoded.header.version, 0);
        assert_eq!(decoded.header.payload_type, 0);
        assert_eq!(decoded.header.seq, 7);
    }

    #[test]
    fn decode_short_read() {
        let err = decode(&[0u8; 4]).unwrap_err();
        assert_eq!(
            err,
            CoreError::ShortRead {
                needed: RTP_HEADER_LEN,
                got: 4
            }
        );
    }

    #[test]
    fn encode_rejects_oversized_payload() {
        let payload = vec![0u8; MAX_PAYLOAD_SIZE + 1];
        let err = encode(0, 0, 0, false, &payload).unwrap_err();
        assert!(matches!(err, CoreError::PayloadTooLarge { .. }));
    }

    #[test]
    fn round_trip_nack_packet() {
        let encoded = encode_nack(205, 3);
        let decoded = decode_nack(&encoded).unwrap();
        assert_eq!(decoded.seq_start, 205);
        assert_eq!(decoded.seq_count, 3);
    }

    #[test]
    fn decode_nack_rejects_unknown_type() {
        let mut buf = BytesMut::new();
        buf.put_u8(0x02);
        buf.put_u16(0);
        buf.put_u16(0);
        let err = decode_nack(&buf).unwrap_err();
        assert!(matches!(err, CoreError::UnrecognizedPacketType(0x02)));
    }
}
