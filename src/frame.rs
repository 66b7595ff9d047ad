//! Frame codec for the 8-byte segmentation frames.
//!
//! Byte 0 carries the node-address tag, byte 1 the protocol control
//! information (PCI). The upper PCI nibble selects the frame kind, the
//! lower nibble carries the single-frame length, the high nibble of the
//! 12-bit first-frame length, or the consecutive-frame sequence number.
//! Unused trailing bytes are padded with 0x55.

use crate::error::{LinTpError, Result};

/// Fixed physical frame size on the bus.
pub const FRAME_LEN: usize = 8;

/// Filler byte for unused trailing frame bytes.
pub const PADDING_BYTE: u8 = 0x55;

/// Largest message the 12-bit first-frame length field can announce.
pub const MAX_MESSAGE_LEN: usize = 0x0FFF;

/// Payload capacity of a single frame (8 bytes minus NA and PCI).
pub const SF_MAX_PAYLOAD: usize = 6;

/// Data bytes carried by a first frame, always exactly this many.
pub const FF_PAYLOAD: usize = 5;

/// Payload capacity of a consecutive frame.
pub const CF_MAX_PAYLOAD: usize = 6;

const PCI_KIND_MASK: u8 = 0xF0;
const PCI_SF: u8 = 0x00; // Single Frame
const PCI_FF: u8 = 0x10; // First Frame
const PCI_CF: u8 = 0x20; // Consecutive Frame
const PCI_LOW_MASK: u8 = 0x0F;

/// Decoded protocol control information of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pci {
    /// Complete message in one frame, `length` payload bytes (0..=6).
    Single { length: usize },
    /// Opens a segmented message of `total_length` bytes; the frame
    /// itself carries the first [`FF_PAYLOAD`] bytes.
    First { total_length: usize },
    /// Continuation carrying up to [`CF_MAX_PAYLOAD`] bytes, tagged with
    /// a 4-bit rolling sequence number.
    Consecutive { sequence: u8 },
}

/// Node-address tag of a frame.
pub fn node_address(frame: &[u8; FRAME_LEN]) -> u8 {
    frame[0]
}

/// Classifies a frame by its PCI byte.
///
/// Rejects reserved frame kinds, single-frame lengths that cannot fit
/// the physical frame, and first-frame lengths short enough to have fit
/// a single frame. Decoding never mutates anything.
pub fn decode(frame: &[u8; FRAME_LEN]) -> Result<Pci> {
    let pci = frame[1];
    match pci & PCI_KIND_MASK {
        PCI_SF => {
            let length = (pci & PCI_LOW_MASK) as usize;
            if length > SF_MAX_PAYLOAD {
                return Err(LinTpError::MalformedFrame);
            }
            Ok(Pci::Single { length })
        }
        PCI_FF => {
            let total_length = (((pci & PCI_LOW_MASK) as usize) << 8) | frame[2] as usize;
            if total_length <= SF_MAX_PAYLOAD {
                // A message this short can never legitimately arrive segmented.
                return Err(LinTpError::MalformedFrame);
            }
            Ok(Pci::First { total_length })
        }
        PCI_CF => Ok(Pci::Consecutive {
            sequence: pci & PCI_LOW_MASK,
        }),
        _ => Err(LinTpError::MalformedFrame),
    }
}

/// Encodes a complete message of up to 6 bytes into one single frame.
pub fn encode_single(na: u8, payload: &[u8]) -> [u8; FRAME_LEN] {
    debug_assert!(payload.len() <= SF_MAX_PAYLOAD);
    let mut frame = [PADDING_BYTE; FRAME_LEN];
    frame[0] = na;
    frame[1] = PCI_SF | payload.len() as u8;
    frame[2..2 + payload.len()].copy_from_slice(payload);
    frame
}

/// Encodes the first frame of a segmented message. `head` must hold
/// exactly the first [`FF_PAYLOAD`] bytes; `total_length` is the full
/// message length announced in the 12-bit field.
pub fn encode_first(na: u8, total_length: usize, head: &[u8]) -> [u8; FRAME_LEN] {
    debug_assert!(head.len() == FF_PAYLOAD);
    debug_assert!(total_length <= MAX_MESSAGE_LEN);
    let mut frame = [PADDING_BYTE; FRAME_LEN];
    frame[0] = na;
    frame[1] = PCI_FF | ((total_length >> 8) as u8 & PCI_LOW_MASK);
    frame[2] = total_length as u8;
    frame[3..3 + head.len()].copy_from_slice(head);
    frame
}

/// Encodes a consecutive frame carrying up to 6 bytes.
pub fn encode_consecutive(na: u8, sequence: u8, chunk: &[u8]) -> [u8; FRAME_LEN] {
    debug_assert!(chunk.len() <= CF_MAX_PAYLOAD);
    let mut frame = [PADDING_BYTE; FRAME_LEN];
    frame[0] = na;
    frame[1] = PCI_CF | (sequence & PCI_LOW_MASK);
    frame[2..2 + chunk.len()].copy_from_slice(chunk);
    frame
}

/// Advances a 4-bit sequence number: 1, 2, .., 15, 0, 1, ..
pub fn next_sequence(sequence: u8) -> u8 {
    if sequence >= 15 {
        0
    } else {
        sequence + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_frame_round_trip() {
        let frame = encode_single(0x10, &[0xAA, 0xBB, 0xCC]);
        assert_eq!(frame, [0x10, 0x03, 0xAA, 0xBB, 0xCC, 0x55, 0x55, 0x55]);
        assert_eq!(node_address(&frame), 0x10);
        assert_eq!(decode(&frame).unwrap(), Pci::Single { length: 3 });
    }

    #[test]
    fn empty_single_frame_is_all_padding() {
        let frame = encode_single(0x42, &[]);
        assert_eq!(frame, [0x42, 0x00, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55]);
        assert_eq!(decode(&frame).unwrap(), Pci::Single { length: 0 });
    }

    #[test]
    fn first_frame_carries_total_length() {
        let frame = encode_first(0x10, 300, &[1, 2, 3, 4, 5]);
        assert_eq!(frame[1], 0x11); // 300 = 0x12C, high nibble 1
        assert_eq!(frame[2], 0x2C);
        assert_eq!(decode(&frame).unwrap(), Pci::First { total_length: 300 });
    }

    #[test]
    fn consecutive_frame_sequence_nibble() {
        let frame = encode_consecutive(0x10, 7, &[9, 9]);
        assert_eq!(frame[1], 0x27);
        assert_eq!(frame[4], PADDING_BYTE);
        assert_eq!(decode(&frame).unwrap(), Pci::Consecutive { sequence: 7 });
    }

    #[test]
    fn reserved_kinds_are_malformed() {
        for kind in 3..=15u8 {
            let frame = [0x10, kind << 4, 0, 0, 0, 0, 0, 0];
            assert_eq!(decode(&frame), Err(LinTpError::MalformedFrame));
        }
    }

    #[test]
    fn oversize_single_frame_length_is_malformed() {
        let frame = [0x10, 0x07, 0, 0, 0, 0, 0, 0];
        assert_eq!(decode(&frame), Err(LinTpError::MalformedFrame));
    }

    #[test]
    fn degenerate_first_frame_is_malformed() {
        // Announced total of 6 would have fit a single frame.
        let frame = [0x10, 0x10, 0x06, 0, 0, 0, 0, 0];
        assert_eq!(decode(&frame), Err(LinTpError::MalformedFrame));
    }

    #[test]
    fn sequence_wraps_after_fifteen() {
        let mut sn = 1u8;
        let mut seen = vec![sn];
        for _ in 0..16 {
            sn = next_sequence(sn);
            seen.push(sn);
        }
        assert_eq!(
            seen,
            vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 0, 1]
        );
    }
}
